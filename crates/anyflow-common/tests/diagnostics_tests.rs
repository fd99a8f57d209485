//! Tests for the diagnostic message table and rendering.

use anyflow_common::diagnostics::{
    Diagnostic, DiagnosticCategory, diagnostic_codes, format_message, get_message,
    get_message_by_key,
};

#[test]
fn test_format_message_substitutes_positional_args() {
    let text = format_message("Type '{0}' into '{1}'.", &["any[]", "string[]"]);
    assert_eq!(text, "Type 'any[]' into 'string[]'.");
}

#[test]
fn test_message_lookup_by_code_and_key() {
    let by_code = get_message(diagnostic_codes::UNSAFE_RETURN_OF_AN_TYPED_VALUE)
        .expect("unsafe return message registered");
    let by_key = get_message_by_key("unsafeReturn").expect("key registered");
    assert_eq!(by_code, by_key);

    let assignment = get_message_by_key("unsafeReturnAssignment").expect("key registered");
    assert_eq!(
        assignment.code,
        diagnostic_codes::UNSAFE_RETURN_OF_TYPE_FROM_FUNCTION_WITH_RETURN_TYPE
    );
    assert!(get_message_by_key("noSuchRule").is_none());
}

#[test]
fn test_diagnostic_from_message() {
    let message = get_message_by_key("unsafeReturnAssignment").expect("key registered");
    let diag = Diagnostic::from_message(
        message,
        "a.ts",
        12,
        20,
        &["Promise<any>", "Promise<string>"],
    );

    assert_eq!(diag.category, DiagnosticCategory::Error);
    assert_eq!(diag.file, "a.ts");
    assert_eq!(diag.start, 12);
    assert_eq!(diag.length, 20);
    assert_eq!(
        diag.message_text,
        "Unsafe return of type 'Promise<any>' from function with return type 'Promise<string>'."
    );
}

#[test]
fn test_diagnostic_serializes_category_lowercase() {
    let message = get_message_by_key("unsafeReturn").expect("key registered");
    let diag = Diagnostic::from_message(message, "a.ts", 0, 1, &["any"]);
    let json = serde_json::to_value(&diag).expect("serializable");
    assert_eq!(json["category"], "error");
    assert_eq!(json["key"], "unsafeReturn");
    assert_eq!(json["message_text"], "Unsafe return of an any typed value.");
}
