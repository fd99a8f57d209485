use super::{DiagnosticCategory, DiagnosticMessage};

pub mod diagnostic_codes {
    pub const UNSAFE_RETURN_OF_AN_TYPED_VALUE: u32 = 7101;
    pub const UNSAFE_RETURN_OF_TYPE_FROM_FUNCTION_WITH_RETURN_TYPE: u32 = 7102;
}

pub mod diagnostic_messages {
    pub const UNSAFE_RETURN_OF_AN_TYPED_VALUE: &str = "Unsafe return of an {0} typed value.";
    pub const UNSAFE_RETURN_OF_TYPE_FROM_FUNCTION_WITH_RETURN_TYPE: &str =
        "Unsafe return of type '{0}' from function with return type '{1}'.";
}

/// `unsafeReturn`: the returned value is itself `any` or `any[]`.
pub const UNSAFE_RETURN: DiagnosticMessage = DiagnosticMessage {
    code: diagnostic_codes::UNSAFE_RETURN_OF_AN_TYPED_VALUE,
    key: "unsafeReturn",
    category: DiagnosticCategory::Error,
    message: diagnostic_messages::UNSAFE_RETURN_OF_AN_TYPED_VALUE,
};

/// `unsafeReturnAssignment`: the returned type narrows `any` into the
/// declared return type.
pub const UNSAFE_RETURN_ASSIGNMENT: DiagnosticMessage = DiagnosticMessage {
    code: diagnostic_codes::UNSAFE_RETURN_OF_TYPE_FROM_FUNCTION_WITH_RETURN_TYPE,
    key: "unsafeReturnAssignment",
    category: DiagnosticCategory::Error,
    message: diagnostic_messages::UNSAFE_RETURN_OF_TYPE_FROM_FUNCTION_WITH_RETURN_TYPE,
};

pub static DIAGNOSTIC_MESSAGES: &[DiagnosticMessage] = &[UNSAFE_RETURN, UNSAFE_RETURN_ASSIGNMENT];
