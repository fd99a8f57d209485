//! Unsafe return checking.
//!
//! For every return site the driver asks two questions, in order:
//!
//! 1. Is the returned value itself `any` or `any[]`? Then it is reported
//!    outright, whatever the declared return type says.
//! 2. Otherwise, if the enclosing function has an explicit return type
//!    annotation, does the returned type narrow `any` into any of the
//!    declared signatures' return types? Signatures are visited in
//!    declaration order; a signature whose return type is the returned type
//!    itself ends the search.
//!
//! Functions without an annotation only get the first check: their return
//! type was inferred from the body, so it matches by construction.

use crate::context::{CheckerOptions, OverloadPolicy};
use crate::error::CheckError;
use crate::host::CheckerHost;
use crate::node::NodeIndex;
use crate::return_site::{ReturnSite, collect_return_sites};
use crate::scope_finder::find_enclosing_function;
use anyflow_common::diagnostics::{
    Diagnostic, DiagnosticMessage, UNSAFE_RETURN, UNSAFE_RETURN_ASSIGNMENT,
};
use anyflow_common::span::Span;
use anyflow_solver::{
    AnyClassification, TypeFormatter, TypeId, UnsafeAssignmentChecker, classify_any,
};
use tracing::{debug, trace};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UnsafeReturnKind {
    /// The returned value is itself `any` or an array of `any`.
    UnsafeReturn { classification: AnyClassification },
    /// The returned type narrows `any` into the declared return type.
    UnsafeReturnAssignment {
        sender: TypeId,
        receiver: TypeId,
        sender_text: String,
        receiver_text: String,
    },
}

/// One finding at one return site.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnsafeReturnFinding {
    /// The node the finding is attached to (see [`ReturnSite::report_node`]).
    pub node: NodeIndex,
    pub span: Span,
    pub kind: UnsafeReturnKind,
}

impl UnsafeReturnFinding {
    pub fn message(&self) -> &'static DiagnosticMessage {
        match self.kind {
            UnsafeReturnKind::UnsafeReturn { .. } => &UNSAFE_RETURN,
            UnsafeReturnKind::UnsafeReturnAssignment { .. } => &UNSAFE_RETURN_ASSIGNMENT,
        }
    }

    pub fn to_diagnostic(&self, file: &str) -> Diagnostic {
        let args: Vec<&str> = match &self.kind {
            UnsafeReturnKind::UnsafeReturn { classification } => {
                vec![classification.type_name().unwrap_or("any")]
            }
            UnsafeReturnKind::UnsafeReturnAssignment {
                sender_text,
                receiver_text,
                ..
            } => vec![sender_text.as_str(), receiver_text.as_str()],
        };
        Diagnostic::from_message(
            self.message(),
            file,
            self.span.start,
            self.span.len(),
            &args,
        )
    }
}

/// Receiver of findings.
pub trait DiagnosticSink {
    fn report(&mut self, finding: UnsafeReturnFinding);
}

impl DiagnosticSink for Vec<UnsafeReturnFinding> {
    fn report(&mut self, finding: UnsafeReturnFinding) {
        self.push(finding);
    }
}

/// Drives return-site checking over one file of a host program.
pub struct UnsafeReturnChecker<'a, H: CheckerHost + ?Sized> {
    host: &'a H,
    options: CheckerOptions,
}

impl<'a, H: CheckerHost + ?Sized> UnsafeReturnChecker<'a, H> {
    pub fn new(host: &'a H) -> Self {
        Self::with_options(host, CheckerOptions::default())
    }

    pub fn with_options(host: &'a H, options: CheckerOptions) -> Self {
        UnsafeReturnChecker { host, options }
    }

    /// Check every return site under `root`. Returns the number of findings
    /// reported to `sink`.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(file = %self.host.file_name(), root = %root)
    )]
    pub fn check_source_file(
        &self,
        root: NodeIndex,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<usize, CheckError> {
        let sites = collect_return_sites(self.host.arena(), root)?;
        let mut reported = 0;
        for &site in &sites {
            reported += self.check_return_site(site, sink)?;
        }
        debug!(sites = sites.len(), reported, "checked return sites");
        Ok(reported)
    }

    /// Check a single return site. Returns the number of findings reported.
    pub fn check_return_site(
        &self,
        site: ReturnSite,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<usize, CheckError> {
        let arena = self.host.arena();
        let db = self.host.types();
        let report_node = site.report_node();
        let span = arena
            .get(report_node)
            .ok_or(CheckError::MissingNode(report_node))?
            .span;

        let returned = self.resolved_type(site.expression())?;
        let classification = classify_any(db, returned);
        if classification.is_dynamic() {
            debug!(node = %report_node, ?classification, "returned value is dynamic");
            sink.report(UnsafeReturnFinding {
                node: report_node,
                span,
                kind: UnsafeReturnKind::UnsafeReturn { classification },
            });
            return Ok(1);
        }

        let function = match site {
            ReturnSite::Explicit { statement, .. } => find_enclosing_function(arena, statement),
            ReturnSite::ArrowBody { function, .. } => Some(function),
        };
        let Some(function) = function else {
            trace!(node = %report_node, "return outside of any function");
            return Ok(0);
        };
        let function_node = arena
            .get(function)
            .ok_or(CheckError::MissingNode(function))?;
        let annotated = arena
            .get_function(function_node)
            .is_some_and(|data| data.has_return_type_annotation());
        if !annotated {
            trace!(node = %report_node, "no declared return type");
            return Ok(0);
        }

        let function_type = self.resolved_type(function)?;
        let mut checker = UnsafeAssignmentChecker::new(db);
        let mut reported = 0;
        for signature in db.call_signatures(function_type) {
            let declared = signature.return_type;
            if declared.is_none() {
                continue;
            }
            if db.is_identical(returned, declared) {
                trace!(node = %report_node, "returned type matches a declared signature");
                break;
            }
            let Some(found) = checker.check(returned, declared) else {
                continue;
            };

            let mut formatter = TypeFormatter::new(db);
            let sender_text = formatter.format(found.sender);
            let receiver_text = formatter.format(found.receiver);
            debug!(
                node = %report_node,
                sender = %sender_text,
                receiver = %receiver_text,
                "unsafe return assignment"
            );
            sink.report(UnsafeReturnFinding {
                node: report_node,
                span,
                kind: UnsafeReturnKind::UnsafeReturnAssignment {
                    sender: found.sender,
                    receiver: found.receiver,
                    sender_text,
                    receiver_text,
                },
            });
            reported += 1;
            if self.options.overload_policy == OverloadPolicy::FirstUnsafe {
                break;
            }
        }
        Ok(reported)
    }

    fn resolved_type(&self, idx: NodeIndex) -> Result<TypeId, CheckError> {
        if self.host.arena().get(idx).is_none() {
            return Err(CheckError::MissingNode(idx));
        }
        let ty = self.host.get_type_of_node(idx);
        if ty.is_none() {
            return Err(CheckError::UnresolvedType { node: idx });
        }
        Ok(ty)
    }
}

/// Check every return site under `root` and collect the findings.
pub fn check_unsafe_returns<H: CheckerHost + ?Sized>(
    host: &H,
    root: NodeIndex,
    options: CheckerOptions,
) -> Result<Vec<UnsafeReturnFinding>, CheckError> {
    let mut findings = Vec::new();
    UnsafeReturnChecker::with_options(host, options).check_source_file(root, &mut findings)?;
    Ok(findings)
}

#[cfg(test)]
#[path = "../tests/unsafe_return_tests.rs"]
mod tests;
