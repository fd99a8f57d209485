//! Checker options.

/// How many findings a single return site may produce against an
/// overloaded declaration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OverloadPolicy {
    /// Signatures are checked in declaration order and the first unsafe one
    /// is reported.
    #[default]
    FirstUnsafe,
    /// Every unsafe signature is reported.
    EachSignature,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CheckerOptions {
    pub overload_policy: OverloadPolicy,
}

impl CheckerOptions {
    pub fn with_overload_policy(mut self, policy: OverloadPolicy) -> Self {
        self.overload_policy = policy;
        self
    }
}
