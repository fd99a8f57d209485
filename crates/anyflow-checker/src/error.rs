//! Errors raised by the return-site driver.
//!
//! These are host contract violations found before the type-flow core is
//! called. The core itself never fails: it answers safe or unsafe.

use crate::node::NodeIndex;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    /// The host returned the absent descriptor for a node that must be typed.
    #[error("no type was resolved for node {node}")]
    UnresolvedType { node: NodeIndex },

    /// A node index that does not exist in the arena.
    #[error("node {0} is not in the syntax arena")]
    MissingNode(NodeIndex),
}
