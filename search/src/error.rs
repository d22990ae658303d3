//! Typed search errors.
//!
//! `SearchError` covers pre-flight rejections and hard failures. Running out
//! of node budget is not an error: it is reported through
//! [`crate::graph::TerminationReason`] and still yields a full graph.

use stackplan_kernel::error::WorldError;
use stackplan_kernel::proof::canon::CanonError;

use crate::node::NodeId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// The world model rejected a query or transition during expansion.
    #[error(transparent)]
    World(#[from] WorldError),
    /// A node id that does not exist in the graph.
    #[error("unknown node: {id}")]
    UnknownNode { id: NodeId },
    /// The policy combines options that cannot be honoured together.
    #[error("invalid search policy: {detail}")]
    InvalidPolicy { detail: String },
    /// Graph export produced a value outside canonical JSON.
    #[error(transparent)]
    Canon(#[from] CanonError),
}
