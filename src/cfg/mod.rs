//! Control flow graph abstraction.
//!
//! Nodes are program points classified by the closed [`NodeKind`] enum; edges are
//! possible control transfers, optionally tagged with a branch [`EdgeRole`]. The graph
//! also owns the statement expression trees its nodes point into and the variable
//! table the analysis is keyed on.

mod graph;
mod node;

pub use graph::Cfg;
pub use node::{CfgEdge, CfgNode, EdgeId, EdgeRole, NodeId, NodeKind, StmtId};
