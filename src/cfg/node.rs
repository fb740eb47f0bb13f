//! Node and edge types for the control flow graph.
//!
//! The original front end models CFG nodes as an open class hierarchy; the engine only
//! distinguishes the handful of shapes it acts on, so nodes here are a closed
//! [`NodeKind`] enum and both the flow and transformation functions dispatch over it
//! with an exhaustive `match`.

use std::fmt;

use crate::ir::{ExprId, VarId};

/// Identifier of a node in the control flow graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Creates a new node identifier.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the index of this node.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Identifier of an edge in the control flow graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeId(usize);

impl EdgeId {
    /// Creates a new edge identifier.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the index of this edge.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// Identifier of a statement tree owned by the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StmtId(usize);

impl StmtId {
    /// Creates a new statement identifier.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the index of this statement.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0
    }
}

/// Role tag on an outgoing edge of a conditional node.
///
/// Edges without a role are unconditional. Roles are only meaningful on the outputs of
/// [`NodeKind::Cond`] nodes; they select which deduced assumption flows along the edge
/// and which arm a constant-condition rewrite disconnects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeRole {
    /// Taken when the condition evaluates to true.
    Then,
    /// Taken when the condition evaluates to false.
    Else,
}

impl fmt::Display for EdgeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Then => write!(f, "then"),
            Self::Else => write!(f, "else"),
        }
    }
}

/// The kind of a control flow graph node.
///
/// Each variant exposes exactly the accessors the engine needs and nothing more. Nodes
/// reference expression positions inside the statement trees owned by the graph; they
/// never own expressions themselves, since several nodes can point into one statement
/// (a read nested in a condition, for instance).
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A conditional with a boolean-valued condition expression.
    ///
    /// Outgoing edges tagged [`EdgeRole::Then`]/[`EdgeRole::Else`] receive the deduced
    /// branch assumptions; untagged outgoing edges receive the unmodified input.
    Cond {
        /// Statement tree containing the condition.
        stmt: StmtId,
        /// Position of the condition expression within the statement.
        condition: ExprId,
    },

    /// A read of a tracked variable.
    Read {
        /// Statement tree the read occurs in.
        stmt: StmtId,
        /// Position of the variable reference within the statement.
        position: ExprId,
        /// The variable being read.
        var: VarId,
    },

    /// A write to a tracked variable.
    Write {
        /// Statement tree the write occurs in.
        stmt: StmtId,
        /// The variable being assigned.
        target: VarId,
        /// Position of the assigned value expression, if any.
        ///
        /// A declaration without an initializer has no value expression; flowing
        /// through it destroys any constant fact for the target.
        value: Option<ExprId>,
    },

    /// A combined read-and-write of a tracked variable (compound assignment).
    ReadWrite {
        /// Statement tree the operation occurs in.
        stmt: StmtId,
        /// The variable being read and assigned.
        target: VarId,
        /// Position of the assigned value expression, if any.
        value: Option<ExprId>,
    },

    /// A node with no effect on the analysis.
    ///
    /// Transformations replace folded nodes with this kind; assumptions pass through
    /// unchanged.
    Nop,

    /// Any other program point (calls, returns, entry markers, ...).
    ///
    /// Assumptions pass through unchanged and no transformation applies.
    Generic,
}

impl NodeKind {
    /// Returns a short name for this kind, used in errors and graph dumps.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Cond { .. } => "cond",
            Self::Read { .. } => "read",
            Self::Write { .. } => "write",
            Self::ReadWrite { .. } => "read-write",
            Self::Nop => "nop",
            Self::Generic => "generic",
        }
    }
}

/// A node in the control flow graph: a kind plus ordered edge adjacency.
#[derive(Debug, Clone)]
pub struct CfgNode {
    pub(crate) kind: NodeKind,
    pub(crate) incoming: Vec<EdgeId>,
    pub(crate) outgoing: Vec<EdgeId>,
}

impl CfgNode {
    pub(crate) const fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            incoming: Vec::new(),
            outgoing: Vec::new(),
        }
    }

    /// Returns the kind of this node.
    #[must_use]
    pub const fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Returns the incoming edges, in insertion order.
    #[must_use]
    pub fn incoming(&self) -> &[EdgeId] {
        &self.incoming
    }

    /// Returns the outgoing edges, in insertion order.
    #[must_use]
    pub fn outgoing(&self) -> &[EdgeId] {
        &self.outgoing
    }
}

/// An edge in the control flow graph.
///
/// Graph-boundary edges exist with one endpoint missing: an entry edge has no source,
/// an exit edge has no target. An edge with *both* endpoints missing has been detached
/// by a constant-condition rewrite and is no longer part of the graph.
#[derive(Debug, Clone)]
pub struct CfgEdge {
    pub(crate) source: Option<NodeId>,
    pub(crate) target: Option<NodeId>,
    pub(crate) role: Option<EdgeRole>,
}

impl CfgEdge {
    /// Returns the source node, or `None` for an entry or detached edge.
    #[must_use]
    pub const fn source(&self) -> Option<NodeId> {
        self.source
    }

    /// Returns the target node, or `None` for an exit or detached edge.
    #[must_use]
    pub const fn target(&self) -> Option<NodeId> {
        self.target
    }

    /// Returns the role tag, if any.
    #[must_use]
    pub const fn role(&self) -> Option<EdgeRole> {
        self.role
    }

    /// Returns `true` if this edge has been detached from the graph.
    #[must_use]
    pub const fn is_detached(&self) -> bool {
        self.source.is_none() && self.target.is_none()
    }
}
