//! The per-node transformation function and its rewrite actions.
//!
//! Where the flow function merely computes facts, the transformation function spends
//! them: a conditional whose condition is statically decided becomes a no-op with the
//! untaken arm disconnected, and a read of a known constant becomes the constant
//! itself. Each opportunity is packaged as a [`Transformation`] (one graph rewrite
//! plus one IR rewrite) that the fixpoint driver applies to the mutable graph.
//!
//! Declining is the common case and is an ordinary `None`: a node that cannot be
//! rewritten this visit is interpreted by the flow function instead. The two are
//! mutually exclusive within one visit but together cover every node, every visit.

use tracing::debug;

use crate::{
    cfg::{Cfg, EdgeRole, NodeId, NodeKind, StmtId},
    dataflow::{evaluate, Assumption},
    ir::{Expr, ExprId, ExprKind, Literal},
    Error, Result,
};

/// A pending CFG/IR rewrite produced by the transformation function.
///
/// A transformation is single-use and node-specific: it records the node it was built
/// for, and applying it verifies that node still has the shape the opportunity was
/// derived from. The graph rewrite keeps every incoming edge of the node; outgoing
/// edges listed in the omit set are left unconnected, making the corresponding branch
/// arm structurally unreachable.
#[derive(Debug)]
pub struct Transformation {
    node: NodeId,
    built_for: &'static str,
    omit: Vec<EdgeRole>,
    stmt: StmtId,
    target: ExprId,
    replacement: Expr,
}

impl Transformation {
    /// Returns the node this transformation was built for.
    #[must_use]
    pub const fn node(&self) -> NodeId {
        self.node
    }

    /// Returns the outgoing edge roles that will be left unconnected.
    #[must_use]
    pub fn omitted_roles(&self) -> &[EdgeRole] {
        &self.omit
    }

    /// Applies this transformation to the graph, consuming it.
    ///
    /// The IR rewrite runs first: if its target expression has gone missing the graph
    /// is left completely untouched. Then the node is replaced by a no-op with the
    /// recorded edges omitted.
    ///
    /// # Errors
    ///
    /// - [`Error::RewriteNodeMismatch`] if the node no longer has the kind this
    ///   transformation was built for
    /// - [`Error::RewriteTargetMissing`] if the IR rewrite cannot locate its target
    /// - [`Error::Graph`] if the node does not exist
    pub fn apply(self, cfg: &mut Cfg) -> Result<()> {
        let found = cfg.node_ref(self.node)?.kind().name();
        if found != self.built_for {
            return Err(Error::RewriteNodeMismatch {
                expected: self.built_for,
                found,
            });
        }

        cfg.replace_expr(self.stmt, self.target, self.replacement)?;
        cfg.replace_with_nop(self.node, &self.omit)
    }
}

/// Inspects a node for a profitable rewrite under the incoming assumption.
///
/// Returns the transformation to apply, or `None` when the node should be interpreted
/// by the flow function instead. Two kinds can transform:
///
/// - **Conditional**: the condition is not already a literal, is free of side effects,
///   and evaluates to a boolean constant under the input. The rewrite pins the
///   condition to that literal and disconnects the edge of the arm that can no longer
///   be taken (ELSE for a true condition, THEN for false; untagged edges are always
///   kept).
/// - **Read**: the input records a constant for the variable. The rewrite splices a
///   fresh literal node into the read's position: a clone, never an alias, since the
///   recorded literal may already appear elsewhere in the IR.
///
/// # Errors
///
/// [`crate::Error::Graph`] if a conditional's condition expression cannot be resolved;
/// a conditional without a condition is a malformed graph.
pub fn transform(cfg: &Cfg, node: NodeId, input: &Assumption) -> Result<Option<Transformation>> {
    let node_ref = cfg.node_ref(node)?;

    match node_ref.kind() {
        NodeKind::Cond { stmt, condition } => {
            let cond = cfg.expr(*stmt, *condition)?;
            if matches!(cond.kind(), ExprKind::Literal(_)) {
                // Already folded; nothing left to decide.
                return Ok(None);
            }
            if cond.has_side_effects() {
                return Ok(None);
            }

            let value = match evaluate(cond, input) {
                Some(Literal::Bool(value)) => value,
                _ => return Ok(None),
            };

            let untaken = if value { EdgeRole::Else } else { EdgeRole::Then };
            debug!("folding condition of {node} to {value}, disconnecting {untaken} arm");

            Ok(Some(Transformation {
                node,
                built_for: node_ref.kind().name(),
                omit: vec![untaken],
                stmt: *stmt,
                target: *condition,
                replacement: Expr::literal(Literal::Bool(value)),
            }))
        }

        NodeKind::Read { stmt, position, var } => {
            let Some(literal) = input.get(*var) else {
                return Ok(None);
            };
            debug!("folding read of {var} at {node} to {literal}");

            // A read has no branching; every edge is preserved verbatim.
            Ok(Some(Transformation {
                node,
                built_for: node_ref.kind().name(),
                omit: Vec::new(),
                stmt: *stmt,
                target: *position,
                replacement: Expr::literal(literal),
            }))
        }

        NodeKind::Write { .. }
        | NodeKind::ReadWrite { .. }
        | NodeKind::Nop
        | NodeKind::Generic => Ok(None),
    }
}
