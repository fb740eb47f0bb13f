//! Control flow graph implementation.
//!
//! This module provides the [`Cfg`] structure the engine analyzes and rewrites: an
//! arena of nodes and edges, the statement trees those nodes point into, and the
//! variable table assumptions are keyed on.
//!
//! The graph's mutation surface is deliberately tiny. The only structural rewrite the
//! engine ever performs is [`Cfg::replace_with_nop`] (swap a node's kind for
//! [`NodeKind::Nop`] while keeping every incoming edge, optionally detaching outgoing
//! edges whose branch can never be taken), plus the in-place expression substitution
//! [`Cfg::replace_expr`]. Everything else is read-only.
//!
//! # Boundary Edges
//!
//! Control enters and leaves the graph through edges with a missing endpoint: entry
//! edges have no source node, exit edges no target. The fixpoint driver seeds entry
//! edges with the TOP assumption.

use std::fmt::Write;

use crate::{
    cfg::{CfgEdge, CfgNode, EdgeId, EdgeRole, NodeId, NodeKind, StmtId},
    ir::{Expr, ExprId, VarId, Variable},
    Result,
};

/// A control flow graph over the adapter-layer IR.
///
/// # Examples
///
/// ```rust
/// use cfgfold::{Cfg, Expr, NodeKind, Variable, VarKind, ScalarType};
///
/// let mut cfg = Cfg::new();
/// let v = cfg.add_variable(Variable::new("v", VarKind::Local, ScalarType::Int));
/// let stmt = cfg.add_stmt(Expr::var(v));
/// let node = cfg.add_node(NodeKind::Generic);
/// cfg.add_entry_edge(node);
/// cfg.add_exit_edge(node, None);
/// assert_eq!(cfg.node_count(), 1);
/// # let _ = (v, stmt);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Cfg {
    variables: Vec<Variable>,
    stmts: Vec<Expr>,
    nodes: Vec<CfgNode>,
    edges: Vec<CfgEdge>,
    entry_edges: Vec<EdgeId>,
    exit_edges: Vec<EdgeId>,
}

impl Cfg {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a variable to the variable table.
    pub fn add_variable(&mut self, variable: Variable) -> VarId {
        let id = VarId::new(u32::try_from(self.variables.len()).unwrap_or(u32::MAX));
        self.variables.push(variable);
        id
    }

    /// Returns a variable table entry.
    #[must_use]
    pub fn variable(&self, id: VarId) -> Option<&Variable> {
        self.variables.get(id.index())
    }

    /// Adds a statement expression tree to the graph.
    pub fn add_stmt(&mut self, stmt: Expr) -> StmtId {
        let id = StmtId::new(self.stmts.len());
        self.stmts.push(stmt);
        id
    }

    /// Returns a statement tree.
    #[must_use]
    pub fn stmt(&self, id: StmtId) -> Option<&Expr> {
        self.stmts.get(id.index())
    }

    /// Adds a node to the graph.
    pub fn add_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(CfgNode::new(kind));
        id
    }

    /// Returns a node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&CfgNode> {
        self.nodes.get(id.index())
    }

    /// Returns an edge.
    #[must_use]
    pub fn edge(&self, id: EdgeId) -> Option<&CfgEdge> {
        self.edges.get(id.index())
    }

    /// Adds an edge between two nodes.
    ///
    /// Both nodes must already exist in the graph.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId, role: Option<EdgeRole>) -> EdgeId {
        let id = EdgeId::new(self.edges.len());
        self.edges.push(CfgEdge {
            source: Some(source),
            target: Some(target),
            role,
        });
        self.nodes[source.index()].outgoing.push(id);
        self.nodes[target.index()].incoming.push(id);
        id
    }

    /// Adds a graph-entry edge leading to `target`.
    pub fn add_entry_edge(&mut self, target: NodeId) -> EdgeId {
        let id = EdgeId::new(self.edges.len());
        self.edges.push(CfgEdge {
            source: None,
            target: Some(target),
            role: None,
        });
        self.nodes[target.index()].incoming.push(id);
        self.entry_edges.push(id);
        id
    }

    /// Adds a graph-exit edge leaving `source`.
    pub fn add_exit_edge(&mut self, source: NodeId, role: Option<EdgeRole>) -> EdgeId {
        let id = EdgeId::new(self.edges.len());
        self.edges.push(CfgEdge {
            source: Some(source),
            target: None,
            role,
        });
        self.nodes[source.index()].outgoing.push(id);
        self.exit_edges.push(id);
        id
    }

    /// Returns the graph-entry edges.
    #[must_use]
    pub fn entry_edges(&self) -> &[EdgeId] {
        &self.entry_edges
    }

    /// Returns the graph-exit edges.
    #[must_use]
    pub fn exit_edges(&self) -> &[EdgeId] {
        &self.exit_edges
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of edges, including detached ones.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns an iterator over all node ids.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId::new)
    }

    pub(crate) fn node_ref(&self, id: NodeId) -> Result<&CfgNode> {
        self.nodes
            .get(id.index())
            .ok_or_else(|| graph_error!("node {} does not exist", id))
    }

    pub(crate) fn edge_ref(&self, id: EdgeId) -> Result<&CfgEdge> {
        self.edges
            .get(id.index())
            .ok_or_else(|| graph_error!("edge {} does not exist", id))
    }

    /// Resolves an expression position inside a statement tree.
    ///
    /// Both the statement and the position must exist; a node referencing a position
    /// its statement does not contain is a contract violation, not a recoverable
    /// condition.
    pub(crate) fn expr(&self, stmt: StmtId, position: ExprId) -> Result<&Expr> {
        let tree = self
            .stmts
            .get(stmt.index())
            .ok_or_else(|| graph_error!("statement s{} does not exist", stmt.index()))?;
        tree.find(position).ok_or_else(|| {
            graph_error!("expression {} is not part of statement s{}", position, stmt.index())
        })
    }

    /// Replaces the expression at `target` within a statement tree, in place.
    ///
    /// # Errors
    ///
    /// [`crate::Error::RewriteTargetMissing`] if the target expression is not present;
    /// the rewrite was built against a stale tree and must not silently no-op.
    pub fn replace_expr(&mut self, stmt: StmtId, target: ExprId, replacement: Expr) -> Result<()> {
        let tree = self
            .stmts
            .get_mut(stmt.index())
            .ok_or_else(|| graph_error!("statement s{} does not exist", stmt.index()))?;
        if tree.replace(target, replacement) {
            Ok(())
        } else {
            Err(crate::Error::RewriteTargetMissing(target))
        }
    }

    /// Replaces a node with a no-op, optionally detaching outgoing edges.
    ///
    /// All incoming edges are kept, so predecessors are unaffected. Outgoing edges
    /// whose role appears in `omit` are detached from both endpoints: their targets
    /// lose the corresponding in-edge and become structurally unreachable unless some
    /// other path still reaches them. Outgoing edges with no role, or a role not in
    /// `omit`, are kept verbatim.
    ///
    /// # Errors
    ///
    /// [`crate::Error::Graph`] if the node does not exist.
    pub fn replace_with_nop(&mut self, node: NodeId, omit: &[EdgeRole]) -> Result<()> {
        if node.index() >= self.nodes.len() {
            return Err(graph_error!("node {} does not exist", node));
        }

        let detach: Vec<EdgeId> = self.nodes[node.index()]
            .outgoing
            .iter()
            .copied()
            .filter(|edge| {
                self.edges[edge.index()]
                    .role
                    .is_some_and(|role| omit.contains(&role))
            })
            .collect();

        for edge_id in detach {
            let edge = &mut self.edges[edge_id.index()];
            let target = edge.target.take();
            edge.source = None;

            self.nodes[node.index()].outgoing.retain(|e| *e != edge_id);
            if let Some(target) = target {
                self.nodes[target.index()].incoming.retain(|e| *e != edge_id);
            } else {
                self.exit_edges.retain(|e| *e != edge_id);
            }
        }

        self.nodes[node.index()].kind = NodeKind::Nop;
        Ok(())
    }

    /// Renders the graph in DOT format for Graphviz tools.
    #[must_use]
    pub fn to_dot(&self, title: Option<&str>) -> String {
        let mut dot = String::new();

        dot.push_str("digraph CFG {\n");
        if let Some(name) = title {
            let _ = writeln!(dot, "    label=\"{name}\";");
            dot.push_str("    labelloc=t;\n");
        }
        dot.push_str("    node [shape=box, fontname=\"Courier\", fontsize=10];\n\n");

        for (idx, node) in self.nodes.iter().enumerate() {
            let label = match &node.kind {
                NodeKind::Cond { stmt, condition } => self
                    .stmts
                    .get(stmt.index())
                    .and_then(|tree| tree.find(*condition))
                    .map_or_else(|| "cond ?".to_string(), |expr| format!("cond {expr}")),
                NodeKind::Read { var, .. } => format!("read {var}"),
                NodeKind::Write { target, .. } => format!("write {target}"),
                NodeKind::ReadWrite { target, .. } => format!("read-write {target}"),
                NodeKind::Nop => "nop".to_string(),
                NodeKind::Generic => "generic".to_string(),
            };
            let _ = writeln!(dot, "    n{idx} [label=\"n{idx}: {label}\"];");
        }

        dot.push('\n');
        for edge in &self.edges {
            if edge.is_detached() {
                continue;
            }
            let source = edge
                .source
                .map_or_else(|| "entry".to_string(), |n| format!("n{}", n.index()));
            let target = edge
                .target
                .map_or_else(|| "exit".to_string(), |n| format!("n{}", n.index()));
            match edge.role {
                Some(role) => {
                    let _ = writeln!(dot, "    {source} -> {target} [label=\"{role}\"];");
                }
                None => {
                    let _ = writeln!(dot, "    {source} -> {target};");
                }
            }
        }

        dot.push_str("}\n");
        dot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Literal, ScalarType, VarKind};

    fn diamond() -> (Cfg, NodeId, NodeId, NodeId) {
        // entry -> cond -> (then: n1, else: n2)
        let mut cfg = Cfg::new();
        let v = cfg.add_variable(Variable::new("v", VarKind::Local, ScalarType::Bool));
        let cond_expr = Expr::var(v);
        let cond_id = cond_expr.id();
        let stmt = cfg.add_stmt(cond_expr);

        let cond = cfg.add_node(NodeKind::Cond {
            stmt,
            condition: cond_id,
        });
        let then_node = cfg.add_node(NodeKind::Generic);
        let else_node = cfg.add_node(NodeKind::Generic);

        cfg.add_entry_edge(cond);
        cfg.add_edge(cond, then_node, Some(EdgeRole::Then));
        cfg.add_edge(cond, else_node, Some(EdgeRole::Else));
        cfg.add_exit_edge(then_node, None);
        cfg.add_exit_edge(else_node, None);

        (cfg, cond, then_node, else_node)
    }

    #[test]
    fn test_replace_with_nop_detaches_named_role() {
        let (mut cfg, cond, then_node, else_node) = diamond();

        cfg.replace_with_nop(cond, &[EdgeRole::Else]).unwrap();

        let node = cfg.node(cond).unwrap();
        assert!(matches!(node.kind(), NodeKind::Nop));
        assert_eq!(node.incoming().len(), 1);
        assert_eq!(node.outgoing().len(), 1);

        // The THEN successor keeps its in-edge, the ELSE successor loses it
        assert_eq!(cfg.node(then_node).unwrap().incoming().len(), 1);
        assert_eq!(cfg.node(else_node).unwrap().incoming().len(), 0);
    }

    #[test]
    fn test_replace_with_nop_keeps_unlisted_edges() {
        let (mut cfg, cond, then_node, else_node) = diamond();

        cfg.replace_with_nop(cond, &[]).unwrap();

        assert_eq!(cfg.node(cond).unwrap().outgoing().len(), 2);
        assert_eq!(cfg.node(then_node).unwrap().incoming().len(), 1);
        assert_eq!(cfg.node(else_node).unwrap().incoming().len(), 1);
    }

    #[test]
    fn test_replace_expr_missing_target_is_fatal() {
        let mut cfg = Cfg::new();
        let stmt = cfg.add_stmt(Expr::literal(Literal::I32(1)));
        let stranger = Expr::literal(Literal::I32(2));
        let result = cfg.replace_expr(stmt, stranger.id(), stranger);
        assert!(matches!(
            result,
            Err(crate::Error::RewriteTargetMissing(_))
        ));
    }

    #[test]
    fn test_to_dot_lists_live_edges_only() {
        let (mut cfg, cond, _, _) = diamond();
        cfg.replace_with_nop(cond, &[EdgeRole::Else]).unwrap();

        let dot = cfg.to_dot(Some("diamond"));
        assert!(dot.contains("entry -> n0"));
        assert!(dot.contains("n0 -> n1 [label=\"then\"]"));
        assert!(!dot.contains("n0 -> n2"));
    }
}
