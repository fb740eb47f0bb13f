//! The per-node flow (transfer) function.
//!
//! Interpretation advances assumptions across a node without touching the graph: given
//! the assumption flowing into a node, it produces one assumption per outgoing edge.
//! The external fixpoint driver is responsible for joining assumptions where edges
//! meet; this function only ever sees the already-joined input.
//!
//! Only two node kinds carry transfer behavior. Conditionals split the input into a
//! THEN and an ELSE variant via branch deduction; writes re-evaluate the fact for
//! their target. Every other kind, including reads (which matter to the
//! transformation function but not to interpretation), passes the input through
//! unchanged.

use crate::{
    cfg::{Cfg, EdgeId, EdgeRole, NodeId, NodeKind},
    dataflow::{deduce, evaluate, Assumption, Updater},
    ir::Literal,
    Result,
};

/// Interprets a node, producing the assumption for each outgoing edge.
///
/// The result pairs every outgoing edge of the node with the assumption holding on it,
/// in the node's edge order.
///
/// # Errors
///
/// [`crate::Error::Graph`] if the node, or an expression position it references, does
/// not exist; that is a malformed graph, not an analysis outcome.
pub fn flow(cfg: &Cfg, node: NodeId, input: &Assumption) -> Result<Vec<(EdgeId, Assumption)>> {
    let node_ref = cfg.node_ref(node)?;

    match node_ref.kind() {
        NodeKind::Cond { stmt, condition } => {
            let cond = cfg.expr(*stmt, *condition)?;

            // Each branch speculates from the same base; copy-on-write keeps the
            // common case (nothing deduced) allocation-free.
            let mut then_updater = Updater::new(input.clone());
            deduce(cond, &Literal::Bool(true), &mut then_updater);
            let then_assumption = then_updater.unwrap();

            let mut else_updater = Updater::new(input.clone());
            deduce(cond, &Literal::Bool(false), &mut else_updater);
            let else_assumption = else_updater.unwrap();

            node_ref
                .outgoing()
                .iter()
                .map(|edge_id| {
                    let assumption = match cfg.edge_ref(*edge_id)?.role() {
                        Some(EdgeRole::Then) => then_assumption.clone(),
                        Some(EdgeRole::Else) => else_assumption.clone(),
                        None => input.clone(),
                    };
                    Ok((*edge_id, assumption))
                })
                .collect()
        }

        NodeKind::Write { stmt, target, value }
        | NodeKind::ReadWrite { stmt, target, value } => {
            let fact = match value {
                Some(value_id) => {
                    let value_expr = cfg.expr(*stmt, *value_id)?;
                    evaluate(value_expr, input).filter(|literal| {
                        cfg.variable(*target)
                            .is_some_and(|var| var.accepts(literal))
                    })
                }
                // A declaration without an initializer tells us nothing about the
                // variable's value.
                None => None,
            };

            // A known, type-compatible value overwrites any prior fact; anything
            // else destroys it. Both go through the same set call.
            let mut updater = Updater::new(input.clone());
            updater.set(*target, fact);
            let output = updater.unwrap();

            Ok(node_ref
                .outgoing()
                .iter()
                .map(|edge_id| (*edge_id, output.clone()))
                .collect())
        }

        NodeKind::Read { .. } | NodeKind::Nop | NodeKind::Generic => Ok(node_ref
            .outgoing()
            .iter()
            .map(|edge_id| (*edge_id, input.clone()))
            .collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cfg::StmtId,
        dataflow::lattice::JoinSemiLattice,
        ir::{BinaryOp, Expr, ExprId, ScalarType, VarId, VarKind, Variable},
    };

    struct CondSetup {
        cfg: Cfg,
        node: NodeId,
        then_edge: EdgeId,
        else_edge: EdgeId,
        plain_edge: EdgeId,
        v: VarId,
    }

    /// cond(v == 5) with THEN, ELSE and one untagged outgoing edge.
    fn cond_on_eq() -> CondSetup {
        let mut cfg = Cfg::new();
        let v = cfg.add_variable(Variable::new("v", VarKind::Local, ScalarType::Int));
        let cond = Expr::binary(BinaryOp::Eq, Expr::var(v), Expr::literal(Literal::I32(5)));
        let cond_id = cond.id();
        let stmt = cfg.add_stmt(cond);

        let node = cfg.add_node(NodeKind::Cond {
            stmt,
            condition: cond_id,
        });
        let succ_then = cfg.add_node(NodeKind::Generic);
        let succ_else = cfg.add_node(NodeKind::Generic);
        let succ_other = cfg.add_node(NodeKind::Generic);

        cfg.add_entry_edge(node);
        let then_edge = cfg.add_edge(node, succ_then, Some(EdgeRole::Then));
        let else_edge = cfg.add_edge(node, succ_else, Some(EdgeRole::Else));
        let plain_edge = cfg.add_edge(node, succ_other, None);

        CondSetup {
            cfg,
            node,
            then_edge,
            else_edge,
            plain_edge,
            v,
        }
    }

    fn write_node(value: Expr, ty: ScalarType) -> (Cfg, NodeId, EdgeId, VarId, StmtId, ExprId) {
        let mut cfg = Cfg::new();
        let target = cfg.add_variable(Variable::new("t", VarKind::Local, ty));
        let value_id = value.id();
        let stmt = cfg.add_stmt(value);
        let node = cfg.add_node(NodeKind::Write {
            stmt,
            target,
            value: Some(value_id),
        });
        let succ = cfg.add_node(NodeKind::Generic);
        cfg.add_entry_edge(node);
        let out = cfg.add_edge(node, succ, None);
        (cfg, node, out, target, stmt, value_id)
    }

    #[test]
    fn test_cond_splits_by_role() {
        let setup = cond_on_eq();
        let outputs = flow(&setup.cfg, setup.node, &Assumption::top()).unwrap();
        let by_edge: std::collections::HashMap<EdgeId, Assumption> =
            outputs.into_iter().collect();

        // THEN learns v = 5; ELSE learns nothing (negative knowledge); the
        // untagged edge carries the unmodified input
        assert_eq!(by_edge[&setup.then_edge].get(setup.v), Some(Literal::I32(5)));
        assert!(by_edge[&setup.else_edge].is_top());
        assert!(by_edge[&setup.plain_edge].is_top());
    }

    #[test]
    fn test_cond_branches_share_unmodified_base() {
        let setup = cond_on_eq();
        let w = VarId::new(9);
        let base: Assumption = [(w, Literal::Bool(true))].into_iter().collect();

        let outputs = flow(&setup.cfg, setup.node, &base).unwrap();
        for (_, assumption) in outputs {
            assert_eq!(assumption.get(w), Some(Literal::Bool(true)));
        }
    }

    #[test]
    fn test_write_records_evaluated_value() {
        let y = VarId::new(9);
        let value = Expr::binary(BinaryOp::Add, Expr::var(y), Expr::literal(Literal::I32(1)));
        let (cfg, node, out, target, _, _) = write_node(value, ScalarType::Int);

        let input: Assumption = [(y, Literal::I32(41))].into_iter().collect();
        let expected: Assumption = [(y, Literal::I32(41)), (target, Literal::I32(42))]
            .into_iter()
            .collect();

        let outputs = flow(&cfg, node, &input).unwrap();
        assert_eq!(outputs, vec![(out, expected)]);
    }

    #[test]
    fn test_write_of_unknown_clears_prior_fact() {
        let y = VarId::new(9);
        let value = Expr::binary(BinaryOp::Add, Expr::var(y), Expr::literal(Literal::I32(1)));
        let (cfg, node, _, target, _, _) = write_node(value, ScalarType::Int);

        // Prior fact for the target, but the assigned value is unevaluable
        let input: Assumption = [(target, Literal::I32(7))].into_iter().collect();
        let outputs = flow(&cfg, node, &input).unwrap();
        assert!(!outputs[0].1.has(target));
    }

    #[test]
    fn test_write_type_mismatch_clears() {
        // A double constant assigned to an int variable is not recorded
        let value = Expr::literal(Literal::F64(1.5));
        let (cfg, node, _, target, _, _) = write_node(value, ScalarType::Int);

        let input: Assumption = [(target, Literal::I32(7))].into_iter().collect();
        let outputs = flow(&cfg, node, &input).unwrap();
        assert!(!outputs[0].1.has(target));
    }

    #[test]
    fn test_write_of_null_is_recorded_for_any_type() {
        let value = Expr::literal(Literal::Null);
        let (cfg, node, _, target, _, _) = write_node(value, ScalarType::Ref);

        let outputs = flow(&cfg, node, &Assumption::top()).unwrap();
        assert_eq!(outputs[0].1.get(target), Some(Literal::Null));
    }

    #[test]
    fn test_write_without_value_clears() {
        let mut cfg = Cfg::new();
        let target = cfg.add_variable(Variable::new("t", VarKind::Local, ScalarType::Int));
        let stmt = cfg.add_stmt(Expr::var(target));
        let node = cfg.add_node(NodeKind::Write {
            stmt,
            target,
            value: None,
        });
        let succ = cfg.add_node(NodeKind::Generic);
        cfg.add_entry_edge(node);
        cfg.add_edge(node, succ, None);

        let input: Assumption = [(target, Literal::I32(7))].into_iter().collect();
        let outputs = flow(&cfg, node, &input).unwrap();
        assert!(!outputs[0].1.has(target));
    }

    #[test]
    fn test_generic_and_read_pass_through() {
        let mut cfg = Cfg::new();
        let v = cfg.add_variable(Variable::new("v", VarKind::Param, ScalarType::Int));
        let read_expr = Expr::var(v);
        let position = read_expr.id();
        let stmt = cfg.add_stmt(read_expr);

        let read = cfg.add_node(NodeKind::Read {
            stmt,
            position,
            var: v,
        });
        let generic = cfg.add_node(NodeKind::Generic);
        cfg.add_entry_edge(read);
        cfg.add_edge(read, generic, None);
        cfg.add_exit_edge(generic, None);

        let input: Assumption = [(v, Literal::I32(5))].into_iter().collect();
        for node in [read, generic] {
            let outputs = flow(&cfg, node, &input).unwrap();
            assert_eq!(outputs.len(), 1);
            assert_eq!(outputs[0].1, input);
        }
    }

    // A more specific input never yields a less specific output than TOP does.
    #[test]
    fn test_flow_is_monotone() {
        let setup = cond_on_eq();
        let w = VarId::new(9);
        let specific: Assumption = [(w, Literal::I32(1))].into_iter().collect();

        let under_top = flow(&setup.cfg, setup.node, &Assumption::top()).unwrap();
        let under_specific = flow(&setup.cfg, setup.node, &specific).unwrap();

        for ((edge_a, from_top), (edge_b, from_specific)) in
            under_top.iter().zip(under_specific.iter())
        {
            assert_eq!(edge_a, edge_b);
            for (var, literal) in from_top.facts() {
                assert_eq!(from_specific.get(var), Some(literal));
            }
        }
    }
}
