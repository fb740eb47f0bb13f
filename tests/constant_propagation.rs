//! Constant propagation integration tests.
//!
//! These tests exercise the complete engine through the public API:
//! 1. Build a control flow graph over the closed IR
//! 2. Run the fixpoint solver
//! 3. Verify the rewritten graph and expression trees
//!
//! The scenarios cover constant-condition folding with structural unreachability,
//! read folding in context, branch deduction, join behavior at merge points, the
//! signed-zero substitution exclusion, and idempotence of a completed run.

use cfgfold::{
    BinaryOp, Cfg, ConstantPropagation, EdgeRole, Expr, ExprId, Literal, NodeId, NodeKind,
    ScalarType, StmtId, VarId, VarKind, Variable,
};

/// Adds a `target := value` write node for an already-built value expression.
fn add_write(cfg: &mut Cfg, target: VarId, value: Expr) -> NodeId {
    let value_id = value.id();
    let stmt = cfg.add_stmt(value);
    cfg.add_node(NodeKind::Write {
        stmt,
        target,
        value: Some(value_id),
    })
}

/// Adds a conditional node for an already-built condition expression.
fn add_cond(cfg: &mut Cfg, condition: Expr) -> (NodeId, StmtId) {
    let condition_id = condition.id();
    let stmt = cfg.add_stmt(condition);
    let node = cfg.add_node(NodeKind::Cond {
        stmt,
        condition: condition_id,
    });
    (node, stmt)
}

/// Adds a read node for variable `var` nested as `position` inside `stmt_expr`.
fn add_read(cfg: &mut Cfg, var: VarId, position: ExprId, stmt_expr: Expr) -> (NodeId, StmtId) {
    let stmt = cfg.add_stmt(stmt_expr);
    let node = cfg.add_node(NodeKind::Read {
        stmt,
        position,
        var,
    });
    (node, stmt)
}

#[test]
fn test_constant_condition_scenario() {
    // v := true; if (v) { then } else { else }
    let mut cfg = Cfg::new();
    let v = cfg.add_variable(Variable::new("v", VarKind::Local, ScalarType::Bool));

    let write = add_write(&mut cfg, v, Expr::literal(Literal::Bool(true)));
    let (cond, cond_stmt) = add_cond(&mut cfg, Expr::var(v));
    let then_arm = cfg.add_node(NodeKind::Generic);
    let else_arm = cfg.add_node(NodeKind::Generic);

    cfg.add_entry_edge(write);
    cfg.add_edge(write, cond, None);
    cfg.add_edge(cond, then_arm, Some(EdgeRole::Then));
    cfg.add_edge(cond, else_arm, Some(EdgeRole::Else));
    cfg.add_exit_edge(then_arm, None);
    cfg.add_exit_edge(else_arm, None);

    let stats = ConstantPropagation::new().run(&mut cfg).unwrap();
    assert_eq!(stats.transformations, 1);

    // The conditional became a no-op keeping its in-edge and the THEN edge only
    let node = cfg.node(cond).unwrap();
    assert!(matches!(node.kind(), NodeKind::Nop));
    assert_eq!(node.incoming().len(), 1);
    assert_eq!(node.outgoing().len(), 1);

    // The ELSE arm is structurally unreachable, no dead-code pass needed
    assert_eq!(cfg.node(then_arm).unwrap().incoming().len(), 1);
    assert_eq!(cfg.node(else_arm).unwrap().incoming().len(), 0);

    // The condition expression was pinned to the literal
    assert_eq!(cfg.stmt(cond_stmt).unwrap().to_string(), "true");
}

#[test]
fn test_fold_scenario() {
    // v := 5; use of v inside `v + 1`
    let mut cfg = Cfg::new();
    let v = cfg.add_variable(Variable::new("v", VarKind::Local, ScalarType::Int));

    let write = add_write(&mut cfg, v, Expr::literal(Literal::I32(5)));

    let read = Expr::var(v);
    let position = read.id();
    let context = Expr::binary(BinaryOp::Add, read, Expr::literal(Literal::I32(1)));
    let (read_node, use_stmt) = add_read(&mut cfg, v, position, context);

    cfg.add_entry_edge(write);
    cfg.add_edge(write, read_node, None);
    cfg.add_exit_edge(read_node, None);

    let stats = ConstantPropagation::new().run(&mut cfg).unwrap();
    assert_eq!(stats.transformations, 1);

    // The enclosing expression now reads 5 + 1
    assert_eq!(cfg.stmt(use_stmt).unwrap().to_string(), "(5 + 1)");

    // The read became a no-op with identical edge arity
    let node = cfg.node(read_node).unwrap();
    assert!(matches!(node.kind(), NodeKind::Nop));
    assert_eq!(node.incoming().len(), 1);
    assert_eq!(node.outgoing().len(), 1);
}

#[test]
fn test_deduction_scenario() {
    // if (x == 5 && y != null) { use x; use y; }
    // Taking the THEN edge proves x = 5 but nothing about y.
    let mut cfg = Cfg::new();
    let x = cfg.add_variable(Variable::new("x", VarKind::Param, ScalarType::Int));
    let y = cfg.add_variable(Variable::new("y", VarKind::Param, ScalarType::Ref));

    let condition = Expr::binary(
        BinaryOp::And,
        Expr::binary(BinaryOp::Eq, Expr::var(x), Expr::literal(Literal::I32(5))),
        Expr::binary(BinaryOp::Ne, Expr::var(y), Expr::literal(Literal::Null)),
    );
    let (cond, _) = add_cond(&mut cfg, condition);

    let x_read = Expr::var(x);
    let x_position = x_read.id();
    let (x_use, x_stmt) = add_read(&mut cfg, x, x_position, x_read);

    let y_read = Expr::var(y);
    let y_position = y_read.id();
    let (y_use, y_stmt) = add_read(&mut cfg, y, y_position, y_read);

    let else_arm = cfg.add_node(NodeKind::Generic);

    cfg.add_entry_edge(cond);
    cfg.add_edge(cond, x_use, Some(EdgeRole::Then));
    cfg.add_edge(x_use, y_use, None);
    cfg.add_edge(cond, else_arm, Some(EdgeRole::Else));
    cfg.add_exit_edge(y_use, None);
    cfg.add_exit_edge(else_arm, None);

    let stats = ConstantPropagation::new().run(&mut cfg).unwrap();

    // Only the read of x folds; y has no deduced fact, and the condition itself
    // is undecidable so the branch survives
    assert_eq!(stats.transformations, 1);
    assert_eq!(cfg.stmt(x_stmt).unwrap().to_string(), "5");
    assert_eq!(cfg.stmt(y_stmt).unwrap().to_string(), "v1");
    assert!(matches!(cfg.node(cond).unwrap().kind(), NodeKind::Cond { .. }));
    assert!(matches!(cfg.node(y_use).unwrap().kind(), NodeKind::Read { .. }));
}

/// Builds a diamond whose arms assign `then_value` and `else_value` to the same
/// variable, merging into a read of that variable.
fn diamond_with_writes(then_value: i32, else_value: i32) -> (Cfg, NodeId, StmtId) {
    let mut cfg = Cfg::new();
    let c = cfg.add_variable(Variable::new("c", VarKind::Param, ScalarType::Bool));
    let x = cfg.add_variable(Variable::new("x", VarKind::Local, ScalarType::Int));

    let (cond, _) = add_cond(&mut cfg, Expr::var(c));
    let write_then = add_write(&mut cfg, x, Expr::literal(Literal::I32(then_value)));
    let write_else = add_write(&mut cfg, x, Expr::literal(Literal::I32(else_value)));

    let read = Expr::var(x);
    let position = read.id();
    let (merge_read, read_stmt) = add_read(&mut cfg, x, position, read);

    cfg.add_entry_edge(cond);
    cfg.add_edge(cond, write_then, Some(EdgeRole::Then));
    cfg.add_edge(cond, write_else, Some(EdgeRole::Else));
    cfg.add_edge(write_then, merge_read, None);
    cfg.add_edge(write_else, merge_read, None);
    cfg.add_exit_edge(merge_read, None);

    (cfg, merge_read, read_stmt)
}

#[test]
fn test_merge_of_equal_constants_folds() {
    let (mut cfg, merge_read, read_stmt) = diamond_with_writes(1, 1);

    let stats = ConstantPropagation::new().run(&mut cfg).unwrap();
    assert_eq!(stats.transformations, 1);
    assert_eq!(cfg.stmt(read_stmt).unwrap().to_string(), "1");
    assert!(matches!(cfg.node(merge_read).unwrap().kind(), NodeKind::Nop));
}

#[test]
fn test_merge_of_conflicting_constants_does_not_fold() {
    let (mut cfg, merge_read, read_stmt) = diamond_with_writes(1, 2);

    let stats = ConstantPropagation::new().run(&mut cfg).unwrap();
    assert_eq!(stats.transformations, 0);
    assert_eq!(cfg.stmt(read_stmt).unwrap().to_string(), "v1");
    assert!(matches!(cfg.node(merge_read).unwrap().kind(), NodeKind::Read { .. }));
}

#[test]
fn test_folded_branch_unlocks_merge_facts() {
    // v := true;
    // if (v) { x := 1 } else { x := 99 }
    // use x
    //
    // Once the branch folds, the ELSE write is unreachable and the merge sees
    // only x = 1, so the read folds too.
    let mut cfg = Cfg::new();
    let v = cfg.add_variable(Variable::new("v", VarKind::Local, ScalarType::Bool));
    let x = cfg.add_variable(Variable::new("x", VarKind::Local, ScalarType::Int));

    let write_v = add_write(&mut cfg, v, Expr::literal(Literal::Bool(true)));
    let (cond, _) = add_cond(&mut cfg, Expr::var(v));
    let write_then = add_write(&mut cfg, x, Expr::literal(Literal::I32(1)));
    let write_else = add_write(&mut cfg, x, Expr::literal(Literal::I32(99)));

    let read = Expr::var(x);
    let position = read.id();
    let (merge_read, read_stmt) = add_read(&mut cfg, x, position, read);

    cfg.add_entry_edge(write_v);
    cfg.add_edge(write_v, cond, None);
    cfg.add_edge(cond, write_then, Some(EdgeRole::Then));
    cfg.add_edge(cond, write_else, Some(EdgeRole::Else));
    cfg.add_edge(write_then, merge_read, None);
    cfg.add_edge(write_else, merge_read, None);
    cfg.add_exit_edge(merge_read, None);

    let stats = ConstantPropagation::new().run(&mut cfg).unwrap();

    // Branch fold plus read fold
    assert_eq!(stats.transformations, 2);
    assert_eq!(cfg.stmt(read_stmt).unwrap().to_string(), "1");
    assert!(matches!(cfg.node(cond).unwrap().kind(), NodeKind::Nop));
    assert_eq!(cfg.node(write_else).unwrap().incoming().len(), 0);
}

#[test]
fn test_signed_zero_is_never_substituted() {
    // if (x == 0.0) { use x }  -- the zero literal must not replace x
    let mut cfg = Cfg::new();
    let x = cfg.add_variable(Variable::new("x", VarKind::Param, ScalarType::Double));

    let condition = Expr::binary(
        BinaryOp::Eq,
        Expr::var(x),
        Expr::literal(Literal::F64(0.0)),
    );
    let (cond, _) = add_cond(&mut cfg, condition);

    let read = Expr::var(x);
    let position = read.id();
    let (x_use, x_stmt) = add_read(&mut cfg, x, position, read);

    cfg.add_entry_edge(cond);
    cfg.add_edge(cond, x_use, Some(EdgeRole::Then));
    cfg.add_exit_edge(cond, Some(EdgeRole::Else));
    cfg.add_exit_edge(x_use, None);

    let stats = ConstantPropagation::new().run(&mut cfg).unwrap();
    assert_eq!(stats.transformations, 0);
    assert_eq!(cfg.stmt(x_stmt).unwrap().to_string(), "v0");
}

#[test]
fn test_nonzero_double_is_substituted() {
    // Same shape with a nonzero literal: the fold is allowed
    let mut cfg = Cfg::new();
    let x = cfg.add_variable(Variable::new("x", VarKind::Param, ScalarType::Double));

    let condition = Expr::binary(
        BinaryOp::Eq,
        Expr::var(x),
        Expr::literal(Literal::F64(1.5)),
    );
    let (cond, _) = add_cond(&mut cfg, condition);

    let read = Expr::var(x);
    let position = read.id();
    let (x_use, x_stmt) = add_read(&mut cfg, x, position, read);

    cfg.add_entry_edge(cond);
    cfg.add_edge(cond, x_use, Some(EdgeRole::Then));
    cfg.add_exit_edge(cond, Some(EdgeRole::Else));
    cfg.add_exit_edge(x_use, None);

    let stats = ConstantPropagation::new().run(&mut cfg).unwrap();
    assert_eq!(stats.transformations, 1);
    assert_eq!(cfg.stmt(x_stmt).unwrap().to_string(), "1.5");
}

#[test]
fn test_rerun_on_simplified_graph_is_idempotent() {
    let mut cfg = Cfg::new();
    let v = cfg.add_variable(Variable::new("v", VarKind::Local, ScalarType::Bool));
    let x = cfg.add_variable(Variable::new("x", VarKind::Local, ScalarType::Int));

    let write_v = add_write(&mut cfg, v, Expr::literal(Literal::Bool(true)));
    let (cond, _) = add_cond(&mut cfg, Expr::var(v));
    let write_then = add_write(&mut cfg, x, Expr::literal(Literal::I32(1)));
    let write_else = add_write(&mut cfg, x, Expr::literal(Literal::I32(99)));

    let read = Expr::var(x);
    let position = read.id();
    let (merge_read, _) = add_read(&mut cfg, x, position, read);

    cfg.add_entry_edge(write_v);
    cfg.add_edge(write_v, cond, None);
    cfg.add_edge(cond, write_then, Some(EdgeRole::Then));
    cfg.add_edge(cond, write_else, Some(EdgeRole::Else));
    cfg.add_edge(write_then, merge_read, None);
    cfg.add_edge(write_else, merge_read, None);
    cfg.add_exit_edge(merge_read, None);

    let first = ConstantPropagation::new().run(&mut cfg).unwrap();
    assert!(first.transformations > 0);

    let second = ConstantPropagation::new().run(&mut cfg).unwrap();
    assert_eq!(second.transformations, 0);
    assert_eq!(second.passes, 1);
}
