//! Expression evaluation against an assumption set.
//!
//! The evaluator folds an expression to a constant when the assumption in force makes
//! that possible, and answers "unknown" otherwise. Unknown (`None`) is bottom
//! information; it is never conflated with the null literal, which is a concrete
//! value.
//!
//! Evaluation recurses only into the shapes it fully understands: literals, variable
//! reads, the recognized binary operators, and sequence expressions (whose value is
//! their last sub-expression). Anything else (calls, allocations, every opaque shape)
//! is unknown without recursion. That keeps the evaluator's cost proportional to the
//! foldable part of the tree and avoids reasoning about expressions whose
//! sub-evaluation order or effects the engine does not model. Pure arithmetic nested
//! inside an opaque wrapper is therefore *not* folded; this is deliberate.

use crate::{
    dataflow::Assumption,
    ir::{BinaryOp, Expr, ExprKind, Literal},
};

/// Evaluates an expression under an assumption.
///
/// Returns the constant the expression provably evaluates to, or `None` when the value
/// cannot be determined. All "expected failure" conditions (an unbound variable, a
/// division by literal zero, mismatched operand types, an unrecognized shape) are
/// `None`, never errors.
///
/// # Examples
///
/// ```rust
/// use cfgfold::{evaluate, Assumption, BinaryOp, Expr, Literal};
///
/// let seven_thirds = Expr::binary(
///     BinaryOp::Div,
///     Expr::literal(Literal::I32(7)),
///     Expr::literal(Literal::I32(3)),
/// );
/// assert_eq!(evaluate(&seven_thirds, &Assumption::top()), Some(Literal::I32(2)));
/// ```
#[must_use]
pub fn evaluate(expr: &Expr, assumption: &Assumption) -> Option<Literal> {
    match expr.kind() {
        ExprKind::Literal(literal) => Some(*literal),
        ExprKind::Var(var) => assumption.get(*var),
        ExprKind::Binary { op, lhs, rhs } => {
            let lhs = evaluate(lhs, assumption)?;
            let rhs = evaluate(rhs, assumption)?;
            evaluate_binary(*op, &lhs, &rhs)
        }
        ExprKind::Seq(exprs) => evaluate(exprs.last()?, assumption),
        ExprKind::Opaque { .. } => None,
    }
}

/// Folds a binary operator over two constant operands.
///
/// Null short-circuits everything: `==` on a null operand asks "are both null",
/// `!=` negates that, and no other operator is defined on null. After that, integer
/// arithmetic and ordering fold, equality folds for matching scalar types (IEEE
/// semantics for floats), and every other operator/type pairing is unknown.
fn evaluate_binary(op: BinaryOp, lhs: &Literal, rhs: &Literal) -> Option<Literal> {
    if lhs.is_null() || rhs.is_null() {
        let both_null = lhs.is_null() && rhs.is_null();
        return match op {
            BinaryOp::Eq => Some(Literal::from_bool(both_null)),
            BinaryOp::Ne => Some(Literal::from_bool(!both_null)),
            _ => None,
        };
    }

    match op {
        BinaryOp::Add => lhs.add(rhs),
        BinaryOp::Sub => lhs.sub(rhs),
        BinaryOp::Mul => lhs.mul(rhs),
        BinaryOp::Div => lhs.div(rhs),
        BinaryOp::Eq => lhs.value_eq(rhs).map(Literal::from_bool),
        BinaryOp::Ne => lhs.value_eq(rhs).map(|eq| Literal::from_bool(!eq)),
        BinaryOp::Lt => lhs.lt(rhs).map(Literal::from_bool),
        BinaryOp::Le => lhs.le(rhs).map(Literal::from_bool),
        BinaryOp::Gt => lhs.gt(rhs).map(Literal::from_bool),
        BinaryOp::Ge => lhs.ge(rhs).map(Literal::from_bool),
        // Short-circuit operators are branch structure, not foldable arithmetic;
        // the deducer is the component that understands them.
        BinaryOp::And | BinaryOp::Or => None,
    }
}
