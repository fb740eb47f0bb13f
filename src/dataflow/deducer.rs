//! Deriving variable facts from a condition with a known outcome.
//!
//! When control takes a branch, the branch's condition is known to have evaluated to a
//! specific boolean. The deducer pushes that single fact down the condition's
//! structure, recording per-variable constants implied by it: the THEN edge of
//! `if (x == 5 && ok)` knows both `x = 5` and `ok = true`.
//!
//! Deduction never weakens existing knowledge: a variable that already has a fact in
//! the updater keeps it. Facts arriving from the incoming assumption are at least as
//! strong as anything re-derivable from the branch condition.
//!
//! # Which Shapes Deduce
//!
//! - `a == b` known **true**, and `a != b` known **false**: if either side is a
//!   substitution-eligible literal, the other side is known to equal it; record it if
//!   it is a variable reference, and recurse into it regardless (it may itself be a
//!   comparison or conjunction).
//! - `a == b` known **false**, and `a != b` known **true**: nothing. Knowing two
//!   values differ pins neither of them.
//! - `a && b` known **true**: both operands are true.
//! - `a || b` known **false**: both operands are false.
//! - A sequence: only its last sub-expression has the sequence's value.
//! - A bare variable reference: the variable holds the known value.
//! - Anything else: stop.
//!
//! # Signed Zero Exclusion
//!
//! A `±0.0` float or double literal is *not* substitution-eligible. Numeric equality
//! says `+0.0 == -0.0`, so `x == 0.0` holding does not tell us which zero `x`
//! contains; substituting the literal's zero for `x` could flip the sign of `1.0 / x`.

use crate::{
    dataflow::Updater,
    ir::{BinaryOp, Expr, ExprKind, Literal},
};

/// Pushes the consequences of `expr` evaluating to `known` into `updater`.
///
/// # Examples
///
/// ```rust
/// use cfgfold::{deduce, Assumption, BinaryOp, Expr, Literal, Updater, VarId};
///
/// let x = VarId::new(0);
/// let cond = Expr::binary(BinaryOp::Eq, Expr::var(x), Expr::literal(Literal::I32(5)));
///
/// let mut updater = Updater::new(Assumption::top());
/// deduce(&cond, &Literal::Bool(true), &mut updater);
/// assert_eq!(updater.unwrap().get(x), Some(Literal::I32(5)));
/// ```
pub fn deduce(expr: &Expr, known: &Literal, updater: &mut Updater) {
    match expr.kind() {
        ExprKind::Binary { op, lhs, rhs } => deduce_binary(*op, lhs, rhs, known, updater),
        ExprKind::Seq(exprs) => {
            if let Some(last) = exprs.last() {
                deduce(last, known, updater);
            }
        }
        ExprKind::Var(var) => {
            if !updater.has_assumption(*var) {
                updater.set(*var, Some(*known));
            }
        }
        ExprKind::Literal(_) | ExprKind::Opaque { .. } => {}
    }
}

fn deduce_binary(
    op: BinaryOp,
    lhs: &Expr,
    rhs: &Expr,
    known: &Literal,
    updater: &mut Updater,
) {
    match (op, known.as_bool()) {
        (BinaryOp::Eq, Some(true)) | (BinaryOp::Ne, Some(false)) => {
            deduce_equality(lhs, rhs, updater);
        }
        (BinaryOp::And, Some(true)) => {
            deduce(lhs, &Literal::Bool(true), updater);
            deduce(rhs, &Literal::Bool(true), updater);
        }
        (BinaryOp::Or, Some(false)) => {
            deduce(lhs, &Literal::Bool(false), updater);
            deduce(rhs, &Literal::Bool(false), updater);
        }
        _ => {}
    }
}

/// Handles `a == b` proven to hold, with the literal on either side.
fn deduce_equality(lhs: &Expr, rhs: &Expr, updater: &mut Updater) {
    if let ExprKind::Literal(literal) = rhs.kind() {
        if eligible_for_substitution(literal) {
            deduce(lhs, literal, updater);
        }
    } else if let ExprKind::Literal(literal) = lhs.kind() {
        if eligible_for_substitution(literal) {
            deduce(rhs, literal, updater);
        }
    }
}

fn eligible_for_substitution(literal: &Literal) -> bool {
    !literal.is_zero_float()
}
