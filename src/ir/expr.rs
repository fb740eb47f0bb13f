//! Closed expression tree representation.
//!
//! The front end's full IR is an open class hierarchy; this pass only ever inspects a
//! handful of shapes. The adapter layer translates those shapes into the closed union in
//! this module, which makes the evaluator and deducer total over a `match` instead of
//! relying on double dispatch, and lets the compiler check that every shape is handled.
//!
//! Every expression node carries a unique [`ExprId`]. Rewrites address nodes by id
//! rather than by reference, which sidesteps aliasing questions entirely: a rewrite
//! either finds its target in the owning statement tree or fails loudly.
//!
//! Shapes the engine does not model (calls, field accesses, allocations, ...) appear as
//! [`ExprKind::Opaque`] nodes. The evaluator never recurses into them; they only
//! contribute their side effect flag.

use std::{
    fmt,
    sync::atomic::{AtomicU32, Ordering},
};

use crate::ir::{Literal, VarId};

static NEXT_EXPR_ID: AtomicU32 = AtomicU32::new(0);

/// Unique identity of an expression node.
///
/// Ids are process-unique and never reused; a freshly minted node (for example the
/// literal spliced in by a fold) can never collide with an existing rewrite target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprId(u32);

impl ExprId {
    fn fresh() -> Self {
        Self(NEXT_EXPR_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Binary operators the engine recognizes.
///
/// The set is deliberately small: arithmetic and comparisons fold to constants, and the
/// short-circuit operators drive branch deduction. Anything else the front end produces
/// is translated to an opaque node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication.
    Mul,
    /// Division.
    Div,
    /// Equality comparison.
    Eq,
    /// Inequality comparison.
    Ne,
    /// Less-than comparison.
    Lt,
    /// Less-or-equal comparison.
    Le,
    /// Greater-than comparison.
    Gt,
    /// Greater-or-equal comparison.
    Ge,
    /// Short-circuit logical and.
    And,
    /// Short-circuit logical or.
    Or,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::And => "&&",
            Self::Or => "||",
        };
        write!(f, "{s}")
    }
}

/// The shape of an expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// A constant scalar value.
    Literal(Literal),

    /// A read of a local or parameter.
    Var(VarId),

    /// A binary operation over two sub-expressions.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
    },

    /// A sequence expression; its value is the value of the last sub-expression.
    Seq(Vec<Expr>),

    /// Any shape the engine does not model.
    ///
    /// The evaluator and deducer stop at opaque nodes. Their children are retained only
    /// so the side effect query can see through them.
    Opaque {
        /// Whether this node itself has an observable side effect (e.g. a call).
        effectful: bool,
        /// Sub-expressions, if any.
        children: Vec<Expr>,
    },
}

/// An expression tree node.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    id: ExprId,
    kind: ExprKind,
}

impl Expr {
    /// Creates a literal expression node.
    #[must_use]
    pub fn literal(value: Literal) -> Self {
        Self {
            id: ExprId::fresh(),
            kind: ExprKind::Literal(value),
        }
    }

    /// Creates a variable reference node.
    #[must_use]
    pub fn var(var: VarId) -> Self {
        Self {
            id: ExprId::fresh(),
            kind: ExprKind::Var(var),
        }
    }

    /// Creates a binary operation node.
    #[must_use]
    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Self {
            id: ExprId::fresh(),
            kind: ExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
        }
    }

    /// Creates a sequence expression node.
    #[must_use]
    pub fn seq(exprs: Vec<Expr>) -> Self {
        Self {
            id: ExprId::fresh(),
            kind: ExprKind::Seq(exprs),
        }
    }

    /// Creates an opaque node.
    #[must_use]
    pub fn opaque(effectful: bool, children: Vec<Expr>) -> Self {
        Self {
            id: ExprId::fresh(),
            kind: ExprKind::Opaque {
                effectful,
                children,
            },
        }
    }

    /// Returns this node's identity.
    #[must_use]
    pub const fn id(&self) -> ExprId {
        self.id
    }

    /// Returns this node's shape.
    #[must_use]
    pub const fn kind(&self) -> &ExprKind {
        &self.kind
    }

    /// Returns `true` if evaluating this expression could have an observable effect.
    ///
    /// Literals and variable reads are pure; the recognized binary operators are pure,
    /// so a binary node is effectful only through its operands. Opaque nodes contribute
    /// their own flag in addition to their children.
    #[must_use]
    pub fn has_side_effects(&self) -> bool {
        match &self.kind {
            ExprKind::Literal(_) | ExprKind::Var(_) => false,
            ExprKind::Binary { lhs, rhs, .. } => lhs.has_side_effects() || rhs.has_side_effects(),
            ExprKind::Seq(exprs) => exprs.iter().any(Expr::has_side_effects),
            ExprKind::Opaque {
                effectful,
                children,
            } => *effectful || children.iter().any(Expr::has_side_effects),
        }
    }

    /// Finds the node with the given id in this tree.
    #[must_use]
    pub fn find(&self, target: ExprId) -> Option<&Expr> {
        if self.id == target {
            return Some(self);
        }
        match &self.kind {
            ExprKind::Literal(_) | ExprKind::Var(_) => None,
            ExprKind::Binary { lhs, rhs, .. } => {
                lhs.find(target).or_else(|| rhs.find(target))
            }
            ExprKind::Seq(exprs) | ExprKind::Opaque { children: exprs, .. } => {
                exprs.iter().find_map(|e| e.find(target))
            }
        }
    }

    /// Replaces the node with the given id by `replacement`, in place.
    ///
    /// Returns `true` if the target was found and replaced. The caller is responsible
    /// for treating `false` as a contract violation; see
    /// [`Error::RewriteTargetMissing`](crate::Error::RewriteTargetMissing).
    pub fn replace(&mut self, target: ExprId, replacement: Expr) -> bool {
        let mut pending = Some(replacement);
        self.replace_pending(target, &mut pending);
        pending.is_none()
    }

    fn replace_pending(&mut self, target: ExprId, pending: &mut Option<Expr>) {
        if pending.is_none() {
            return;
        }
        if self.id == target {
            if let Some(replacement) = pending.take() {
                *self = replacement;
            }
            return;
        }
        match &mut self.kind {
            ExprKind::Literal(_) | ExprKind::Var(_) => {}
            ExprKind::Binary { lhs, rhs, .. } => {
                lhs.replace_pending(target, pending);
                rhs.replace_pending(target, pending);
            }
            ExprKind::Seq(exprs) | ExprKind::Opaque { children: exprs, .. } => {
                for expr in exprs {
                    expr.replace_pending(target, pending);
                }
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Literal(lit) => write!(f, "{lit}"),
            ExprKind::Var(var) => write!(f, "{var}"),
            ExprKind::Binary { op, lhs, rhs } => write!(f, "({lhs} {op} {rhs})"),
            ExprKind::Seq(exprs) => {
                write!(f, "(")?;
                for (i, expr) in exprs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{expr}")?;
                }
                write!(f, ")")
            }
            ExprKind::Opaque { effectful, .. } => {
                if *effectful {
                    write!(f, "<effectful>")
                } else {
                    write!(f, "<opaque>")
                }
            }
        }
    }
}
