//! Constant scalar values.
//!
//! This module provides the [`Literal`] type, the currency of the constant propagation
//! engine: assumptions map variables to literals, the evaluator folds expressions into
//! literals, and transformations splice literals back into the expression tree.
//!
//! # Two Notions of Equality
//!
//! Floating point literals carry **two** distinct equality relations, and conflating them
//! is the classic way to make this pass unsound:
//!
//! - **Identity** ([`PartialEq`]): raw bit comparison. `+0.0 != -0.0`, and two NaN
//!   literals are equal exactly when their bit patterns are. This is the relation used
//!   when joining assumptions and when deciding whether one literal can be substituted
//!   for another.
//! - **Numeric equality** ([`Literal::value_eq`]): IEEE 754 comparison as the evaluated
//!   program would perform it. `+0.0 == -0.0` is true, `NaN == NaN` is false. This is
//!   the relation the evaluator uses to fold `==`/`!=` operators.
//!
//! Integer arithmetic is two's-complement with wraparound, matching the semantics of the
//! evaluated program rather than the host.

use std::fmt;

use crate::ir::ScalarType;

/// A constant scalar value.
///
/// Literals are immutable `Copy` values. The engine never aliases a literal between the
/// expression tree and an assumption: folding clones the value into a fresh expression
/// node.
#[derive(Debug, Clone, Copy)]
pub enum Literal {
    /// Boolean constant.
    Bool(bool),

    /// 32-bit signed integer.
    I32(i32),

    /// 32-bit floating point.
    F32(f32),

    /// 64-bit floating point.
    F64(f64),

    /// Null reference.
    Null,
}

impl Literal {
    /// Returns `true` if this is the null literal.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` if this is a boolean literal.
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, Self::Bool(_))
    }

    /// Returns the literal as a bool if it is one.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Creates a boolean literal from a bool value.
    #[must_use]
    pub const fn from_bool(value: bool) -> Self {
        Self::Bool(value)
    }

    /// Returns the scalar type of this literal, or `None` for null.
    ///
    /// Null has no type of its own; it is assignable to any variable, which the write
    /// node type check in the flow function accounts for separately.
    #[must_use]
    pub const fn scalar_type(&self) -> Option<ScalarType> {
        match self {
            Self::Bool(_) => Some(ScalarType::Bool),
            Self::I32(_) => Some(ScalarType::Int),
            Self::F32(_) => Some(ScalarType::Float),
            Self::F64(_) => Some(ScalarType::Double),
            Self::Null => None,
        }
    }

    /// Returns `true` if this is a floating point zero of either sign.
    ///
    /// Signed zeros are numerically equal but not bit-identical, so they are excluded
    /// from deduction-driven substitution: proving `x == 0.0` does not pin down which
    /// zero `x` holds.
    #[must_use]
    pub fn is_zero_float(&self) -> bool {
        match self {
            Self::F32(v) => *v == 0.0,
            Self::F64(v) => *v == 0.0,
            _ => false,
        }
    }

    /// Attempts to add two literals.
    ///
    /// Defined for two 32-bit integers with wraparound; everything else is unknown.
    #[must_use]
    pub const fn add(&self, other: &Self) -> Option<Self> {
        match (self, other) {
            (Self::I32(a), Self::I32(b)) => Some(Self::I32(a.wrapping_add(*b))),
            _ => None,
        }
    }

    /// Attempts to subtract two literals.
    #[must_use]
    pub const fn sub(&self, other: &Self) -> Option<Self> {
        match (self, other) {
            (Self::I32(a), Self::I32(b)) => Some(Self::I32(a.wrapping_sub(*b))),
            _ => None,
        }
    }

    /// Attempts to multiply two literals.
    #[must_use]
    pub const fn mul(&self, other: &Self) -> Option<Self> {
        match (self, other) {
            (Self::I32(a), Self::I32(b)) => Some(Self::I32(a.wrapping_mul(*b))),
            _ => None,
        }
    }

    /// Attempts to divide two literals.
    ///
    /// Division by a literal zero is unknown, not an error: the evaluated program would
    /// trap or produce a runtime exception there, and the engine must not claim a value
    /// for it. `i32::MIN / -1` wraps.
    #[must_use]
    pub const fn div(&self, other: &Self) -> Option<Self> {
        match (self, other) {
            (Self::I32(_), Self::I32(0)) => None,
            (Self::I32(a), Self::I32(b)) => Some(Self::I32(a.wrapping_div(*b))),
            _ => None,
        }
    }

    /// Attempts to compare two literals for numeric equality.
    ///
    /// This is IEEE semantics for floats (`+0.0 == -0.0` is true, NaN is equal to
    /// nothing), plain equality for integers and booleans. When either side is null the
    /// result is "both null". Mismatched types are unknown.
    #[must_use]
    #[allow(clippy::float_cmp)] // IEEE comparison is the point here
    pub fn value_eq(&self, other: &Self) -> Option<bool> {
        match (self, other) {
            (Self::Null, Self::Null) => Some(true),
            (Self::Null, _) | (_, Self::Null) => Some(false),
            (Self::Bool(a), Self::Bool(b)) => Some(a == b),
            (Self::I32(a), Self::I32(b)) => Some(a == b),
            (Self::F32(a), Self::F32(b)) => Some(a == b),
            (Self::F64(a), Self::F64(b)) => Some(a == b),
            _ => None,
        }
    }

    /// Attempts to compare two literals for less-than.
    ///
    /// Ordering comparisons fold only for two 32-bit integers.
    #[must_use]
    pub const fn lt(&self, other: &Self) -> Option<bool> {
        match (self, other) {
            (Self::I32(a), Self::I32(b)) => Some(*a < *b),
            _ => None,
        }
    }

    /// Attempts to compare two literals for less-or-equal.
    #[must_use]
    pub const fn le(&self, other: &Self) -> Option<bool> {
        match (self, other) {
            (Self::I32(a), Self::I32(b)) => Some(*a <= *b),
            _ => None,
        }
    }

    /// Attempts to compare two literals for greater-than.
    #[must_use]
    pub const fn gt(&self, other: &Self) -> Option<bool> {
        match (self, other) {
            (Self::I32(a), Self::I32(b)) => Some(*a > *b),
            _ => None,
        }
    }

    /// Attempts to compare two literals for greater-or-equal.
    #[must_use]
    pub const fn ge(&self, other: &Self) -> Option<bool> {
        match (self, other) {
            (Self::I32(a), Self::I32(b)) => Some(*a >= *b),
            _ => None,
        }
    }
}

/// Bit-exact identity.
///
/// Floats compare by raw bit pattern, so `+0.0 != -0.0` and NaN payloads are
/// significant. The assumption lattice relies on this: joining `{x = +0.0}` with
/// `{x = -0.0}` must drop `x` rather than keep an arbitrary zero.
impl PartialEq for Literal {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::I32(a), Self::I32(b)) => a == b,
            (Self::F32(a), Self::F32(b)) => a.to_bits() == b.to_bits(),
            (Self::F64(a), Self::F64(b)) => a.to_bits() == b.to_bits(),
            (Self::Null, Self::Null) => true,
            _ => false,
        }
    }
}

impl Eq for Literal {}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::F32(v) => write!(f, "{v}f"),
            Self::F64(v) => write!(f, "{v}"),
            Self::Null => write!(f, "null"),
        }
    }
}
