//! Lattice trait for the constant propagation domain.
//!
//! A lattice defines how abstract values combine at control flow join points. This
//! module provides the trait the analysis domain implements and the solver consumes.
//!
//! # TOP Means "No Facts"
//!
//! The convention here inverts the common "top = no information is harmless" reading:
//! TOP is the element carrying **no constant facts**, and it *absorbs* joins rather
//! than acting as their identity. At a merge point, if either incoming path contributes
//! no constant facts, the merged point cannot claim any constant fact either, except
//! for variables explicitly proven equal along both paths, which is exactly what the
//! intersection join of two non-TOP elements computes.
//!
//! The join identity role is instead played by *absence*: an edge whose assumption has
//! not materialized yet (an unreached path) contributes nothing to a merge, which is
//! what makes optimistic analysis of partially-discovered graphs work. The solver
//! models absence with `Option`, not with a lattice element.

use std::fmt::Debug;

/// A join semi-lattice with an absorbing TOP element.
///
/// The join operation combines information from two control flow paths that merge.
/// It must satisfy:
///
/// - **Idempotent**: `x.join(x) = x`
/// - **Commutative**: `x.join(y) = y.join(x)`
/// - **Associative**: `x.join(y.join(z)) = (x.join(y)).join(z)`
/// - **Absorption**: `x.join(top) = top`
///
/// # Examples
///
/// ```rust
/// use cfgfold::{Assumption, JoinSemiLattice};
///
/// let top = Assumption::top();
/// assert!(top.join(&top).is_top());
/// ```
pub trait JoinSemiLattice: Clone + Debug + PartialEq {
    /// Computes the join of two lattice elements.
    ///
    /// The join keeps only the facts that hold on both paths.
    #[must_use]
    fn join(&self, other: &Self) -> Self;

    /// Returns `true` if this is the TOP element.
    ///
    /// TOP represents "no constant facts available". It absorbs joins: once one path
    /// contributes TOP, the merge is TOP.
    fn is_top(&self) -> bool;
}
