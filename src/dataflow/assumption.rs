//! The dataflow fact: a partial map from variable to known constant.
//!
//! An [`Assumption`] records, for one program point, which tracked variables are known
//! to hold which constant values. Per variable there are three logical states:
//!
//! - **absent**: no constant known (bottom for that variable);
//! - **mapped**: the variable provably holds the mapped literal;
//! - the aggregate **empty map**: the TOP element, "no constant facts at all".
//!
//! The empty map is the single canonical TOP representation; joins and updaters
//! normalize to it, so TOP can always be compared structurally.
//!
//! Assumptions are immutable values from the outside. All mutation goes through the
//! copy-on-write [`Updater`], which lets several speculative branches (the THEN and
//! ELSE sides of one conditional) share an unmodified base until they actually
//! diverge.

use std::{collections::HashMap, fmt};

use crate::{
    dataflow::JoinSemiLattice,
    ir::{Literal, VarId},
};

/// A partial map from variable to known constant value.
///
/// Literal comparison throughout is the bit-exact identity of
/// [`Literal`]'s `PartialEq`: joining `{x = +0.0}` with `{x = -0.0}` drops `x`.
///
/// # Examples
///
/// ```rust
/// use cfgfold::{Assumption, JoinSemiLattice, Literal, Updater, VarId};
///
/// let v = VarId::new(0);
/// let mut updater = Updater::new(Assumption::top());
/// updater.set(v, Some(Literal::I32(5)));
/// let facts = updater.unwrap();
///
/// assert_eq!(facts.get(v), Some(Literal::I32(5)));
/// assert!(facts.join(&Assumption::top()).is_top());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Assumption {
    values: HashMap<VarId, Literal>,
}

impl Assumption {
    /// Returns the TOP element: no constant facts available.
    #[must_use]
    pub fn top() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Returns the constant known for a variable, or `None` if no constant is known.
    ///
    /// `None` means "cannot determine", never "the variable is null"; null is a
    /// concrete literal like any other.
    #[must_use]
    pub fn get(&self, var: VarId) -> Option<Literal> {
        self.values.get(&var).copied()
    }

    /// Returns `true` if a constant is known for the variable.
    #[must_use]
    pub fn has(&self, var: VarId) -> bool {
        self.values.contains_key(&var)
    }

    /// Returns the number of variables with a known constant.
    #[must_use]
    pub fn fact_count(&self) -> usize {
        self.values.len()
    }

    /// Returns an iterator over all known facts.
    pub fn facts(&self) -> impl Iterator<Item = (VarId, Literal)> + '_ {
        self.values.iter().map(|(var, lit)| (*var, *lit))
    }
}

impl FromIterator<(VarId, Literal)> for Assumption {
    fn from_iter<T: IntoIterator<Item = (VarId, Literal)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl JoinSemiLattice for Assumption {
    /// Map intersection under bit-exact literal equality.
    ///
    /// A variable survives the join only if both sides map it to the identical
    /// literal. A variable present on both sides with *different* literals is dropped
    /// to absent, not promoted to a per-variable unknown, which this lattice does not
    /// represent. TOP absorbs: if either side carries no facts, neither does the
    /// merge.
    fn join(&self, other: &Self) -> Self {
        if self.is_top() || other.is_top() {
            return Self::top();
        }

        let values: HashMap<VarId, Literal> = self
            .values
            .iter()
            .filter(|(var, lit)| other.values.get(*var) == Some(*lit))
            .map(|(var, lit)| (*var, *lit))
            .collect();

        // An empty intersection is exactly TOP; the representation is already
        // canonical.
        Self { values }
    }

    fn is_top(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for Assumption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_top() {
            return write!(f, "T");
        }
        let mut facts: Vec<(VarId, Literal)> = self.facts().collect();
        facts.sort_by_key(|(var, _)| *var);

        write!(f, "{{")?;
        for (i, (var, lit)) in facts.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{var} = {lit}")?;
        }
        write!(f, "}}")
    }
}

/// Copy-on-write builder over an [`Assumption`].
///
/// The first mutating call clones the wrapped assumption; subsequent calls mutate the
/// clone directly. [`Updater::unwrap`] produces the final immutable assumption and
/// consumes the updater. If nothing was written, the base is returned untouched with
/// no allocation and no copy.
#[derive(Debug)]
pub struct Updater {
    original: Assumption,
    updated: Option<Assumption>,
}

impl Updater {
    /// Wraps an assumption for speculative updates.
    #[must_use]
    pub const fn new(assumption: Assumption) -> Self {
        Self {
            original: assumption,
            updated: None,
        }
    }

    /// Returns `true` if the (possibly updated) assumption has a fact for `var`.
    #[must_use]
    pub fn has_assumption(&self, var: VarId) -> bool {
        self.current().has(var)
    }

    /// Returns the current fact for `var`, if any.
    #[must_use]
    pub fn get(&self, var: VarId) -> Option<Literal> {
        self.current().get(var)
    }

    /// Sets or clears the fact for a variable.
    ///
    /// `Some(literal)` records the constant, overwriting any prior fact; `None`
    /// removes the fact, returning the variable to absent.
    pub fn set(&mut self, var: VarId, value: Option<Literal>) {
        let target = self
            .updated
            .get_or_insert_with(|| self.original.clone());
        match value {
            Some(literal) => {
                target.values.insert(var, literal);
            }
            None => {
                target.values.remove(&var);
            }
        }
    }

    /// Produces the final assumption.
    ///
    /// An updated map that ended up empty *is* TOP; the canonical representation
    /// needs no further normalization.
    #[must_use]
    pub fn unwrap(self) -> Assumption {
        self.updated.unwrap_or(self.original)
    }

    fn current(&self) -> &Assumption {
        self.updated.as_ref().unwrap_or(&self.original)
    }
}
