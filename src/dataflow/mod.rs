//! Constant propagation dataflow engine.
//!
//! This module implements an optimistic, lattice-based constant propagation over a
//! control flow graph. It is built from small, separately testable pieces:
//!
//! - **Lattice**: [`JoinSemiLattice`] defines how facts merge; [`Assumption`] is the
//!   domain element, a partial map from variable to known constant with an absorbing
//!   TOP, mutated only through the copy-on-write [`Updater`]
//! - **Evaluator**: [`evaluate`] folds expressions to constants under an assumption
//! - **Deducer**: [`deduce`] derives variable facts from a branch condition with a
//!   known outcome
//! - **Flow function**: [`flow`] is the per-node transfer function
//! - **Transformation function**: [`transform`] finds graph/IR rewrites and packages
//!   them as [`Transformation`] values
//! - **Integrated entry point**: [`process`] offers a node to the transformation
//!   function and falls back to interpretation, the one operation a fixpoint driver
//!   needs besides the seeding rule [`seed_entry`]
//! - **Solver**: [`ConstantPropagation`] drives everything over a whole graph until
//!   no facts change and no rewrite remains
//!
//! # Example
//!
//! ```rust
//! use cfgfold::{
//!     Cfg, ConstantPropagation, Expr, Literal, NodeKind, ScalarType, VarKind, Variable,
//! };
//!
//! // write(v = 5) -> read of v inside `v + 1`
//! let mut cfg = Cfg::new();
//! let v = cfg.add_variable(Variable::new("v", VarKind::Local, ScalarType::Int));
//!
//! let five = Expr::literal(Literal::I32(5));
//! let five_id = five.id();
//! let write_stmt = cfg.add_stmt(five);
//! let write = cfg.add_node(NodeKind::Write { stmt: write_stmt, target: v, value: Some(five_id) });
//!
//! let read = Expr::var(v);
//! let position = read.id();
//! let use_stmt = cfg.add_stmt(Expr::binary(
//!     cfgfold::BinaryOp::Add,
//!     read,
//!     Expr::literal(Literal::I32(1)),
//! ));
//! let read_node = cfg.add_node(NodeKind::Read { stmt: use_stmt, position, var: v });
//!
//! cfg.add_entry_edge(write);
//! cfg.add_edge(write, read_node, None);
//! cfg.add_exit_edge(read_node, None);
//!
//! let stats = ConstantPropagation::new().run(&mut cfg)?;
//! assert_eq!(stats.transformations, 1);
//! assert_eq!(cfg.stmt(use_stmt).unwrap().to_string(), "(5 + 1)");
//! # Ok::<(), cfgfold::Error>(())
//! ```

mod assumption;
mod deducer;
mod engine;
mod evaluator;
mod flow;
mod lattice;
mod solver;
mod transform;

// Re-export primary types
pub use assumption::{Assumption, Updater};
pub use deducer::deduce;
pub use engine::{process, seed_entry, AssumptionMap, Step};
pub use evaluator::evaluate;
pub use flow::flow;
pub use lattice::JoinSemiLattice;
pub use solver::{ConstantPropagation, OptimizationStats};
pub use transform::{transform, Transformation};
