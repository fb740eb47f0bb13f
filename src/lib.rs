// Copyright 2025 The cfgfold Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]

//! # cfgfold
//!
//! A lattice-based constant propagation and branch folding engine for compiler
//! control flow graphs.
//!
//! `cfgfold` implements the hardest piece of a classic optimizing middle end: an
//! optimistic, transform-or-interpret dataflow analysis with an embedded expression
//! evaluator and CFG-rewriting transformations. Given a control flow graph over a
//! small closed IR, it discovers which locals and parameters provably hold constants
//! at each program point, folds reads of those variables into literals, and resolves
//! statically-decidable branches, structurally disconnecting the arm that can never
//! run.
//!
//! ## Features
//!
//! - **Optimistic propagation** - unreached paths contribute nothing to merges, so
//!   facts survive joins that a pessimistic analysis would destroy
//! - **Branch deduction** - taking the THEN edge of `if (x == 5 && ok)` teaches the
//!   analysis both `x = 5` and `ok = true`
//! - **Bit-exact float discipline** - `+0.0`, `-0.0` and NaN payloads are tracked by
//!   bit pattern, keeping signed-zero substitution unsound-free
//! - **Transform-or-interpret driver** - each node is offered a rewrite first and
//!   interpreted only if none applies, so a node is never rewritten and reinterpreted
//!   in the same visit
//! - **Loud contract violations** - a rewrite that cannot find its target is an
//!   error, never a silent no-op
//!
//! ## Quick Start
//!
//! Add `cfgfold` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! cfgfold = "0.1"
//! ```
//!
//! Build a graph, run the solver, inspect the rewritten IR:
//!
//! ```rust
//! use cfgfold::{
//!     Cfg, ConstantPropagation, EdgeRole, Expr, Literal, NodeKind, ScalarType, VarKind,
//!     Variable,
//! };
//!
//! // if (v) { ... } else { ... }   with v known to be true
//! let mut cfg = Cfg::new();
//! let v = cfg.add_variable(Variable::new("v", VarKind::Local, ScalarType::Bool));
//!
//! let init = Expr::literal(Literal::Bool(true));
//! let init_id = init.id();
//! let init_stmt = cfg.add_stmt(init);
//! let write = cfg.add_node(NodeKind::Write { stmt: init_stmt, target: v, value: Some(init_id) });
//!
//! let cond = Expr::var(v);
//! let cond_id = cond.id();
//! let cond_stmt = cfg.add_stmt(cond);
//! let branch = cfg.add_node(NodeKind::Cond { stmt: cond_stmt, condition: cond_id });
//!
//! cfg.add_entry_edge(write);
//! cfg.add_edge(write, branch, None);
//! cfg.add_exit_edge(branch, Some(EdgeRole::Then));
//! cfg.add_exit_edge(branch, Some(EdgeRole::Else));
//!
//! let stats = ConstantPropagation::new().run(&mut cfg)?;
//! assert_eq!(stats.transformations, 1);
//!
//! // The conditional is now a no-op whose ELSE arm is disconnected, and its
//! // condition expression was pinned to the literal.
//! assert!(matches!(cfg.node(branch).unwrap().kind(), NodeKind::Nop));
//! assert_eq!(cfg.node(branch).unwrap().outgoing().len(), 1);
//! assert_eq!(cfg.stmt(cond_stmt).unwrap().to_string(), "true");
//! # Ok::<(), cfgfold::Error>(())
//! ```
//!
//! ## Architecture
//!
//! The engine is layered leaf-first:
//!
//! - [`ir`] - the closed adapter-layer IR: [`Literal`], the [`Expr`] tree, and the
//!   variable table entries assumptions are keyed on
//! - [`cfg`] - the control flow graph, its node kinds, role-tagged edges, and the
//!   single mutation primitive rewrites need
//! - [`dataflow`] - the analysis itself: the [`Assumption`] lattice, [`evaluate`],
//!   [`deduce`], the [`flow`] and [`transform`] functions, the integrated [`process`]
//!   entry point, and the [`ConstantPropagation`] fixpoint solver
//!
//! The engine is single-threaded and performs no I/O; all analysis state is created
//! per run and discarded with it.

#[macro_use]
pub(crate) mod error;

pub mod cfg;
pub mod dataflow;
pub mod ir;

/// A type alias for [`std::result::Result<T, Error>`] where the error type is always
/// [`Error`]. This is used consistently throughout the crate for all fallible
/// operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `cfgfold` Error type
///
/// The main error type for all operations in this crate. Every variant is a
/// driver/engine contract violation; expected "cannot determine" outcomes are ordinary
/// return values, not errors.
pub use error::Error;

pub use cfg::{Cfg, CfgEdge, CfgNode, EdgeId, EdgeRole, NodeId, NodeKind, StmtId};
pub use dataflow::{
    deduce, evaluate, flow, process, seed_entry, transform, Assumption, AssumptionMap,
    ConstantPropagation, JoinSemiLattice, OptimizationStats, Step, Transformation, Updater,
};
pub use ir::{
    BinaryOp, Expr, ExprId, ExprKind, Literal, ScalarType, VarId, VarKind, Variable,
};
