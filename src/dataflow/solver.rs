//! Worklist-based fixpoint driver.
//!
//! This module drives the per-node engine over a whole graph until nothing changes.
//! Each outer pass has two phases:
//!
//! 1. **Propagate**: a deduplicated worklist iterates the flow function until the
//!    per-edge assumptions reach a fixpoint. Nodes whose in-edges have not
//!    materialized are skipped; they are revisited if a predecessor later reaches
//!    them.
//! 2. **Rewrite**: with converged assumptions in hand, every node is offered to the
//!    integrated entry point. The first transformation produced is applied to the
//!    graph and the pass restarts from scratch: a rewrite invalidates the
//!    assumptions computed for the old shape, and restarting is both simple and
//!    cheap since each node can transform at most once.
//!
//! The split matters for soundness: mid-propagation assumptions are optimistic
//! (unvisited loop back edges contribute nothing yet), so acting on them could fold a
//! branch that a later iteration would have un-folded. Transformations only ever see
//! converged facts.
//!
//! The run terminates because every applied transformation replaces one foldable node
//! with a no-op, and propagation itself converges on the finite lattice.

use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::{
    cfg::{Cfg, NodeId},
    dataflow::{flow, process, seed_entry, AssumptionMap, Step, Transformation},
    Result,
};

/// Statistics reported by a completed optimization run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptimizationStats {
    /// Number of solve-then-rewrite passes, including the final pass that found
    /// nothing to rewrite.
    pub passes: usize,
    /// Total node visits across all propagation phases.
    pub visits: usize,
    /// Number of transformations applied to the graph.
    pub transformations: usize,
}

/// Constant propagation over a whole control flow graph.
///
/// Drives the flow, deduction and transformation machinery to a fixpoint, rewriting
/// the graph in place. All state is per-run and discarded afterwards.
///
/// # Examples
///
/// ```rust
/// use cfgfold::{Cfg, ConstantPropagation};
///
/// let mut cfg = Cfg::new();
/// // ... build the graph ...
/// let stats = ConstantPropagation::new().run(&mut cfg)?;
/// println!("applied {} rewrites", stats.transformations);
/// # Ok::<(), cfgfold::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct ConstantPropagation {
    /// Per-edge assumptions of the current pass.
    assumptions: AssumptionMap,
    /// Worklist of nodes to (re)interpret.
    worklist: VecDeque<NodeId>,
    /// Whether each node is currently in the worklist (for deduplication).
    in_worklist: Vec<bool>,
    /// Total node visits, accumulated across passes.
    visits: usize,
}

impl ConstantPropagation {
    /// Creates a new constant propagation run.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the analysis to a fixpoint, rewriting `cfg` in place.
    ///
    /// Re-running on the resulting graph applies zero further transformations.
    ///
    /// # Errors
    ///
    /// Propagates graph contract violations; see [`crate::Error`]. The graph may have
    /// been partially rewritten when an error is returned.
    pub fn run(mut self, cfg: &mut Cfg) -> Result<OptimizationStats> {
        let mut stats = OptimizationStats::default();

        loop {
            stats.passes += 1;
            self.propagate(cfg)?;

            match self.rewrite(cfg)? {
                Some(transformation) => {
                    debug!(
                        "pass {}: rewriting {} ({})",
                        stats.passes,
                        transformation.node(),
                        cfg.node_ref(transformation.node())?.kind().name()
                    );
                    transformation.apply(cfg)?;
                    stats.transformations += 1;
                }
                None => break,
            }
        }

        stats.visits = self.visits;
        Ok(stats)
    }

    /// Interprets the graph to a fixpoint with a fresh assumption map.
    fn propagate(&mut self, cfg: &Cfg) -> Result<()> {
        self.assumptions = AssumptionMap::new();
        seed_entry(cfg, &mut self.assumptions);

        self.worklist.clear();
        self.in_worklist = vec![false; cfg.node_count()];
        for node in cfg.node_ids() {
            self.worklist.push_back(node);
            self.in_worklist[node.index()] = true;
        }

        while let Some(node) = self.worklist.pop_front() {
            self.in_worklist[node.index()] = false;
            self.visits += 1;

            let node_ref = cfg.node_ref(node)?;
            let Some(input) = self.assumptions.join_over(node_ref.incoming()) else {
                // Unreachable so far; a predecessor will re-enqueue it if that changes
                continue;
            };
            trace!("visiting {node} with input {input}");

            for (edge, assumption) in flow(cfg, node, &input)? {
                if self.assumptions.set(edge, assumption) {
                    if let Some(target) = cfg.edge_ref(edge)?.target() {
                        self.enqueue(target);
                    }
                }
            }
        }

        Ok(())
    }

    /// Offers every node to the integrated entry point under converged assumptions.
    ///
    /// Returns the first transformation produced, or `None` when the graph is fully
    /// simplified.
    fn rewrite(&mut self, cfg: &Cfg) -> Result<Option<Transformation>> {
        for node in cfg.node_ids() {
            match process(cfg, node, &mut self.assumptions)? {
                Step::Transform(transformation) => return Ok(Some(transformation)),
                Step::Flow(_) | Step::Unreachable => {}
            }
        }
        Ok(None)
    }

    fn enqueue(&mut self, node: NodeId) {
        if !self.in_worklist[node.index()] {
            self.worklist.push_back(node);
            self.in_worklist[node.index()] = true;
        }
    }
}
