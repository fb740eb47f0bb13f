//! Integrated per-node entry point: transform, or else interpret.
//!
//! The engine exposes exactly one operation to the fixpoint driver, [`process`], plus
//! the entry-seeding rule [`seed_entry`]. Per visit, a node is offered to the
//! transformation function first; only if it declines does the flow function run. The
//! two are mutually exclusive within one visit (once a node's shape is about to
//! change, outgoing-edge assumptions computed for the *old* shape would be
//! meaningless), but together they cover every node on every visit.
//!
//! Assumptions live in an [`AssumptionMap`] keyed by edge. An edge with no entry has
//! not been reached yet; such edges contribute nothing when a node's input is joined,
//! which is what keeps structurally unreachable paths from polluting the merge.

use std::collections::HashMap;

use tracing::trace;

use crate::{
    cfg::{Cfg, EdgeId, NodeId},
    dataflow::{flow, transform, Assumption, JoinSemiLattice, Transformation},
    Result,
};

/// Per-edge assumption storage for one analysis run.
///
/// Edges start unmaterialized. The fixpoint driver seeds graph-entry edges via
/// [`seed_entry`] and the flow function materializes the rest as propagation reaches
/// them. The map is discarded when the run ends; no assumption outlives one pass.
#[derive(Debug, Clone, Default)]
pub struct AssumptionMap {
    assumptions: HashMap<EdgeId, Assumption>,
}

impl AssumptionMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the assumption on an edge, or `None` if it has not materialized.
    #[must_use]
    pub fn get(&self, edge: EdgeId) -> Option<&Assumption> {
        self.assumptions.get(&edge)
    }

    /// Stores the assumption for an edge.
    ///
    /// Returns `true` if this changed the edge: it materialized, or its assumption
    /// differs from the stored one.
    pub fn set(&mut self, edge: EdgeId, assumption: Assumption) -> bool {
        match self.assumptions.get(&edge) {
            Some(existing) if *existing == assumption => false,
            _ => {
                self.assumptions.insert(edge, assumption);
                true
            }
        }
    }

    /// Joins the materialized assumptions over the given edges.
    ///
    /// Returns `None` if none of the edges has materialized, meaning the joined point
    /// is unreachable so far. Unmaterialized edges are skipped entirely: absence is the
    /// join identity, not a lattice element.
    #[must_use]
    pub fn join_over(&self, edges: &[EdgeId]) -> Option<Assumption> {
        let mut result: Option<Assumption> = None;
        for edge in edges {
            if let Some(assumption) = self.assumptions.get(edge) {
                result = Some(match result {
                    None => assumption.clone(),
                    Some(acc) => acc.join(assumption),
                });
                // TOP absorbs; no further edge can change the outcome
                if result.as_ref().is_some_and(Assumption::is_top) {
                    break;
                }
            }
        }
        result
    }
}

/// Outcome of one integrated visit of a node.
#[derive(Debug)]
pub enum Step {
    /// The transformation function produced a rewrite.
    ///
    /// The flow function was *not* run; the driver applies the transformation and
    /// revisits the replacement node.
    Transform(Transformation),

    /// The node was interpreted.
    ///
    /// Contains the outgoing edges whose assumption changed; their target nodes need
    /// revisiting.
    Flow(Vec<EdgeId>),

    /// No incoming edge has a materialized assumption; the node is unreachable so far
    /// and nothing was computed.
    Unreachable,
}

/// Processes one node: transformation first, interpretation as the fallback.
///
/// # Errors
///
/// Propagates contract violations from the graph accessors, the transformation
/// function, and the flow function; see [`crate::Error`].
pub fn process(cfg: &Cfg, node: NodeId, assumptions: &mut AssumptionMap) -> Result<Step> {
    let incoming = cfg.node_ref(node)?.incoming();
    let Some(input) = assumptions.join_over(incoming) else {
        trace!("{node} has no materialized in-edge, skipping");
        return Ok(Step::Unreachable);
    };

    if let Some(transformation) = transform(cfg, node, &input)? {
        return Ok(Step::Transform(transformation));
    }

    let mut changed = Vec::new();
    for (edge, assumption) in flow(cfg, node, &input)? {
        if assumptions.set(edge, assumption) {
            changed.push(edge);
        }
    }
    Ok(Step::Flow(changed))
}

/// Seeds every graph-entry edge with the TOP assumption.
///
/// Nothing is known about variables when control enters the graph.
pub fn seed_entry(cfg: &Cfg, assumptions: &mut AssumptionMap) {
    for edge in cfg.entry_edges() {
        assumptions.set(*edge, Assumption::top());
    }
}
