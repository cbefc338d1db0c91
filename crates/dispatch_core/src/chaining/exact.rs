//! Assignment-based pairing mode (feature `exact`).
//!
//! Solves a maximum-weight bipartite assignment (Kuhn-Munkres) between
//! requests as chain heads and requests as chain tails, then accepts the
//! highest-saving disjoint pairs. This is the bipartite relaxation of the
//! pairing problem: optimal over two-request chains, and deliberately a
//! separate entry point so the default greedy ordering never changes.

use pathfinding::kuhn_munkres::{kuhn_munkres, Weights};

use crate::routing::DistanceProvider;

use super::analyzer::{build_opportunity, connection_leg, recommend, summarize, Candidate};
use super::types::{
    ChainingConstraints, ChainingError, OpportunityId, OptimizationOutcome, OptimizationRequest,
};

/// Scale factor to convert f64 savings to i64 for the assignment algorithm.
const SCALE: f64 = 1_000_000.0;

/// Weight for infeasible pairs (never selected).
/// Must be worse than any feasible weight but not so extreme that negating
/// and summing overflows i64.
const INFEASIBLE: i64 = -1_000_000_000_000_i64;

/// Simple matrix type implementing pathfinding's Weights for i64.
struct I64Weights(Vec<Vec<i64>>);

impl Weights<i64> for I64Weights {
    fn rows(&self) -> usize {
        self.0.len()
    }

    fn columns(&self) -> usize {
        self.0.first().map_or(0, |r| r.len())
    }

    fn at(&self, row: usize, col: usize) -> i64 {
        self.0[row][col]
    }

    fn neg(&self) -> Self {
        I64Weights(
            self.0
                .iter()
                .map(|r| r.iter().map(|&x| x.saturating_neg()).collect())
                .collect(),
        )
    }
}

fn savings_to_weight(savings: f64) -> i64 {
    let w = savings * SCALE;
    if w >= i64::MAX as f64 {
        i64::MAX
    } else if w <= i64::MIN as f64 {
        i64::MIN
    } else {
        w as i64
    }
}

/// Disjoint head→tail pairs maximizing total miles saved.
///
/// A pair (i, j) is feasible when j's pickup can chain onto i's dropoff
/// under the same constraints the greedy walk uses. Returned indices are
/// into `candidates`, ordered by descending pair savings.
pub(crate) fn optimal_pairs(
    candidates: &[Candidate],
    constraints: &ChainingConstraints,
    distance: &dyn DistanceProvider,
) -> Vec<(usize, usize)> {
    let n = candidates.len();
    if n < 2 {
        return Vec::new();
    }

    let mut matrix = vec![vec![INFEASIBLE; n]; n];
    let mut any_feasible = false;
    for (i, head) in candidates.iter().enumerate() {
        for (j, tail) in candidates.iter().enumerate() {
            if i == j {
                continue;
            }
            let Some(leg) = connection_leg(head, tail, constraints, distance) else {
                continue;
            };
            let chained_secs =
                head.own_leg.duration_secs + leg.duration_secs + tail.own_leg.duration_secs;
            if chained_secs > constraints.max_duration_secs() {
                continue;
            }
            // Out-and-back baseline minus the chained route.
            let savings = head.own_leg.distance_miles + tail.own_leg.distance_miles
                - leg.distance_miles;
            matrix[i][j] = savings_to_weight(savings);
            any_feasible = true;
        }
    }
    if !any_feasible {
        return Vec::new();
    }

    let weights = I64Weights(matrix);
    let (_total, assignment) = kuhn_munkres(&weights);

    // The assignment may build head→tail cycles through already-used
    // requests; accept disjoint pairs greedily by descending savings.
    let mut scored: Vec<(i64, usize, usize)> = assignment
        .iter()
        .enumerate()
        .map(|(i, &j)| (weights.at(i, j), i, j))
        .filter(|&(w, _, _)| w > INFEASIBLE)
        .collect();
    scored.sort_by_key(|(w, _, _)| std::cmp::Reverse(*w));

    let mut used = vec![false; n];
    let mut pairs = Vec::new();
    for (weight, i, j) in scored {
        if used[i] || used[j] || weight <= 0 {
            continue;
        }
        used[i] = true;
        used[j] = true;
        pairs.push((i, j));
    }
    pairs
}

impl super::ChainingAnalyzer {
    /// Pairing-only optimization: each opportunity is exactly two requests,
    /// chosen by maximum-weight assignment instead of the greedy walk.
    pub fn optimize_pairs(
        &self,
        request: &OptimizationRequest,
    ) -> Result<OptimizationOutcome, ChainingError> {
        if !request.window.is_valid() {
            return Err(ChainingError::InvalidWindow {
                earliest_ms: request.window.earliest_ms,
                latest_ms: request.window.latest_ms,
            });
        }

        let candidates = self.collect_candidates(request)?;
        let considered = candidates.len();
        let pairs = optimal_pairs(&candidates, &request.constraints, self.distance_provider());

        // Pairs are disjoint, so each slot is taken at most once.
        let mut slots: Vec<Option<Candidate>> = candidates.into_iter().map(Some).collect();
        let mut opportunities = Vec::with_capacity(pairs.len());
        for (index, (head, tail)) in pairs.into_iter().enumerate() {
            let (Some(head_candidate), Some(tail_candidate)) =
                (slots[head].take(), slots[tail].take())
            else {
                continue;
            };
            let leg = connection_leg(
                &head_candidate,
                &tail_candidate,
                &request.constraints,
                self.distance_provider(),
            );
            let chain = vec![(head_candidate, None), (tail_candidate, leg)];
            opportunities.push(build_opportunity(
                OpportunityId(index as u64 + 1),
                chain,
                &request.constraints,
            ));
        }

        let summary = summarize(request.window, considered, &opportunities);
        let recommendations = recommend(considered, &opportunities);
        Ok(OptimizationOutcome {
            opportunities,
            recommendations,
            summary,
        })
    }
}
