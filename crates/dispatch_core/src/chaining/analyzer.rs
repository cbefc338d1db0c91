//! Greedy route chaining over pending transport requests.
//!
//! The grouping is a heuristic, not a global optimum: candidates are sorted
//! by priority then pickup time (the same order becomes the stop sequence),
//! and the walk links a request to the open chain whenever the connecting
//! deadhead leg fits the constraint-derived bounds. Alternative groupings
//! are not searched; the `exact` feature offers an assignment-based pairing
//! mode without changing this default.

use std::cmp::Reverse;

use crate::matching::revenue::{revenue_potential, PER_MILE_OPERATING_COST};
use crate::model::{Facility, TimeWindow, TransportRequest};
use crate::partitions::{HospitalPartition, RequestFilter};
use crate::routing::{DistanceProvider, GridDistanceProvider, RouteLeg};
use crate::spatial::distance_miles_between_cells;

use super::types::{
    ChainedTripOpportunity, ChainingConstraints, ChainingDetails, ChainingError, ChainingKind,
    OpportunityId, OptimizationOutcome, OptimizationRequest, OptimizationSummary, RouteStop,
    StopKind,
};

/// Two requests count as a return trip when the second drops off within this
/// many miles of the first pickup.
const RETURN_TRIP_PROXIMITY_MILES: f64 = 5.0;

/// Two pickups within this window make a pair temporal.
const TEMPORAL_WINDOW_MS: u64 = 60 * 60 * 1000;

/// Miles saved per freed vehicle-shift.
const MILES_PER_UNIT_SHIFT: f64 = 50.0;

/// A request with its geometry resolved from the Hospital partition.
pub(crate) struct Candidate {
    pub(crate) request: TransportRequest,
    pub(crate) origin: Facility,
    pub(crate) destination: Facility,
    pub(crate) own_leg: RouteLeg,
}

/// Scans pending requests for chaining opportunities.
pub struct ChainingAnalyzer {
    hospital: Box<dyn HospitalPartition>,
    distance: Box<dyn DistanceProvider>,
}

impl ChainingAnalyzer {
    pub fn new(hospital: Box<dyn HospitalPartition>, distance: Box<dyn DistanceProvider>) -> Self {
        Self { hospital, distance }
    }

    /// Analyzer with the placeholder grid distance lookup.
    pub fn with_grid_distances(hospital: Box<dyn HospitalPartition>) -> Self {
        Self::new(hospital, Box::new(GridDistanceProvider))
    }

    /// Find chaining opportunities in a time window.
    ///
    /// Partition failures propagate as hard errors. A window with nothing to
    /// group is a normal outcome: empty opportunities plus a summary noting
    /// zero.
    pub fn optimize_routes(
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
        let chains = greedy_chains(candidates, &request.constraints, self.distance.as_ref());

        let opportunities: Vec<ChainedTripOpportunity> = chains
            .into_iter()
            .enumerate()
            .map(|(index, chain)| {
                build_opportunity(OpportunityId(index as u64 + 1), chain, &request.constraints)
            })
            .collect();

        let summary = summarize(request.window, considered, &opportunities);
        let recommendations = recommend(considered, &opportunities);

        Ok(OptimizationOutcome {
            opportunities,
            recommendations,
            summary,
        })
    }

    #[cfg(feature = "exact")]
    pub(crate) fn distance_provider(&self) -> &dyn DistanceProvider {
        self.distance.as_ref()
    }

    /// Pull open requests for the window and resolve their geometry.
    ///
    /// Requests that cannot be geolocated (missing facility record and no
    /// estimated distance) or that violate the distinct-endpoints invariant
    /// are skipped; a failing Hospital partition is a hard error.
    pub(crate) fn collect_candidates(
        &self,
        request: &OptimizationRequest,
    ) -> Result<Vec<Candidate>, ChainingError> {
        let filter = RequestFilter {
            levels: request.transport_levels.clone(),
            priorities: request.priorities.clone(),
            assigned_agency: request.agency,
        };
        let pending = self.hospital.pending_requests(request.window, &filter)?;

        let mut candidates = Vec::with_capacity(pending.len());
        for transport in pending {
            if transport.origin_facility == transport.destination_facility {
                continue;
            }
            let Some(origin) = self.hospital.facility(transport.origin_facility)? else {
                continue;
            };
            let Some(destination) = self.hospital.facility(transport.destination_facility)? else {
                continue;
            };
            let own_leg = match self.distance.leg(origin.cell, destination.cell) {
                Some(leg) => leg,
                None => match transport.estimated_distance_miles {
                    Some(miles) => RouteLeg::from_distance(miles),
                    None => continue,
                },
            };
            if let Some(max_miles) = request.max_distance_miles {
                if own_leg.distance_miles > max_miles {
                    continue;
                }
            }
            candidates.push(Candidate {
                request: transport,
                origin,
                destination,
                own_leg,
            });
        }
        Ok(candidates)
    }
}

/// Deadhead leg from `previous`'s dropoff to `next`'s pickup, if it fits the
/// constraints. Shared by the greedy walk and the exact pairing mode.
pub(crate) fn connection_leg(
    previous: &Candidate,
    next: &Candidate,
    constraints: &ChainingConstraints,
    distance: &dyn DistanceProvider,
) -> Option<RouteLeg> {
    let leg = distance.leg(previous.destination.cell, next.origin.cell)?;
    if leg.distance_miles > constraints.max_deadhead_miles {
        return None;
    }
    if leg.duration_secs > constraints.connection_budget_secs() {
        return None;
    }
    Some(leg)
}

/// Walk the priority/pickup-time ordering, closing the open chain whenever
/// the next request does not link.
fn greedy_chains(
    mut candidates: Vec<Candidate>,
    constraints: &ChainingConstraints,
    distance: &dyn DistanceProvider,
) -> Vec<Vec<(Candidate, Option<RouteLeg>)>> {
    candidates.sort_by_key(|candidate| {
        (
            Reverse(candidate.request.priority),
            candidate.request.pickup_time_ms(),
        )
    });

    let mut chains = Vec::new();
    // Each entry pairs a candidate with the deadhead leg that connects it to
    // the previous stop (None for the chain head).
    let mut current: Vec<(Candidate, Option<RouteLeg>)> = Vec::new();
    let mut current_secs = 0.0;

    for candidate in candidates {
        let link = current.last().and_then(|(previous, _)| {
            let stops_after = (current.len() + 1) * 2;
            if stops_after > constraints.max_stops {
                return None;
            }
            let leg = connection_leg(previous, &candidate, constraints, distance)?;
            let chained_secs = current_secs + leg.duration_secs + candidate.own_leg.duration_secs;
            (chained_secs <= constraints.max_duration_secs()).then_some(leg)
        });

        match link {
            Some(leg) => {
                current_secs += leg.duration_secs + candidate.own_leg.duration_secs;
                current.push((candidate, Some(leg)));
            }
            None => {
                if current.len() >= 2 {
                    chains.push(std::mem::take(&mut current));
                } else {
                    current.clear();
                }
                current_secs = candidate.own_leg.duration_secs;
                current.push((candidate, None));
            }
        }
    }
    if current.len() >= 2 {
        chains.push(current);
    }
    chains
}

/// Aggregate one chain into an opportunity.
///
/// Savings model: a standalone trip is costed as out-and-back (the unit
/// deadheads an empty return leg), so the baseline is twice the loaded miles
/// and the optimized route replaces those empty returns with the connecting
/// legs. Floored at zero either way.
pub(crate) fn build_opportunity(
    id: OpportunityId,
    chain: Vec<(Candidate, Option<RouteLeg>)>,
    constraints: &ChainingConstraints,
) -> ChainedTripOpportunity {
    debug_assert!(chain.len() >= 2, "an opportunity needs at least two requests");

    let loaded_miles: f64 = chain
        .iter()
        .map(|(candidate, _)| candidate.own_leg.distance_miles)
        .sum();
    let deadhead_miles: f64 = chain
        .iter()
        .filter_map(|(_, leg)| leg.as_ref().map(|l| l.distance_miles))
        .sum();
    let total_distance_miles = loaded_miles + deadhead_miles;
    let total_time_secs: f64 = chain
        .iter()
        .map(|(candidate, leg)| {
            candidate.own_leg.duration_secs
                + leg.as_ref().map(|l| l.duration_secs).unwrap_or(0.0)
        })
        .sum();

    let baseline_miles = loaded_miles * 2.0;
    let miles_saved = (baseline_miles - total_distance_miles).max(0.0);
    let optimization_score = if baseline_miles > 0.0 {
        ((miles_saved / baseline_miles) * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };
    let units_saved = (miles_saved / MILES_PER_UNIT_SHIFT).ceil() as u32;

    let revenue: u64 = chain
        .iter()
        .map(|(candidate, _)| {
            revenue_potential(
                candidate.request.level,
                candidate.request.priority,
                candidate
                    .request
                    .estimated_distance_miles
                    .or(Some(candidate.own_leg.distance_miles)),
            )
        })
        .sum();
    let revenue_increase = (miles_saved * PER_MILE_OPERATING_COST).round() as u64;

    let window = TimeWindow::new(
        chain
            .iter()
            .map(|(c, _)| c.request.window.earliest_ms)
            .min()
            .unwrap_or(0),
        chain
            .iter()
            .map(|(c, _)| c.request.window.latest_ms)
            .max()
            .unwrap_or(0),
    );

    let pickups: Vec<u64> = chain
        .iter()
        .map(|(c, _)| c.request.pickup_time_ms())
        .collect();
    let pickup_span_secs =
        (pickups.iter().max().unwrap_or(&0) - pickups.iter().min().unwrap_or(&0)) as f64 / 1000.0;
    let duration_budget = constraints.max_duration_secs();
    let temporal_efficiency = ((1.0 - pickup_span_secs / duration_budget) * 100.0).clamp(0.0, 100.0);
    let geographic_efficiency = if total_distance_miles > 0.0 {
        (loaded_miles / total_distance_miles * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };

    let kind = classify(&chain);
    let stops = chain
        .iter()
        .flat_map(|(candidate, _)| {
            [
                RouteStop {
                    request: candidate.request.id,
                    facility: candidate.origin.id,
                    cell: candidate.origin.cell,
                    kind: StopKind::Pickup,
                },
                RouteStop {
                    request: candidate.request.id,
                    facility: candidate.destination.id,
                    cell: candidate.destination.cell,
                    kind: StopKind::Dropoff,
                },
            ]
        })
        .collect();

    ChainedTripOpportunity {
        id,
        route_type: kind.route_type(),
        requests: chain.iter().map(|(c, _)| c.request.id).collect(),
        stops,
        total_distance_miles,
        total_time_secs,
        miles_saved,
        units_saved,
        revenue_potential: revenue,
        revenue_increase,
        optimization_score,
        window,
        temporal_efficiency,
        geographic_efficiency,
        chaining: ChainingDetails {
            kind,
            deadhead_miles,
        },
    }
}

/// Dominant proximity criterion for a chain: three or more requests is a
/// multi-stop; a pair that retraces itself is a return trip; otherwise
/// pickup-time clustering wins over plain spatial overlap.
fn classify(chain: &[(Candidate, Option<RouteLeg>)]) -> ChainingKind {
    if chain.len() >= 3 {
        return ChainingKind::MultiStop;
    }
    let (first, _) = &chain[0];
    let (second, _) = &chain[1];
    let return_gap_miles =
        distance_miles_between_cells(second.destination.cell, first.origin.cell);
    if return_gap_miles <= RETURN_TRIP_PROXIMITY_MILES {
        return ChainingKind::ReturnTrip;
    }
    let pickup_gap_ms = second
        .request
        .pickup_time_ms()
        .abs_diff(first.request.pickup_time_ms());
    if pickup_gap_ms <= TEMPORAL_WINDOW_MS {
        return ChainingKind::Temporal;
    }
    ChainingKind::Spatial
}

pub(crate) fn summarize(
    window: TimeWindow,
    requests_considered: usize,
    opportunities: &[ChainedTripOpportunity],
) -> OptimizationSummary {
    let requests_chained = opportunities.iter().map(|o| o.requests.len()).sum();
    let total_miles_saved = opportunities.iter().map(|o| o.miles_saved).sum();
    let total_units_saved = opportunities.iter().map(|o| o.units_saved).sum();
    let total_revenue_increase = opportunities.iter().map(|o| o.revenue_increase).sum();
    let mean_optimization_score = if opportunities.is_empty() {
        0.0
    } else {
        opportunities
            .iter()
            .map(|o| o.optimization_score)
            .sum::<f64>()
            / opportunities.len() as f64
    };
    OptimizationSummary {
        window,
        requests_considered,
        requests_chained,
        opportunity_count: opportunities.len(),
        total_miles_saved,
        total_units_saved,
        total_revenue_increase,
        mean_optimization_score,
    }
}

pub(crate) fn recommend(
    requests_considered: usize,
    opportunities: &[ChainedTripOpportunity],
) -> Vec<String> {
    let mut recommendations = Vec::new();
    if opportunities.is_empty() {
        recommendations.push(
            "No chaining opportunities in this window; widen the window or relax constraints."
                .to_string(),
        );
        return recommendations;
    }

    let chained: usize = opportunities.iter().map(|o| o.requests.len()).sum();
    recommendations.push(format!(
        "{} chaining opportunit{} covering {} of {} open requests.",
        opportunities.len(),
        if opportunities.len() == 1 { "y" } else { "ies" },
        chained,
        requests_considered,
    ));

    let return_trips = opportunities
        .iter()
        .filter(|o| o.chaining.kind == ChainingKind::ReturnTrip)
        .count();
    if return_trips > 0 {
        recommendations.push(format!(
            "{return_trips} return-trip pairing(s) reuse an otherwise empty return leg."
        ));
    }

    let miles_saved: f64 = opportunities.iter().map(|o| o.miles_saved).sum();
    let units_saved: u32 = opportunities.iter().map(|o| o.units_saved).sum();
    if miles_saved > 0.0 {
        recommendations.push(format!(
            "Estimated {miles_saved:.1} deadhead miles avoided ({units_saved} unit-shift(s) freed)."
        ));
    }
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        FacilityId, Priority, RequestId, RequestStatus, TransportLevel, TransportRequest,
    };

    fn cells() -> Vec<h3o::CellIndex> {
        let center = h3o::CellIndex::try_from(0x8a1fb46622dffff).expect("cell");
        center.grid_disk::<Vec<_>>(2)
    }

    fn facility(id: u64, cell: h3o::CellIndex) -> Facility {
        Facility {
            id: FacilityId(id),
            name: format!("Facility {id}"),
            cell,
        }
    }

    fn candidate(
        id: u64,
        priority: Priority,
        pickup_ms: u64,
        origin: Facility,
        destination: Facility,
    ) -> Candidate {
        let own_leg = GridDistanceProvider
            .leg(origin.cell, destination.cell)
            .expect("leg");
        Candidate {
            request: TransportRequest {
                id: RequestId(id),
                origin_facility: origin.id,
                destination_facility: destination.id,
                level: TransportLevel::Bls,
                priority,
                special_requirements: None,
                estimated_distance_miles: None,
                window: TimeWindow::new(pickup_ms, pickup_ms + 3_600_000),
                status: RequestStatus::Pending,
                assigned_agency: None,
            },
            origin,
            destination,
            own_leg,
        }
    }

    #[test]
    fn greedy_walk_orders_by_priority_then_pickup_time() {
        let cells = cells();
        let a = facility(1, cells[0]);
        let b = facility(2, cells[1]);
        let c = facility(3, cells[2]);

        let candidates = vec![
            candidate(1, Priority::Low, 0, a.clone(), b.clone()),
            candidate(2, Priority::Urgent, 10_000, b.clone(), c.clone()),
            candidate(3, Priority::Urgent, 5_000, c, a),
        ];

        let chains = greedy_chains(
            candidates,
            &ChainingConstraints::default(),
            &GridDistanceProvider,
        );
        assert_eq!(chains.len(), 1);
        let ids: Vec<u64> = chains[0].iter().map(|(c, _)| c.request.id.0).collect();
        // Urgent requests first (earlier pickup breaking the tie), Low last.
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn max_stops_closes_the_open_chain() {
        let cells = cells();
        let a = facility(1, cells[0]);
        let b = facility(2, cells[1]);

        let candidates = (0..4)
            .map(|i| {
                candidate(
                    i + 1,
                    Priority::Medium,
                    i * 1_000,
                    a.clone(),
                    b.clone(),
                )
            })
            .collect();

        let constraints = ChainingConstraints::default().with_max_stops(4);
        let chains = greedy_chains(candidates, &constraints, &GridDistanceProvider);
        assert_eq!(chains.len(), 2, "four requests split into two pairs");
        assert!(chains.iter().all(|chain| chain.len() == 2));
    }

    #[test]
    fn pair_retracing_itself_is_a_return_trip() {
        let cells = cells();
        let a = facility(1, cells[0]);
        let b = facility(2, cells[1]);

        let chain = vec![
            (candidate(1, Priority::Medium, 0, a.clone(), b.clone()), None),
            (
                candidate(2, Priority::Medium, 5_000_000, b, a),
                GridDistanceProvider.leg(cells[1], cells[1]),
            ),
        ];
        assert_eq!(classify(&chain), ChainingKind::ReturnTrip);
    }

    #[test]
    fn three_requests_classify_as_multi_stop() {
        let cells = cells();
        let a = facility(1, cells[0]);
        let b = facility(2, cells[1]);
        let c = facility(3, cells[2]);

        let chain = vec![
            (candidate(1, Priority::Medium, 0, a.clone(), b.clone()), None),
            (
                candidate(2, Priority::Medium, 1_000, b.clone(), c.clone()),
                GridDistanceProvider.leg(cells[1], cells[1]),
            ),
            (
                candidate(3, Priority::Medium, 2_000, c, a),
                GridDistanceProvider.leg(cells[2], cells[2]),
            ),
        ];
        assert_eq!(classify(&chain), ChainingKind::MultiStop);
    }

    #[test]
    fn opportunity_savings_never_go_negative() {
        let cells = cells();
        let a = facility(1, cells[0]);
        let b = facility(2, cells[1]);
        let chain = vec![
            (candidate(1, Priority::Medium, 0, a.clone(), b.clone()), None),
            (
                candidate(2, Priority::Medium, 1_000, a, b),
                GridDistanceProvider.leg(cells[1], cells[0]),
            ),
        ];

        let opportunity = build_opportunity(
            OpportunityId(1),
            chain,
            &ChainingConstraints::default(),
        );
        assert!(opportunity.miles_saved >= 0.0);
        assert!(opportunity.optimization_score >= 0.0);
        assert!(opportunity.optimization_score <= 100.0);
        assert_eq!(opportunity.requests.len(), 2);
        assert_eq!(opportunity.stops.len(), 4);
    }
}
