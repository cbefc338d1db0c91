//! Multi-factor candidate scoring: one request against one agency.

use crate::model::{Facility, Priority, TransportAgency, TransportLevel, UnitAvailability};

use super::criteria::MatchCriteria;
use super::predicates::ScoringPolicies;
use super::revenue::revenue_potential;
use super::types::{MatchingResult, ScoreBreakdown};

/// An agency with no active units scores this flat penalty and nothing else.
const NO_UNITS_PENALTY: i32 = -100;
const CAPABILITY_MATCH_BONUS: i32 = 30;
const CAPABILITY_MISS_PENALTY: i32 = -50;
const SPECIAL_REQUIREMENTS_BONUS: i32 = 20;
const SERVICE_AREA_BONUS: i32 = 25;
const SERVICE_AREA_PENALTY: i32 = -15;
const HOURS_MATCH_BONUS: i32 = 15;
const HOURS_MISMATCH_PENALTY: i32 = -20;
const LONG_DISTANCE_BONUS: i32 = 50;

/// A transfer beyond this mileage is a long-distance transfer (LDT).
pub const LONG_DISTANCE_THRESHOLD_MILES: f64 = 100.0;

/// Placeholder arrival offset from call time. Not an ETA; stands in for a
/// real routing provider.
pub const ESTIMATED_ARRIVAL_OFFSET_MS: u64 = 15 * 60 * 1000;

fn priority_bonus(priority: Priority) -> i32 {
    match priority {
        Priority::Urgent => 30,
        Priority::High => 20,
        Priority::Medium => 10,
        Priority::Low => 5,
    }
}

fn level_bonus(level: TransportLevel) -> i32 {
    match level {
        TransportLevel::Cct => 25,
        TransportLevel::Als => 15,
        TransportLevel::Bls => 10,
    }
}

fn distance_band(miles: f64) -> (i32, &'static str) {
    if miles <= 25.0 {
        (20, "within 25 miles")
    } else if miles <= 50.0 {
        (15, "within 50 miles")
    } else if miles <= 100.0 {
        (10, "within 100 miles")
    } else {
        (5, "over 100 miles")
    }
}

/// Scores one agency for one set of criteria.
///
/// The additive point model starts at zero and each factor appends a signed
/// delta with a textual reason. The published score is floored at zero so a
/// maximally unsuitable agency never ranks with negative weight; the raw sum
/// and all reasons survive in the result for auditing.
pub struct CandidateScorer {
    policies: ScoringPolicies,
}

impl Default for CandidateScorer {
    fn default() -> Self {
        Self::new(ScoringPolicies::default())
    }
}

impl CandidateScorer {
    pub fn new(policies: ScoringPolicies) -> Self {
        Self { policies }
    }

    /// Score `agency` against `criteria`.
    ///
    /// `origin`/`destination` are the criteria's facilities, resolved by the
    /// caller from the Hospital partition; `None` means the lookup failed or
    /// found nothing, which the service-area factor treats as not covered.
    /// `now_ms` is the call time used for the placeholder arrival estimate.
    pub fn score(
        &self,
        agency: &TransportAgency,
        criteria: &MatchCriteria,
        origin: Option<&Facility>,
        destination: Option<&Facility>,
        now_ms: u64,
    ) -> MatchingResult {
        let distance = criteria.estimated_distance_miles;
        let long_distance_transfer =
            distance.map_or(false, |miles| miles > LONG_DISTANCE_THRESHOLD_MILES);
        let revenue =
            revenue_potential(criteria.transport_level, criteria.priority, distance);
        let estimated_arrival_ms = now_ms + ESTIMATED_ARRIVAL_OFFSET_MS;

        let mut breakdown = ScoreBreakdown::default();

        // With no active fleet nothing else matters: flat penalty, no further
        // factors, floored to zero downstream.
        if agency.active_units().next().is_none() {
            breakdown.push(NO_UNITS_PENALTY, "No units available");
            return self.result(
                agency,
                criteria,
                breakdown,
                estimated_arrival_ms,
                revenue,
                long_distance_transfer,
            );
        }

        // Capability
        let level = criteria.transport_level;
        if agency.has_capability(level) {
            breakdown.push(
                CAPABILITY_MATCH_BONUS,
                format!("Has active {}-capable unit", level.label()),
            );
        } else {
            breakdown.push(
                CAPABILITY_MISS_PENALTY,
                format!("No {}-capable unit", level.label()),
            );
        }
        if let Some(requirements) = &criteria.special_requirements {
            if self
                .policies
                .special_requirements
                .supports(agency, requirements)
            {
                breakdown.push(SPECIAL_REQUIREMENTS_BONUS, "Supports special requirements");
            }
        }

        // Geographic proximity
        for (facility, label) in [(origin, "Origin"), (destination, "Destination")] {
            let covered = facility
                .and_then(|f| self.policies.service_area.covers(agency, f))
                .unwrap_or(false);
            if covered {
                breakdown.push(SERVICE_AREA_BONUS, format!("{label} inside service area"));
            } else {
                breakdown.push(
                    SERVICE_AREA_PENALTY,
                    format!("{label} outside known service area"),
                );
            }
        }
        if let Some(miles) = distance {
            let (points, band) = distance_band(miles);
            breakdown.push(points, format!("Trip distance {band}"));
        }

        // Revenue factors
        breakdown.push(
            priority_bonus(criteria.priority),
            format!("{} priority", criteria.priority.label()),
        );
        breakdown.push(level_bonus(level), format!("{} transport", level.label()));

        // Time-window compatibility
        if let Some(window) = &criteria.time_window {
            let compatible = self
                .policies
                .operating_hours
                .covers_window(agency, window)
                .unwrap_or(true);
            if compatible {
                breakdown.push(HOURS_MATCH_BONUS, "Operating hours cover requested window");
            } else {
                breakdown.push(
                    HOURS_MISMATCH_PENALTY,
                    "Requested window outside operating hours",
                );
            }
        }

        // Long-distance bonus
        if long_distance_transfer {
            breakdown.push(LONG_DISTANCE_BONUS, "Long-distance transfer");
        }

        self.result(
            agency,
            criteria,
            breakdown,
            estimated_arrival_ms,
            revenue,
            long_distance_transfer,
        )
    }

    fn result(
        &self,
        agency: &TransportAgency,
        criteria: &MatchCriteria,
        breakdown: ScoreBreakdown,
        estimated_arrival_ms: u64,
        revenue_potential: u64,
        long_distance_transfer: bool,
    ) -> MatchingResult {
        // First available unit of the required capability; the sentinel keeps
        // one result per eligible agency instead of failing.
        let unit = agency.first_available_unit(criteria.transport_level);
        let availability = unit
            .map(|u| u.availability.clone())
            .unwrap_or_else(UnitAvailability::out_of_service);

        MatchingResult {
            agency: agency.id,
            agency_name: agency.name.clone(),
            unit: unit.map(|u| u.id),
            availability,
            score: breakdown.final_score(),
            raw_score: breakdown.raw_total(),
            reasons: breakdown.reasons(),
            estimated_arrival_ms,
            revenue_potential,
            long_distance_transfer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        AgencyId, AvailabilityStatus, FacilityId, Priority, ServiceArea, TimeWindow,
        TransportUnit, UnitId,
    };

    fn test_cell() -> h3o::CellIndex {
        h3o::CellIndex::try_from(0x8a1fb46622dffff).expect("cell")
    }

    fn facility(id: u64) -> Facility {
        Facility {
            id: FacilityId(id),
            name: format!("Facility {id}"),
            cell: test_cell(),
        }
    }

    fn cct_agency() -> TransportAgency {
        TransportAgency {
            id: AgencyId(1),
            external_ref: "ems-001".into(),
            name: "Metro EMS".into(),
            contact_email: "dispatch@metro-ems.example".into(),
            active: true,
            service_area: Some(ServiceArea {
                center: test_cell(),
                radius_cells: 3,
            }),
            operating_window: Some(TimeWindow::new(0, u64::MAX)),
            units: vec![TransportUnit {
                id: UnitId(11),
                agency: AgencyId(1),
                capability: TransportLevel::Cct,
                active: true,
                availability: UnitAvailability {
                    status: AvailabilityStatus::Available,
                    cell: Some(test_cell()),
                    shift: None,
                },
            }],
        }
    }

    fn urgent_cct_criteria() -> MatchCriteria {
        MatchCriteria::new(
            TransportLevel::Cct,
            FacilityId(1),
            FacilityId(2),
            Priority::Urgent,
        )
        .with_estimated_distance(120.0)
        .with_time_window(TimeWindow::new(1_000, 7_200_000))
    }

    #[test]
    fn fully_suitable_agency_scores_the_worked_example() {
        // 30 (capability) + 25 + 25 (service area) + 5 (distance band)
        // + 30 (urgent) + 25 (CCT) + 15 (hours) + 50 (LDT) = 205
        let scorer = CandidateScorer::default();
        let result = scorer.score(
            &cct_agency(),
            &urgent_cct_criteria(),
            Some(&facility(1)),
            Some(&facility(2)),
            0,
        );

        assert_eq!(result.score, 205);
        assert_eq!(result.raw_score, 205);
        assert!(result.long_distance_transfer);
        assert_eq!(result.revenue_potential, 2880);
        assert_eq!(result.unit, Some(UnitId(11)));
        assert_eq!(result.availability.status, AvailabilityStatus::Available);
    }

    #[test]
    fn agency_without_units_floors_at_zero_with_the_reason() {
        let mut agency = cct_agency();
        agency.units.clear();

        let scorer = CandidateScorer::default();
        let result = scorer.score(
            &agency,
            &urgent_cct_criteria(),
            Some(&facility(1)),
            Some(&facility(2)),
            0,
        );

        assert_eq!(result.raw_score, -100);
        assert_eq!(result.score, 0);
        assert!(result
            .reasons
            .iter()
            .any(|reason| reason == "No units available"));
        assert_eq!(result.unit, None);
        assert_eq!(result.availability.status, AvailabilityStatus::OutOfService);
        // The LDT flag is distance metadata, not a scoring outcome.
        assert!(result.long_distance_transfer);
        assert_eq!(result.revenue_potential, 2880);
    }

    #[test]
    fn wrong_capability_penalizes_but_still_scores() {
        let mut criteria = urgent_cct_criteria();
        criteria.transport_level = TransportLevel::Bls;
        // capability -50, area +50, band +5, urgent +30, BLS +10, hours +15,
        // LDT +50 => 110; the CCT unit is not a BLS unit, so the sentinel is
        // returned.
        let scorer = CandidateScorer::default();
        let result = scorer.score(
            &cct_agency(),
            &criteria,
            Some(&facility(1)),
            Some(&facility(2)),
            0,
        );

        assert_eq!(result.score, 110);
        assert_eq!(result.availability.status, AvailabilityStatus::OutOfService);
        assert!(result
            .reasons
            .iter()
            .any(|reason| reason == "No BLS-capable unit"));
    }

    #[test]
    fn unknown_coverage_and_missing_facilities_penalize_without_panicking() {
        let mut agency = cct_agency();
        agency.service_area = None;

        let scorer = CandidateScorer::default();
        let result = scorer.score(&agency, &urgent_cct_criteria(), None, None, 0);

        // 30 + (-15 - 15) + 5 + 30 + 25 + 15 + 50 = 125
        assert_eq!(result.score, 125);
    }

    #[test]
    fn ldt_flag_tracks_the_threshold_exactly() {
        let scorer = CandidateScorer::default();
        let at_threshold = scorer.score(
            &cct_agency(),
            &urgent_cct_criteria().with_estimated_distance(100.0),
            Some(&facility(1)),
            Some(&facility(2)),
            0,
        );
        assert!(!at_threshold.long_distance_transfer);

        let over = scorer.score(
            &cct_agency(),
            &urgent_cct_criteria().with_estimated_distance(100.1),
            Some(&facility(1)),
            Some(&facility(2)),
            0,
        );
        assert!(over.long_distance_transfer);
    }

    #[test]
    fn special_requirements_bonus_needs_an_affirmative_policy() {
        let criteria = urgent_cct_criteria().with_special_requirements("bariatric stretcher");

        // The default policy has no support data and never grants the bonus.
        let default_scorer = CandidateScorer::default();
        let without = default_scorer.score(
            &cct_agency(),
            &criteria,
            Some(&facility(1)),
            Some(&facility(2)),
            0,
        );
        assert_eq!(without.score, 205);

        struct SupportsEverything;
        impl crate::matching::predicates::SpecialRequirementsPolicy for SupportsEverything {
            fn supports(&self, _agency: &TransportAgency, _requirements: &str) -> bool {
                true
            }
        }
        let mut policies = crate::matching::predicates::ScoringPolicies::default();
        policies.special_requirements = Box::new(SupportsEverything);
        let with = CandidateScorer::new(policies).score(
            &cct_agency(),
            &criteria,
            Some(&facility(1)),
            Some(&facility(2)),
            0,
        );
        assert_eq!(with.score, 225);
        assert!(with
            .reasons
            .iter()
            .any(|reason| reason == "Supports special requirements"));
    }

    #[test]
    fn arrival_estimate_is_a_fixed_offset_from_call_time() {
        let scorer = CandidateScorer::default();
        let result = scorer.score(
            &cct_agency(),
            &urgent_cct_criteria(),
            Some(&facility(1)),
            Some(&facility(2)),
            1_000_000,
        );
        assert_eq!(result.estimated_arrival_ms, 1_000_000 + 15 * 60 * 1000);
    }
}
