//! Agency ranking: score every eligible agency for a request, sort, truncate.

use crate::model::{Facility, FacilityId, TransportAgency, TransportRequest};
use crate::partitions::reconcile::{registration_check, RegistrationCheck};
use crate::partitions::{AgencyFilter, CenterPartition, EmsPartition, HospitalPartition};

use super::criteria::{MatchCriteria, ValidationError};
use super::scorer::CandidateScorer;
use super::types::RankedMatches;

/// Ranking output is truncated to this many candidates.
pub const MAX_RESULTS: usize = 10;

/// Orchestrates scorer calls across all eligible agencies.
///
/// Ranking is advisory: two concurrent calls over the same request simply
/// produce two independently computed results, and a transient EMS outage
/// degrades to an empty result instead of failing the request flow.
pub struct AgencyRanker {
    hospital: Box<dyn HospitalPartition>,
    ems: Box<dyn EmsPartition>,
    center: Option<Box<dyn CenterPartition>>,
    scorer: CandidateScorer,
}

impl AgencyRanker {
    pub fn new(hospital: Box<dyn HospitalPartition>, ems: Box<dyn EmsPartition>) -> Self {
        Self {
            hospital,
            ems,
            center: None,
            scorer: CandidateScorer::default(),
        }
    }

    /// Exclude agencies whose Center registration is suspended. Lookup
    /// failures and unknown registrations never exclude anyone; the EMS
    /// partition stays the system of record.
    pub fn with_center(mut self, center: Box<dyn CenterPartition>) -> Self {
        self.center = Some(center);
        self
    }

    pub fn with_scorer(mut self, scorer: CandidateScorer) -> Self {
        self.scorer = scorer;
        self
    }

    /// Rank candidates for a stored request.
    pub fn find_matches_for_request(
        &self,
        request: &TransportRequest,
        now_ms: u64,
    ) -> Result<RankedMatches, ValidationError> {
        self.find_matches(&MatchCriteria::for_request(request), now_ms)
    }

    /// Rank candidates for explicit criteria.
    ///
    /// Malformed criteria are rejected before any partition access. EMS
    /// lookup failures return an empty, non-degraded result; an empty result
    /// with `degraded: false` and no validation error is therefore either
    /// "no candidates" or "EMS unreachable", which callers distinguish at the
    /// partition boundary, not here.
    pub fn find_matches(
        &self,
        criteria: &MatchCriteria,
        now_ms: u64,
    ) -> Result<RankedMatches, ValidationError> {
        criteria.validate()?;

        let mut degraded = false;
        let filter = AgencyFilter::available_capability(criteria.transport_level);
        let mut agencies = match self.ems.agencies_with_units(&filter) {
            Ok(agencies) => agencies,
            Err(_) => return Ok(RankedMatches::default()),
        };
        agencies.retain(eligible);

        if agencies.is_empty() {
            // Degraded mode: no capability match anywhere, rank every
            // eligible active agency instead of returning nothing.
            degraded = true;
            agencies = match self.ems.agencies_with_units(&AgencyFilter::active()) {
                Ok(agencies) => agencies,
                Err(_) => return Ok(RankedMatches::default()),
            };
            agencies.retain(eligible);
        }

        if let Some(center) = &self.center {
            agencies.retain(|agency| {
                registration_check(agency, center.as_ref()) != RegistrationCheck::Suspended
            });
        }

        let origin = self.lookup_facility(criteria.origin_facility);
        let destination = self.lookup_facility(criteria.destination_facility);

        let mut results: Vec<_> = agencies
            .iter()
            .map(|agency| {
                self.scorer.score(
                    agency,
                    criteria,
                    origin.as_ref(),
                    destination.as_ref(),
                    now_ms,
                )
            })
            .collect();

        // Stable sort: ties keep EMS discovery order. Zero-score entries are
        // kept, per the floor-at-zero rule.
        results.sort_by(|a, b| b.score.cmp(&a.score));
        results.truncate(MAX_RESULTS);

        Ok(RankedMatches { results, degraded })
    }

    /// Second-lookup resolution against the Hospital partition; a failed or
    /// empty lookup leaves coverage unknown rather than failing the ranking.
    fn lookup_facility(&self, id: FacilityId) -> Option<Facility> {
        self.hospital.facility(id).ok().flatten()
    }
}

/// An agency must have at least one active unit to be ranked at all;
/// ineligible agencies are excluded, not scored to a negative floor.
fn eligible(agency: &TransportAgency) -> bool {
    agency.active && agency.active_units().next().is_some()
}
