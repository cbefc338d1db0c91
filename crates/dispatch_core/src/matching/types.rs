//! Scoring output types.

use serde::{Deserialize, Serialize};

use crate::model::{AgencyId, UnitAvailability, UnitId};

/// One signed scoring factor with its audit reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub points: i32,
    pub reason: String,
}

/// Accumulates the additive point model. The raw sum may legitimately go
/// negative; the published score is floored at zero while every entry is
/// retained for explainability.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    entries: Vec<ScoreEntry>,
}

impl ScoreBreakdown {
    pub fn push(&mut self, points: i32, reason: impl Into<String>) {
        self.entries.push(ScoreEntry {
            points,
            reason: reason.into(),
        });
    }

    /// Signed sum before flooring.
    pub fn raw_total(&self) -> i32 {
        self.entries.iter().map(|entry| entry.points).sum()
    }

    /// Published score: `max(0, raw_total)`.
    pub fn final_score(&self) -> i32 {
        self.raw_total().max(0)
    }

    pub fn reasons(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| entry.reason.clone())
            .collect()
    }
}

/// Pairing of one request with one candidate agency/unit. Derived, never
/// persisted; exists only for the duration of a ranking call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingResult {
    pub agency: AgencyId,
    pub agency_name: String,
    /// Unit chosen for the candidate, if one was available.
    pub unit: Option<UnitId>,
    /// The chosen unit's availability, or the OUT_OF_SERVICE sentinel.
    pub availability: UnitAvailability,
    /// Floored-at-zero matching score.
    pub score: i32,
    /// Pre-floor signed sum, retained for auditing.
    pub raw_score: i32,
    pub reasons: Vec<String>,
    /// Placeholder arrival estimate (call time + fixed offset), not a real ETA.
    pub estimated_arrival_ms: u64,
    pub revenue_potential: u64,
    pub long_distance_transfer: bool,
}

/// Ordered ranking output, at most [`crate::matching::MAX_RESULTS`] entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankedMatches {
    /// Sorted by non-increasing score.
    pub results: Vec<MatchingResult>,
    /// True when the capability/availability filter matched nothing and the
    /// ranker fell back to all eligible active agencies.
    pub degraded: bool,
}
