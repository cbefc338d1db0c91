//! Candidate scoring and agency ranking for a single transport request.

pub mod criteria;
pub mod predicates;
pub mod ranker;
pub mod revenue;
pub mod scorer;
pub mod types;

pub use criteria::{MatchCriteria, ValidationError};
pub use predicates::ScoringPolicies;
pub use ranker::{AgencyRanker, MAX_RESULTS};
pub use scorer::CandidateScorer;
pub use types::{MatchingResult, RankedMatches, ScoreBreakdown};
