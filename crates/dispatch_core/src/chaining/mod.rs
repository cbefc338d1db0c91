//! Route chaining: grouping independent transport requests into multi-stop
//! vehicle routes to cut empty-mile travel.

pub mod analyzer;
#[cfg(feature = "exact")]
pub mod exact;
pub mod types;

pub use analyzer::ChainingAnalyzer;
pub use types::{
    ChainedTripOpportunity, ChainingConstraints, ChainingDetails, ChainingError, ChainingKind,
    OpportunityId, OptimizationOutcome, OptimizationRequest, OptimizationSummary, RouteStop,
    RouteType, StopKind,
};
