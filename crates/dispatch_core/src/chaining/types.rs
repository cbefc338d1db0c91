//! Route-chaining request/response types.

use h3o::CellIndex;
use serde::{Deserialize, Serialize};

use crate::model::{cell_serde, AgencyId, FacilityId, Priority, RequestId, TimeWindow, TransportLevel};
use crate::partitions::PartitionError;

/// Identifier of a chained-route opportunity, unique within one analysis run.
/// Opportunities are derived output, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OpportunityId(pub u64);

/// Route shape of an opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteType {
    ChainedTrips,
    ReturnTrip,
    MultiStop,
    Temporal,
}

impl RouteType {
    /// Uppercase wire/export label.
    pub fn label(self) -> &'static str {
        match self {
            RouteType::ChainedTrips => "CHAINED_TRIPS",
            RouteType::ReturnTrip => "RETURN_TRIP",
            RouteType::MultiStop => "MULTI_STOP",
            RouteType::Temporal => "TEMPORAL",
        }
    }
}

/// Which proximity criterion dominated the grouping decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainingKind {
    /// Pickup times fall within a short window of each other.
    Temporal,
    /// Origin/destination regions overlap without a tighter relationship.
    Spatial,
    /// The second trip runs the first one in reverse.
    ReturnTrip,
    /// Three or more requests chained.
    MultiStop,
}

impl ChainingKind {
    /// Uppercase wire/export label.
    pub fn label(self) -> &'static str {
        match self {
            ChainingKind::Temporal => "TEMPORAL",
            ChainingKind::Spatial => "SPATIAL",
            ChainingKind::ReturnTrip => "RETURN_TRIP",
            ChainingKind::MultiStop => "MULTI_STOP",
        }
    }

    pub fn route_type(self) -> RouteType {
        match self {
            ChainingKind::Temporal => RouteType::Temporal,
            ChainingKind::Spatial => RouteType::ChainedTrips,
            ChainingKind::ReturnTrip => RouteType::ReturnTrip,
            ChainingKind::MultiStop => RouteType::MultiStop,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopKind {
    Pickup,
    Dropoff,
}

/// One stop on a chained route. Stops are strictly sequential: a request's
/// dropoff always precedes the next request's pickup, so one unit never
/// carries two patients at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStop {
    pub request: RequestId,
    pub facility: FacilityId,
    #[serde(with = "cell_serde")]
    pub cell: CellIndex,
    pub kind: StopKind,
}

/// How the grouping was made, for auditing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainingDetails {
    pub kind: ChainingKind,
    /// Total empty-vehicle miles between consecutive requests.
    pub deadhead_miles: f64,
}

/// A proposed grouping of two or more requests into one multi-stop route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainedTripOpportunity {
    pub id: OpportunityId,
    pub route_type: RouteType,
    /// At least two distinct requests, in visit order.
    pub requests: Vec<RequestId>,
    pub stops: Vec<RouteStop>,
    pub total_distance_miles: f64,
    pub total_time_secs: f64,
    /// Reduction versus running the requests as independent single trips,
    /// floored at zero.
    pub miles_saved: f64,
    /// `ceil(miles_saved / 50)`: miles saved large enough to free one whole
    /// vehicle-shift.
    pub units_saved: u32,
    pub revenue_potential: u64,
    pub revenue_increase: u64,
    /// `min(100, max(0, miles_saved / baseline × 100))`.
    pub optimization_score: f64,
    /// Envelope of the member requests' pickup windows.
    pub window: TimeWindow,
    pub temporal_efficiency: f64,
    pub geographic_efficiency: f64,
    pub chaining: ChainingDetails,
}

/// Grouping constraints. The connection budget a single deadhead leg may
/// consume is derived from the total duration budget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChainingConstraints {
    /// Maximum number of route stops (two per request).
    pub max_stops: usize,
    /// Total duration budget for a chained route, in minutes.
    pub max_duration_mins: u64,
    /// Maximum single deadhead leg, in miles.
    pub max_deadhead_miles: f64,
}

impl Default for ChainingConstraints {
    fn default() -> Self {
        Self {
            max_stops: 8,
            max_duration_mins: 240,
            max_deadhead_miles: 25.0,
        }
    }
}

impl ChainingConstraints {
    pub fn with_max_stops(mut self, max_stops: usize) -> Self {
        self.max_stops = max_stops;
        self
    }

    pub fn with_max_duration_mins(mut self, minutes: u64) -> Self {
        self.max_duration_mins = minutes;
        self
    }

    pub fn with_max_deadhead_miles(mut self, miles: f64) -> Self {
        self.max_deadhead_miles = miles;
        self
    }

    pub fn max_duration_secs(&self) -> f64 {
        (self.max_duration_mins * 60) as f64
    }

    /// One connecting leg may consume at most a quarter of the duration
    /// budget.
    pub fn connection_budget_secs(&self) -> f64 {
        self.max_duration_secs() / 4.0
    }
}

/// Input to [`crate::chaining::ChainingAnalyzer::optimize_routes`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationRequest {
    pub window: TimeWindow,
    /// Skip requests whose own leg exceeds this mileage.
    pub max_distance_miles: Option<f64>,
    pub transport_levels: Option<Vec<TransportLevel>>,
    pub priorities: Option<Vec<Priority>>,
    pub agency: Option<AgencyId>,
    pub constraints: ChainingConstraints,
}

impl OptimizationRequest {
    pub fn new(window: TimeWindow) -> Self {
        Self {
            window,
            max_distance_miles: None,
            transport_levels: None,
            priorities: None,
            agency: None,
            constraints: ChainingConstraints::default(),
        }
    }

    pub fn with_constraints(mut self, constraints: ChainingConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_max_distance(mut self, miles: f64) -> Self {
        self.max_distance_miles = Some(miles);
        self
    }

    pub fn with_transport_levels(mut self, levels: Vec<TransportLevel>) -> Self {
        self.transport_levels = Some(levels);
        self
    }

    pub fn with_priorities(mut self, priorities: Vec<Priority>) -> Self {
        self.priorities = Some(priorities);
        self
    }

    pub fn with_agency(mut self, agency: AgencyId) -> Self {
        self.agency = Some(agency);
        self
    }
}

/// Aggregates over one analysis run. "Zero opportunities" is a normal
/// outcome, reported here rather than as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationSummary {
    pub window: TimeWindow,
    pub requests_considered: usize,
    pub requests_chained: usize,
    pub opportunity_count: usize,
    pub total_miles_saved: f64,
    pub total_units_saved: u32,
    pub total_revenue_increase: u64,
    pub mean_optimization_score: f64,
}

/// Full analyzer output. Opportunities are in discovery order; callers
/// wanting best-first sort by `optimization_score` themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationOutcome {
    pub opportunities: Vec<ChainedTripOpportunity>,
    pub recommendations: Vec<String>,
    pub summary: OptimizationSummary,
}

/// Chaining failures are hard errors; there is no safe degraded output on
/// this path.
#[derive(Debug)]
pub enum ChainingError {
    Partition(PartitionError),
    InvalidWindow { earliest_ms: u64, latest_ms: u64 },
}

impl std::fmt::Display for ChainingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChainingError::Partition(err) => write!(f, "partition access failed: {err}"),
            ChainingError::InvalidWindow {
                earliest_ms,
                latest_ms,
            } => write!(f, "invalid analysis window ({earliest_ms} > {latest_ms})"),
        }
    }
}

impl std::error::Error for ChainingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChainingError::Partition(err) => Some(err),
            ChainingError::InvalidWindow { .. } => None,
        }
    }
}

impl From<PartitionError> for ChainingError {
    fn from(err: PartitionError) -> Self {
        ChainingError::Partition(err)
    }
}
