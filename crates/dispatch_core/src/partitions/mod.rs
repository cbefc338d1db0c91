//! Typed accessors for the three independently-owned data partitions.
//!
//! - **Hospital partition**: facilities and transport requests.
//! - **EMS partition**: agencies with eagerly loaded units and availability.
//! - **Center partition**: administrative agency registry.
//!
//! No cross-partition joins exist. A record in one partition references a
//! record in another only through a plain id (or the stable `external_ref`
//! for agencies), resolved by a second lookup against the owning partition's
//! accessor. Accessors are trait objects so callers can swap the in-memory
//! stores used by tests and benchmarks for real backends.

pub mod memory;
pub mod reconcile;

pub use memory::{InMemoryCenterPartition, InMemoryEmsPartition, InMemoryHospitalPartition};

use crate::model::{
    AgencyId, AgencyRegistration, Facility, FacilityId, Priority, TimeWindow, TransportAgency,
    TransportLevel, TransportRequest,
};

/// Errors encountered while querying a partition.
#[derive(Debug)]
pub enum PartitionError {
    /// The partition could not be reached at all.
    Unavailable(String),
    /// The partition answered but the query itself failed.
    Query(String),
}

impl std::fmt::Display for PartitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PartitionError::Unavailable(detail) => write!(f, "partition unavailable: {detail}"),
            PartitionError::Query(detail) => write!(f, "partition query failed: {detail}"),
        }
    }
}

impl std::error::Error for PartitionError {}

/// Filter for [`HospitalPartition::pending_requests`].
#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    pub levels: Option<Vec<TransportLevel>>,
    pub priorities: Option<Vec<Priority>>,
    pub assigned_agency: Option<AgencyId>,
}

impl RequestFilter {
    pub fn matches(&self, request: &TransportRequest) -> bool {
        if let Some(levels) = &self.levels {
            if !levels.contains(&request.level) {
                return false;
            }
        }
        if let Some(priorities) = &self.priorities {
            if !priorities.contains(&request.priority) {
                return false;
            }
        }
        if let Some(agency) = self.assigned_agency {
            if request.assigned_agency != Some(agency) {
                return false;
            }
        }
        true
    }
}

/// Filter for [`EmsPartition::agencies_with_units`].
#[derive(Debug, Clone)]
pub struct AgencyFilter {
    /// Only active agencies. Always on for matching paths.
    pub active_only: bool,
    /// Require at least one active unit of this capability.
    pub capability: Option<TransportLevel>,
    /// Additionally require that capability unit to be AVAILABLE right now.
    pub available_only: bool,
}

impl AgencyFilter {
    /// All active agencies, regardless of fleet composition.
    pub fn active() -> Self {
        Self {
            active_only: true,
            capability: None,
            available_only: false,
        }
    }

    /// Active agencies exposing an AVAILABLE unit of the given capability.
    pub fn available_capability(level: TransportLevel) -> Self {
        Self {
            active_only: true,
            capability: Some(level),
            available_only: true,
        }
    }

    pub fn matches(&self, agency: &TransportAgency) -> bool {
        if self.active_only && !agency.active {
            return false;
        }
        match self.capability {
            None => true,
            Some(level) => {
                if self.available_only {
                    agency.first_available_unit(level).is_some()
                } else {
                    agency.has_capability(level)
                }
            }
        }
    }
}

/// Accessor for the Hospital partition.
pub trait HospitalPartition: Send + Sync {
    /// Look up one facility by id.
    fn facility(&self, id: FacilityId) -> Result<Option<Facility>, PartitionError>;

    /// All open (PENDING/SCHEDULED) requests whose requested pickup time falls
    /// inside `window`, narrowed by `filter`.
    fn pending_requests(
        &self,
        window: TimeWindow,
        filter: &RequestFilter,
    ) -> Result<Vec<TransportRequest>, PartitionError>;
}

/// Accessor for the EMS partition. Agencies arrive with units and
/// availability eagerly loaded; there is no separate unit lookup.
pub trait EmsPartition: Send + Sync {
    fn agencies_with_units(
        &self,
        filter: &AgencyFilter,
    ) -> Result<Vec<TransportAgency>, PartitionError>;
}

/// Accessor for the Center partition's administrative registry.
pub trait CenterPartition: Send + Sync {
    /// Look up the registration for a stable cross-partition `external_ref`.
    fn registration_by_ref(
        &self,
        external_ref: &str,
    ) -> Result<Option<AgencyRegistration>, PartitionError>;
}
