//! Domain model shared by the matching and chaining engines.
//!
//! All records are plain owned data: agencies arrive from the EMS partition
//! with their units and availability eagerly loaded, requests and facilities
//! from the Hospital partition, registrations from the Center partition.
//! Cross-partition references are plain ids resolved by a second lookup; there
//! are no cross-partition links inside the model itself.

use h3o::CellIndex;
use serde::{Deserialize, Serialize};

/// Serde helper: serialize a `CellIndex` as its raw `u64`.
pub mod cell_serde {
    use h3o::CellIndex;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(cell: &CellIndex, ser: S) -> Result<S::Ok, S::Error> {
        u64::from(*cell).serialize(ser)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<CellIndex, D::Error> {
        let raw = u64::deserialize(de)?;
        CellIndex::try_from(raw).map_err(serde::de::Error::custom)
    }
}

/// Serde helper: serialize an `Option<CellIndex>` as `Option<u64>`.
pub mod cell_opt_serde {
    use h3o::CellIndex;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(cell: &Option<CellIndex>, ser: S) -> Result<S::Ok, S::Error> {
        cell.map(u64::from).serialize(ser)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Option<CellIndex>, D::Error> {
        match Option::<u64>::deserialize(de)? {
            Some(raw) => CellIndex::try_from(raw)
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

macro_rules! id_newtype {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(pub u64);
    };
}

id_newtype!(
    /// Identifier of a healthcare facility (Hospital partition).
    FacilityId
);
id_newtype!(
    /// Identifier of a transport request (Hospital partition).
    RequestId
);
id_newtype!(
    /// Identifier of a transport agency (EMS partition).
    AgencyId
);
id_newtype!(
    /// Identifier of a vehicle (EMS partition).
    UnitId
);
id_newtype!(
    /// Identifier of an administrative agency registration (Center partition).
    CenterAgencyId
);

/// Clinical capability level of a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransportLevel {
    /// Basic life support.
    Bls,
    /// Advanced life support.
    Als,
    /// Critical care transport.
    Cct,
}

impl TransportLevel {
    /// Short uppercase label used in scoring reasons and exports.
    pub fn label(self) -> &'static str {
        match self {
            TransportLevel::Bls => "BLS",
            TransportLevel::Als => "ALS",
            TransportLevel::Cct => "CCT",
        }
    }
}

/// Request urgency. Variant order is ranking order: `Low < Urgent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
            Priority::Urgent => "URGENT",
        }
    }
}

/// Lifecycle state of a transport request. Requests are immutable once
/// `Completed` or `Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    Pending,
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

/// Current availability of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AvailabilityStatus {
    Available,
    InUse,
    OutOfService,
}

/// Inclusive time window in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub earliest_ms: u64,
    pub latest_ms: u64,
}

impl TimeWindow {
    pub fn new(earliest_ms: u64, latest_ms: u64) -> Self {
        Self {
            earliest_ms,
            latest_ms,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.earliest_ms <= self.latest_ms
    }

    pub fn contains(&self, instant_ms: u64) -> bool {
        instant_ms >= self.earliest_ms && instant_ms <= self.latest_ms
    }

    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.earliest_ms <= other.latest_ms && other.earliest_ms <= self.latest_ms
    }
}

/// A healthcare facility. Owned by the Hospital partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub id: FacilityId,
    pub name: String,
    #[serde(with = "cell_serde")]
    pub cell: CellIndex,
}

/// One patient move. Owned by the Hospital partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportRequest {
    pub id: RequestId,
    pub origin_facility: FacilityId,
    pub destination_facility: FacilityId,
    pub level: TransportLevel,
    pub priority: Priority,
    pub special_requirements: Option<String>,
    pub estimated_distance_miles: Option<f64>,
    /// Requested pickup window; `earliest_ms` is the requested pickup time.
    pub window: TimeWindow,
    pub status: RequestStatus,
    /// Agency that accepted the request, once `Scheduled`.
    pub assigned_agency: Option<AgencyId>,
}

impl TransportRequest {
    /// Pending and scheduled requests are the chaining analyzer's input pool.
    pub fn is_open(&self) -> bool {
        matches!(self.status, RequestStatus::Pending | RequestStatus::Scheduled)
    }

    /// Requested pickup time (window start).
    pub fn pickup_time_ms(&self) -> u64 {
        self.window.earliest_ms
    }
}

/// Declared coverage of an agency: every cell within `radius_cells` grid
/// distance of `center`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServiceArea {
    #[serde(with = "cell_serde")]
    pub center: CellIndex,
    pub radius_cells: u32,
}

impl ServiceArea {
    pub fn contains(&self, cell: CellIndex) -> bool {
        self.center
            .grid_distance(cell)
            .map(|d| d >= 0 && d <= self.radius_cells as i32)
            .unwrap_or(false)
    }
}

/// Availability record attached to a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitAvailability {
    pub status: AvailabilityStatus,
    #[serde(with = "cell_opt_serde")]
    pub cell: Option<CellIndex>,
    pub shift: Option<TimeWindow>,
}

impl UnitAvailability {
    /// Sentinel returned when an agency has no available unit of the required
    /// capability. Scoring still proceeds; callers expect one result per
    /// eligible agency.
    pub fn out_of_service() -> Self {
        Self {
            status: AvailabilityStatus::OutOfService,
            cell: None,
            shift: None,
        }
    }
}

/// A vehicle belonging to an agency. Owned by the EMS partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportUnit {
    pub id: UnitId,
    pub agency: AgencyId,
    pub capability: TransportLevel,
    pub active: bool,
    pub availability: UnitAvailability,
}

/// A service provider with eagerly loaded units. Owned by the EMS partition;
/// the Center partition holds a separate administrative registration for the
/// same organisation, linked only through `external_ref`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportAgency {
    pub id: AgencyId,
    /// Stable cross-partition identity; shared with the Center registration.
    pub external_ref: String,
    pub name: String,
    pub contact_email: String,
    pub active: bool,
    pub service_area: Option<ServiceArea>,
    /// Declared operating window, when known.
    pub operating_window: Option<TimeWindow>,
    pub units: Vec<TransportUnit>,
}

impl TransportAgency {
    pub fn active_units(&self) -> impl Iterator<Item = &TransportUnit> {
        self.units.iter().filter(|unit| unit.active)
    }

    /// Whether any active unit carries the given capability.
    pub fn has_capability(&self, level: TransportLevel) -> bool {
        self.active_units().any(|unit| unit.capability == level)
    }

    /// First active unit of the given capability with an AVAILABLE record.
    pub fn first_available_unit(&self, level: TransportLevel) -> Option<&TransportUnit> {
        self.active_units().find(|unit| {
            unit.capability == level && unit.availability.status == AvailabilityStatus::Available
        })
    }
}

/// Administrative state of a Center-partition registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationStatus {
    Active,
    Suspended,
}

/// Administrative registration of an agency. Owned by the Center partition;
/// a distinct row from the EMS agency record for the same organisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgencyRegistration {
    pub id: CenterAgencyId,
    pub external_ref: String,
    pub name: String,
    pub contact_email: String,
    pub status: RegistrationStatus,
}
