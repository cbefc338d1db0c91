//! Test helpers for common test setup and utilities.
//!
//! Shared across unit and integration tests to reduce duplication.

use h3o::CellIndex;

use crate::model::{
    AgencyId, AvailabilityStatus, Facility, FacilityId, ServiceArea, TransportAgency,
    TransportLevel, TransportUnit, UnitAvailability, UnitId,
};

/// A standard test cell used across test files for consistency
/// (San Francisco Bay Area).
pub const TEST_CELL: u64 = 0x8a1fb46622dffff;

/// Get the test cell as a `CellIndex`.
///
/// # Panics
///
/// Panics if the test cell constant is invalid (should never happen).
pub fn test_cell() -> CellIndex {
    CellIndex::try_from(TEST_CELL).expect("TEST_CELL should be a valid H3 cell")
}

/// Get a neighbor cell of the test cell.
///
/// # Panics
///
/// Panics if no neighbor can be found (should never happen with a valid
/// test cell).
pub fn test_neighbor_cell() -> CellIndex {
    test_cell()
        .grid_disk::<Vec<_>>(1)
        .into_iter()
        .find(|c| *c != test_cell())
        .expect("test cell should have neighbors")
}

/// A facility at the given cell.
pub fn test_facility(id: u64, cell: CellIndex) -> Facility {
    Facility {
        id: FacilityId(id),
        name: format!("Facility {id}"),
        cell,
    }
}

/// An active agency with one active, AVAILABLE unit of `level`, covering a
/// wide service area around the test cell.
pub fn test_agency_with_unit(id: u64, level: TransportLevel) -> TransportAgency {
    TransportAgency {
        id: AgencyId(id),
        external_ref: format!("ems-agency-{id:03}"),
        name: format!("Agency {id:02}"),
        contact_email: format!("dispatch@agency-{id:02}.example"),
        active: true,
        service_area: Some(ServiceArea {
            center: test_cell(),
            radius_cells: 100,
        }),
        operating_window: None,
        units: vec![TransportUnit {
            id: UnitId(id * 100),
            agency: AgencyId(id),
            capability: level,
            active: true,
            availability: UnitAvailability {
                status: AvailabilityStatus::Available,
                cell: Some(test_cell()),
                shift: None,
            },
        }],
    }
}

/// An active agency with no units at all.
pub fn test_agency_without_units(id: u64) -> TransportAgency {
    let mut agency = test_agency_with_unit(id, TransportLevel::Bls);
    agency.units.clear();
    agency
}
