//! Builders for facilities, agencies and requests used across integration
//! tests.

use dispatch_core::model::{
    AgencyId, AvailabilityStatus, Facility, FacilityId, Priority, RequestId, RequestStatus,
    ServiceArea, TimeWindow, TransportAgency, TransportLevel, TransportRequest, TransportUnit,
    UnitAvailability, UnitId,
};
use dispatch_core::test_helpers::test_cell;
use h3o::{LatLng, Resolution};

/// A facility pinned to explicit coordinates (resolution 9).
pub fn facility_at(id: u64, lat: f64, lng: f64) -> Facility {
    let cell = LatLng::new(lat, lng)
        .expect("valid lat/lng")
        .to_cell(Resolution::Nine);
    Facility {
        id: FacilityId(id),
        name: format!("Facility {id:02}"),
        cell,
    }
}

/// An active agency with one AVAILABLE unit per given capability, covering a
/// wide area around the shared test cell.
pub fn agency(id: u64, capabilities: &[TransportLevel]) -> TransportAgency {
    let units = capabilities
        .iter()
        .enumerate()
        .map(|(index, &capability)| TransportUnit {
            id: UnitId(id * 100 + index as u64),
            agency: AgencyId(id),
            capability,
            active: true,
            availability: UnitAvailability {
                status: AvailabilityStatus::Available,
                cell: Some(test_cell()),
                shift: None,
            },
        })
        .collect();
    TransportAgency {
        id: AgencyId(id),
        external_ref: format!("ems-agency-{id:03}"),
        name: format!("Agency {id:02}"),
        contact_email: format!("dispatch@agency-{id:02}.example"),
        active: true,
        service_area: Some(ServiceArea {
            center: test_cell(),
            radius_cells: 500,
        }),
        operating_window: None,
        units,
    }
}

/// A pending request between two facilities.
pub fn pending_request(
    id: u64,
    origin: &Facility,
    destination: &Facility,
    level: TransportLevel,
    priority: Priority,
    pickup_ms: u64,
) -> TransportRequest {
    TransportRequest {
        id: RequestId(id),
        origin_facility: origin.id,
        destination_facility: destination.id,
        level,
        priority,
        special_requirements: None,
        estimated_distance_miles: None,
        window: TimeWindow::new(pickup_ms, pickup_ms + 2 * 60 * 60 * 1000),
        status: RequestStatus::Pending,
        assigned_agency: None,
    }
}
