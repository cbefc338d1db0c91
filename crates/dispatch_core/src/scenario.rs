//! Scenario setup: seed the in-memory partitions with facilities, agencies
//! and pending requests.
//!
//! Uses a geographic bounding box to sample random H3 cells (resolution 9)
//! and spreads request pickup times over a configurable window. Feeds the
//! benchmarks and integration tests with reproducible pools.

use h3o::{CellIndex, LatLng};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::model::{
    AgencyId, AgencyRegistration, AvailabilityStatus, CenterAgencyId, Facility, FacilityId,
    Priority, RegistrationStatus, RequestId, RequestStatus, ServiceArea, TimeWindow,
    TransportAgency, TransportLevel, TransportRequest, TransportUnit, UnitAvailability, UnitId,
};
use crate::partitions::{
    InMemoryCenterPartition, InMemoryEmsPartition, InMemoryHospitalPartition,
};
use crate::spatial::{distance_miles_between_cells, GeoIndex};

/// Default bounding box: San Francisco Bay Area (approx).
const DEFAULT_LAT_MIN: f64 = 37.6;
const DEFAULT_LAT_MAX: f64 = 37.85;
const DEFAULT_LNG_MIN: f64 = -122.55;
const DEFAULT_LNG_MAX: f64 = -122.35;

/// Default pickup window: 6 hours of epoch-relative milliseconds.
const DEFAULT_REQUEST_WINDOW_MS: u64 = 6 * 60 * 60 * 1000;

/// Parameters for building a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioParams {
    pub num_facilities: usize,
    pub num_agencies: usize,
    /// Units per agency are sampled uniformly in `1..=max_units_per_agency`.
    pub max_units_per_agency: usize,
    pub num_requests: usize,
    /// Random seed for reproducibility (optional; if None, uses thread rng).
    pub seed: Option<u64>,
    /// Bounding box for random positions (lat/lng degrees).
    pub lat_min: f64,
    pub lat_max: f64,
    pub lng_min: f64,
    pub lng_max: f64,
    /// Pickup times are uniform in `[0, request_window_ms]`.
    pub request_window_ms: u64,
}

impl Default for ScenarioParams {
    fn default() -> Self {
        Self {
            num_facilities: 12,
            num_agencies: 6,
            max_units_per_agency: 3,
            num_requests: 40,
            seed: None,
            lat_min: DEFAULT_LAT_MIN,
            lat_max: DEFAULT_LAT_MAX,
            lng_min: DEFAULT_LNG_MIN,
            lng_max: DEFAULT_LNG_MAX,
            request_window_ms: DEFAULT_REQUEST_WINDOW_MS,
        }
    }
}

impl ScenarioParams {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the pickup window in hours.
    pub fn with_request_window_hours(mut self, hours: u64) -> Self {
        self.request_window_ms = hours * 60 * 60 * 1000;
        self
    }

    pub fn with_pool_sizes(
        mut self,
        num_facilities: usize,
        num_agencies: usize,
        num_requests: usize,
    ) -> Self {
        self.num_facilities = num_facilities;
        self.num_agencies = num_agencies;
        self.num_requests = num_requests;
        self
    }
}

/// The three seeded partitions.
pub struct DispatchScenario {
    pub hospital: InMemoryHospitalPartition,
    pub ems: InMemoryEmsPartition,
    pub center: InMemoryCenterPartition,
}

/// Sample a random H3 cell (default resolution) within the given lat/lng
/// bounds.
fn random_cell_in_bounds<R: Rng>(
    rng: &mut R,
    lat_min: f64,
    lat_max: f64,
    lng_min: f64,
    lng_max: f64,
) -> CellIndex {
    let lat = rng.gen_range(lat_min..=lat_max);
    let lng = rng.gen_range(lng_min..=lng_max);
    let coord = LatLng::new(lat, lng).expect("valid lat/lng");
    coord.to_cell(GeoIndex::default().resolution())
}

fn random_level<R: Rng>(rng: &mut R) -> TransportLevel {
    match rng.gen_range(0..3) {
        0 => TransportLevel::Bls,
        1 => TransportLevel::Als,
        _ => TransportLevel::Cct,
    }
}

fn random_priority<R: Rng>(rng: &mut R) -> Priority {
    match rng.gen_range(0..4) {
        0 => Priority::Low,
        1 => Priority::Medium,
        2 => Priority::High,
        _ => Priority::Urgent,
    }
}

fn random_availability<R: Rng>(rng: &mut R, cell: CellIndex) -> UnitAvailability {
    let status = match rng.gen_range(0..5) {
        0 => AvailabilityStatus::InUse,
        1 => AvailabilityStatus::OutOfService,
        _ => AvailabilityStatus::Available,
    };
    UnitAvailability {
        status,
        cell: Some(cell),
        shift: None,
    }
}

/// Populate the three partitions from `params`.
///
/// Every agency gets an active Center registration keyed by its
/// `external_ref`; tests exercising suspensions overwrite individual
/// registrations afterwards.
pub fn build_scenario(params: ScenarioParams) -> DispatchScenario {
    let mut rng: StdRng = match params.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut hospital = InMemoryHospitalPartition::new();
    let mut ems = InMemoryEmsPartition::new();
    let mut center = InMemoryCenterPartition::new();

    let mut facility_cells = Vec::with_capacity(params.num_facilities);
    for index in 0..params.num_facilities {
        let cell = random_cell_in_bounds(
            &mut rng,
            params.lat_min,
            params.lat_max,
            params.lng_min,
            params.lng_max,
        );
        facility_cells.push(cell);
        hospital.insert_facility(Facility {
            id: FacilityId(index as u64 + 1),
            name: format!("Facility {:02}", index + 1),
            cell,
        });
    }

    let mut next_unit_id = 1u64;
    for index in 0..params.num_agencies {
        let agency_id = AgencyId(index as u64 + 1);
        let external_ref = format!("ems-agency-{:03}", index + 1);
        let base_cell = random_cell_in_bounds(
            &mut rng,
            params.lat_min,
            params.lat_max,
            params.lng_min,
            params.lng_max,
        );

        let unit_count = rng.gen_range(1..=params.max_units_per_agency.max(1));
        let units = (0..unit_count)
            .map(|_| {
                let unit = TransportUnit {
                    id: UnitId(next_unit_id),
                    agency: agency_id,
                    capability: random_level(&mut rng),
                    active: true,
                    availability: random_availability(&mut rng, base_cell),
                };
                next_unit_id += 1;
                unit
            })
            .collect();

        ems.insert_agency(TransportAgency {
            id: agency_id,
            external_ref: external_ref.clone(),
            name: format!("Agency {:02}", index + 1),
            contact_email: format!("dispatch@agency-{:02}.example", index + 1),
            active: true,
            service_area: Some(ServiceArea {
                center: base_cell,
                radius_cells: rng.gen_range(20..120),
            }),
            operating_window: None,
            units,
        });

        center.insert_registration(AgencyRegistration {
            id: CenterAgencyId(index as u64 + 1),
            external_ref,
            name: format!("Agency {:02}", index + 1),
            contact_email: format!("dispatch@agency-{:02}.example", index + 1),
            status: RegistrationStatus::Active,
        });
    }

    for index in 0..params.num_requests {
        let origin_index = rng.gen_range(0..params.num_facilities);
        let mut destination_index = rng.gen_range(0..params.num_facilities);
        while destination_index == origin_index {
            destination_index = rng.gen_range(0..params.num_facilities);
        }
        let pickup_ms = rng.gen_range(0..=params.request_window_ms);
        let distance = distance_miles_between_cells(
            facility_cells[origin_index],
            facility_cells[destination_index],
        );

        hospital.insert_request(TransportRequest {
            id: RequestId(index as u64 + 1),
            origin_facility: FacilityId(origin_index as u64 + 1),
            destination_facility: FacilityId(destination_index as u64 + 1),
            level: random_level(&mut rng),
            priority: random_priority(&mut rng),
            special_requirements: None,
            estimated_distance_miles: Some(distance),
            window: TimeWindow::new(pickup_ms, pickup_ms + 2 * 60 * 60 * 1000),
            status: RequestStatus::Pending,
            assigned_agency: None,
        });
    }

    DispatchScenario {
        hospital,
        ems,
        center,
    }
}
