//! In-memory partition stores.
//!
//! These back the scenario generator, benchmarks and tests. Each store owns
//! its partition's records outright, mirroring the no-cross-partition-join
//! discipline: an `InMemoryHospitalPartition` knows nothing about agencies,
//! and an `InMemoryEmsPartition` nothing about facilities.

use std::collections::HashMap;

use crate::model::{
    AgencyRegistration, Facility, FacilityId, TimeWindow, TransportAgency, TransportRequest,
};

use super::{
    AgencyFilter, CenterPartition, EmsPartition, HospitalPartition, PartitionError, RequestFilter,
};

/// Facilities and transport requests.
#[derive(Debug, Default)]
pub struct InMemoryHospitalPartition {
    facilities: HashMap<FacilityId, Facility>,
    requests: Vec<TransportRequest>,
}

impl InMemoryHospitalPartition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_facility(&mut self, facility: Facility) {
        self.facilities.insert(facility.id, facility);
    }

    pub fn insert_request(&mut self, request: TransportRequest) {
        self.requests.push(request);
    }

    pub fn request_count(&self) -> usize {
        self.requests.len()
    }

    pub fn facility_count(&self) -> usize {
        self.facilities.len()
    }
}

impl HospitalPartition for InMemoryHospitalPartition {
    fn facility(&self, id: FacilityId) -> Result<Option<Facility>, PartitionError> {
        Ok(self.facilities.get(&id).cloned())
    }

    fn pending_requests(
        &self,
        window: TimeWindow,
        filter: &RequestFilter,
    ) -> Result<Vec<TransportRequest>, PartitionError> {
        Ok(self
            .requests
            .iter()
            .filter(|request| request.is_open())
            .filter(|request| window.contains(request.pickup_time_ms()))
            .filter(|request| filter.matches(request))
            .cloned()
            .collect())
    }
}

/// Agencies with their units.
#[derive(Debug, Default)]
pub struct InMemoryEmsPartition {
    agencies: Vec<TransportAgency>,
}

impl InMemoryEmsPartition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_agency(&mut self, agency: TransportAgency) {
        self.agencies.push(agency);
    }

    pub fn agency_count(&self) -> usize {
        self.agencies.len()
    }
}

impl EmsPartition for InMemoryEmsPartition {
    fn agencies_with_units(
        &self,
        filter: &AgencyFilter,
    ) -> Result<Vec<TransportAgency>, PartitionError> {
        Ok(self
            .agencies
            .iter()
            .filter(|agency| filter.matches(agency))
            .cloned()
            .collect())
    }
}

/// Administrative registry keyed by the stable cross-partition ref.
#[derive(Debug, Default)]
pub struct InMemoryCenterPartition {
    registrations: HashMap<String, AgencyRegistration>,
}

impl InMemoryCenterPartition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_registration(&mut self, registration: AgencyRegistration) {
        self.registrations
            .insert(registration.external_ref.clone(), registration);
    }
}

impl CenterPartition for InMemoryCenterPartition {
    fn registration_by_ref(
        &self,
        external_ref: &str,
    ) -> Result<Option<AgencyRegistration>, PartitionError> {
        Ok(self.registrations.get(external_ref).cloned())
    }
}
