//! Partition doubles for failure-path tests.

use dispatch_core::model::{AgencyRegistration, Facility, FacilityId, TimeWindow, TransportAgency, TransportRequest};
use dispatch_core::partitions::{
    AgencyFilter, CenterPartition, EmsPartition, HospitalPartition, PartitionError, RequestFilter,
};

/// EMS partition that always fails, as during a partition outage.
pub struct FailingEmsPartition;

impl EmsPartition for FailingEmsPartition {
    fn agencies_with_units(
        &self,
        _filter: &AgencyFilter,
    ) -> Result<Vec<TransportAgency>, PartitionError> {
        Err(PartitionError::Unavailable("ems partition offline".into()))
    }
}

/// Hospital partition that always fails.
pub struct FailingHospitalPartition;

impl HospitalPartition for FailingHospitalPartition {
    fn facility(&self, _id: FacilityId) -> Result<Option<Facility>, PartitionError> {
        Err(PartitionError::Unavailable(
            "hospital partition offline".into(),
        ))
    }

    fn pending_requests(
        &self,
        _window: TimeWindow,
        _filter: &RequestFilter,
    ) -> Result<Vec<TransportRequest>, PartitionError> {
        Err(PartitionError::Unavailable(
            "hospital partition offline".into(),
        ))
    }
}

/// Center partition that always fails.
pub struct FailingCenterPartition;

impl CenterPartition for FailingCenterPartition {
    fn registration_by_ref(
        &self,
        _external_ref: &str,
    ) -> Result<Option<AgencyRegistration>, PartitionError> {
        Err(PartitionError::Unavailable("center partition offline".into()))
    }
}
