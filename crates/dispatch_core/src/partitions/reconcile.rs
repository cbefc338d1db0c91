//! Cross-partition identity reconciliation for agencies.
//!
//! The EMS and Center partitions hold independent rows for the same
//! organisation with no foreign key between them. The EMS record is the
//! system of record for matching; the Center registration is administrative
//! metadata. The two are linked only through the stable `external_ref`
//! assigned at creation time — reconciliation never matches by name or email.

use crate::model::{RegistrationStatus, TransportAgency};
use crate::partitions::CenterPartition;

/// Outcome of resolving an EMS agency against the Center registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationCheck {
    /// A registration exists and is active.
    Registered,
    /// A registration exists and is administratively suspended.
    Suspended,
    /// No registration found, or the Center partition could not answer.
    /// Unknown never excludes an agency from matching.
    Unknown,
}

/// Resolve `agency` to its Center registration through `external_ref`.
///
/// Center lookup failures map to `Unknown`: the registry being down must not
/// block dispatch against the EMS system of record.
pub fn registration_check(
    agency: &TransportAgency,
    center: &dyn CenterPartition,
) -> RegistrationCheck {
    match center.registration_by_ref(&agency.external_ref) {
        Ok(Some(registration)) => match registration.status {
            RegistrationStatus::Active => RegistrationCheck::Registered,
            RegistrationStatus::Suspended => RegistrationCheck::Suspended,
        },
        Ok(None) => RegistrationCheck::Unknown,
        Err(_) => RegistrationCheck::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AgencyId, AgencyRegistration, CenterAgencyId};
    use crate::partitions::{InMemoryCenterPartition, PartitionError};

    fn agency(external_ref: &str) -> TransportAgency {
        TransportAgency {
            id: AgencyId(7),
            external_ref: external_ref.into(),
            name: "Valley Medical Transport".into(),
            contact_email: "ops@valley-mt.example".into(),
            active: true,
            service_area: None,
            operating_window: None,
            units: Vec::new(),
        }
    }

    #[test]
    fn resolves_active_and_suspended_registrations() {
        let mut center = InMemoryCenterPartition::new();
        center.insert_registration(AgencyRegistration {
            id: CenterAgencyId(1),
            external_ref: "ems-007".into(),
            name: "Valley Medical Transport".into(),
            contact_email: "ops@valley-mt.example".into(),
            status: RegistrationStatus::Active,
        });
        center.insert_registration(AgencyRegistration {
            id: CenterAgencyId(2),
            external_ref: "ems-008".into(),
            name: "Northside EMS".into(),
            contact_email: "ops@northside.example".into(),
            status: RegistrationStatus::Suspended,
        });

        assert_eq!(
            registration_check(&agency("ems-007"), &center),
            RegistrationCheck::Registered
        );
        assert_eq!(
            registration_check(&agency("ems-008"), &center),
            RegistrationCheck::Suspended
        );
        assert_eq!(
            registration_check(&agency("ems-999"), &center),
            RegistrationCheck::Unknown
        );
    }

    #[test]
    fn center_failure_maps_to_unknown() {
        struct DownCenter;
        impl CenterPartition for DownCenter {
            fn registration_by_ref(
                &self,
                _external_ref: &str,
            ) -> Result<Option<AgencyRegistration>, PartitionError> {
                Err(PartitionError::Unavailable("registry offline".into()))
            }
        }

        assert_eq!(
            registration_check(&agency("ems-007"), &DownCenter),
            RegistrationCheck::Unknown
        );
    }
}
