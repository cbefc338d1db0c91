//! Pluggable scoring predicates.
//!
//! The scorer never bakes coverage or capability knowledge into its point
//! model; it asks these strategies and treats a missing answer
//! conservatively. The default set reads only what the agency record itself
//! declares, returning `None` when the data is absent.

use crate::model::{Facility, TimeWindow, TransportAgency};

/// Whether an agency's service area covers a facility.
pub trait ServiceAreaPolicy: Send + Sync {
    /// `None` when coverage cannot be determined from available data. The
    /// scorer treats unknown as not covered.
    fn covers(&self, agency: &TransportAgency, facility: &Facility) -> Option<bool>;
}

/// Containment against the agency's declared [`crate::model::ServiceArea`].
pub struct DeclaredServiceArea;

impl ServiceAreaPolicy for DeclaredServiceArea {
    fn covers(&self, agency: &TransportAgency, facility: &Facility) -> Option<bool> {
        agency
            .service_area
            .as_ref()
            .map(|area| area.contains(facility.cell))
    }
}

/// Whether an agency supports a request's special requirements.
pub trait SpecialRequirementsPolicy: Send + Sync {
    fn supports(&self, agency: &TransportAgency, requirements: &str) -> bool;
}

/// No upstream data exists yet for per-agency special-requirement support, so
/// the default never grants the bonus.
pub struct NoDeclaredSupport;

impl SpecialRequirementsPolicy for NoDeclaredSupport {
    fn supports(&self, _agency: &TransportAgency, _requirements: &str) -> bool {
        false
    }
}

/// Whether an agency's operating hours cover a requested window.
pub trait OperatingHoursPolicy: Send + Sync {
    /// `None` when the agency declares no hours. The scorer treats unknown as
    /// compatible.
    fn covers_window(&self, agency: &TransportAgency, window: &TimeWindow) -> Option<bool>;
}

/// Overlap against the agency's declared operating window.
pub struct DeclaredOperatingWindow;

impl OperatingHoursPolicy for DeclaredOperatingWindow {
    fn covers_window(&self, agency: &TransportAgency, window: &TimeWindow) -> Option<bool> {
        agency
            .operating_window
            .as_ref()
            .map(|operating| operating.overlaps(window))
    }
}

/// The strategy set a [`crate::matching::CandidateScorer`] consults.
pub struct ScoringPolicies {
    pub service_area: Box<dyn ServiceAreaPolicy>,
    pub special_requirements: Box<dyn SpecialRequirementsPolicy>,
    pub operating_hours: Box<dyn OperatingHoursPolicy>,
}

impl Default for ScoringPolicies {
    fn default() -> Self {
        Self {
            service_area: Box::new(DeclaredServiceArea),
            special_requirements: Box::new(NoDeclaredSupport),
            operating_hours: Box::new(DeclaredOperatingWindow),
        }
    }
}
