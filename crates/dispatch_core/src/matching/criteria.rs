//! Matching criteria and their validation.

use serde::{Deserialize, Serialize};

use crate::model::{FacilityId, Priority, TimeWindow, TransportLevel, TransportRequest};

/// What a ranking call is looking for. Usually derived from a request via
/// [`MatchCriteria::for_request`], but callers can assemble one directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCriteria {
    pub transport_level: TransportLevel,
    pub origin_facility: FacilityId,
    pub destination_facility: FacilityId,
    pub priority: Priority,
    pub special_requirements: Option<String>,
    pub estimated_distance_miles: Option<f64>,
    pub time_window: Option<TimeWindow>,
}

impl MatchCriteria {
    pub fn new(
        transport_level: TransportLevel,
        origin_facility: FacilityId,
        destination_facility: FacilityId,
        priority: Priority,
    ) -> Self {
        Self {
            transport_level,
            origin_facility,
            destination_facility,
            priority,
            special_requirements: None,
            estimated_distance_miles: None,
            time_window: None,
        }
    }

    /// Derive criteria from a stored request.
    pub fn for_request(request: &TransportRequest) -> Self {
        Self {
            transport_level: request.level,
            origin_facility: request.origin_facility,
            destination_facility: request.destination_facility,
            priority: request.priority,
            special_requirements: request.special_requirements.clone(),
            estimated_distance_miles: request.estimated_distance_miles,
            time_window: Some(request.window),
        }
    }

    pub fn with_special_requirements(mut self, requirements: impl Into<String>) -> Self {
        self.special_requirements = Some(requirements.into());
        self
    }

    pub fn with_estimated_distance(mut self, miles: f64) -> Self {
        self.estimated_distance_miles = Some(miles);
        self
    }

    pub fn with_time_window(mut self, window: TimeWindow) -> Self {
        self.time_window = Some(window);
        self
    }

    /// Reject malformed criteria before any scoring happens.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.origin_facility == self.destination_facility {
            return Err(ValidationError::SameEndpoints(self.origin_facility));
        }
        if let Some(window) = &self.time_window {
            if !window.is_valid() {
                return Err(ValidationError::InvertedTimeWindow {
                    earliest_ms: window.earliest_ms,
                    latest_ms: window.latest_ms,
                });
            }
        }
        if let Some(distance) = self.estimated_distance_miles {
            if !distance.is_finite() || distance < 0.0 {
                return Err(ValidationError::InvalidDistance(distance));
            }
        }
        Ok(())
    }
}

/// Criteria rejected before scoring.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Origin and destination facility must differ.
    SameEndpoints(FacilityId),
    InvertedTimeWindow { earliest_ms: u64, latest_ms: u64 },
    InvalidDistance(f64),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::SameEndpoints(id) => {
                write!(f, "origin and destination are the same facility ({})", id.0)
            }
            ValidationError::InvertedTimeWindow {
                earliest_ms,
                latest_ms,
            } => write!(
                f,
                "time window is inverted ({earliest_ms} > {latest_ms})"
            ),
            ValidationError::InvalidDistance(distance) => {
                write!(f, "estimated distance is not a valid mileage: {distance}")
            }
        }
    }
}

impl std::error::Error for ValidationError {}
