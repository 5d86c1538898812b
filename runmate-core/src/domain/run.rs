use serde::{Deserialize, Serialize};

/// Matchmaking parameters supplied by the caller at join time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunParameters {
    /// Requested run duration
    duration_seconds: u32,
    /// Desired opponent gender (relay-defined code)
    gender_filter: u32,
    /// Lead time left before the run window closes
    lead_time_seconds: u32,
}

/// Errors raised while validating caller-supplied run values
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum RunParameterError {
    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: i64 },

    #[error("{field} is out of range (got {value})")]
    OutOfRange { field: &'static str, value: i64 },
}

impl RunParameters {
    /// Validate and build run parameters
    pub fn new(
        duration_seconds: i64,
        gender_filter: i64,
        lead_time_seconds: i64,
    ) -> Result<Self, RunParameterError> {
        Ok(Self {
            duration_seconds: non_negative("duration_seconds", duration_seconds)?,
            gender_filter: non_negative("gender_filter", gender_filter)?,
            lead_time_seconds: non_negative("lead_time_seconds", lead_time_seconds)?,
        })
    }

    /// Build from a duration in whole minutes (what the run picker offers)
    pub fn from_minutes(
        minutes: i64,
        gender_filter: i64,
        lead_time_seconds: i64,
    ) -> Result<Self, RunParameterError> {
        let seconds = minutes
            .checked_mul(60)
            .ok_or(RunParameterError::OutOfRange {
                field: "duration_seconds",
                value: minutes,
            })?;
        Self::new(seconds, gender_filter, lead_time_seconds)
    }

    pub fn duration_seconds(&self) -> u32 {
        self.duration_seconds
    }

    pub fn gender_filter(&self) -> u32 {
        self.gender_filter
    }

    pub fn lead_time_seconds(&self) -> u32 {
        self.lead_time_seconds
    }
}

fn non_negative(field: &'static str, value: i64) -> Result<u32, RunParameterError> {
    if value < 0 {
        return Err(RunParameterError::Negative { field, value });
    }
    u32::try_from(value).map_err(|_| RunParameterError::OutOfRange { field, value })
}

/// A single GPS fix along the run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Local run result reported when stopping early or finishing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub distance_meters: u32,
    pub elapsed_seconds: u32,
    #[serde(default)]
    pub coordinates: Vec<Coordinate>,
}

impl RunReport {
    pub fn new(distance_meters: u32, elapsed_seconds: u32) -> Self {
        Self {
            distance_meters,
            elapsed_seconds,
            coordinates: Vec::new(),
        }
    }

    pub fn with_coordinates(mut self, coordinates: Vec<Coordinate>) -> Self {
        self.coordinates = coordinates;
        self
    }
}
