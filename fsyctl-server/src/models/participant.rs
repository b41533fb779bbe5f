//! Registrant classification: participant type, registration status, stake filter

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Kind of registrant. Stored verbatim in `registrations.participant_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticipantType {
    Participant,
    Counselor,
}

impl ParticipantType {
    /// Parse a `participant_type` query parameter.
    ///
    /// Matching is exact: the stored values are capitalized.
    pub fn parse(value: Option<&str>) -> Result<Self, ValidationError> {
        match value.map(str::trim) {
            None | Some("") => Err(ValidationError::Empty {
                field: "participant_type",
            }),
            Some("Participant") => Ok(Self::Participant),
            Some("Counselor") => Ok(Self::Counselor),
            Some(other) => Err(ValidationError::InvalidVariant {
                field: "participant_type",
                value: other.to_owned(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Participant => "Participant",
            Self::Counselor => "Counselor",
        }
    }
}

impl fmt::Display for ParticipantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registration workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationStatus {
    Pending,
    Approved,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
        }
    }
}

/// Optional stake restriction for report queries.
///
/// The dashboard sends `All Stakes` (or nothing) to mean "no filter".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StakeFilter(Option<String>);

impl StakeFilter {
    pub const ALL_STAKES: &'static str = "All Stakes";

    pub fn new(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") | Some(Self::ALL_STAKES) => Self(None),
            Some(stake) => Self(Some(stake.to_owned())),
        }
    }

    /// Value bound into SQL: an empty string disables the filter.
    pub fn as_bind(&self) -> &str {
        self.0.as_deref().unwrap_or("")
    }

    pub fn is_all(&self) -> bool {
        self.0.is_none()
    }
}
