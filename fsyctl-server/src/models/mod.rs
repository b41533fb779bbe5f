//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod participant;
pub mod company;
pub mod event;
pub mod search;
pub mod profile;
pub mod envelope;

pub use validation::ValidationError;
pub use participant::{ParticipantType, RegistrationStatus, StakeFilter};
pub use company::{CompanyName, GroupName};
pub use event::{DayNumber, EventTime, EventWindow};
pub use search::SearchTerm;
pub use profile::ProfileUpdate;
pub use envelope::Envelope;
