//! Route handlers organized by resource

pub mod health;
pub mod auth;
pub mod reference;
pub mod registrations;
pub mod companies;
pub mod members;
pub mod events;
pub mod reports;
pub mod sms;
