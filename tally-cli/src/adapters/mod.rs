//! Concrete HTTP implementations of the engine's adapter contracts.

pub mod mailgun;
pub mod tms;
