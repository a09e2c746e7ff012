//! Business services.

pub mod calendar;
pub mod code_issuer;
pub mod export;
pub mod registration;

pub use calendar::CalendarService;
pub use code_issuer::CodeIssuer;
pub use registration::RegistrationEngine;
