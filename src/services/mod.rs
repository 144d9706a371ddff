pub mod calendar_service;
pub mod credential_service;

pub use calendar_service::{CalendarService, Events};
pub use credential_service::{CredentialError, CredentialService};
