//! Service layer for `LetsMeet`.

pub mod auth_svc;
pub mod authz;
pub mod cookie;
pub mod event_svc;

#[cfg(test)]
mod test_helpers;

pub use auth_svc::{AuthService, CreateEventRequest, SessionGrant, TokenResponse};
pub use authz::{Requirement, authorize};
pub use cookie::RefreshCookie;
pub use event_svc::{EventDetails, EventService, NewEvent, NewOwner};
