//! Foundation types shared across the domain.

mod errors;
mod timestamp;

pub use errors::PortalError;
pub use timestamp::Timestamp;
