//! Domain layer - pure types and logic, no I/O.

pub mod foundation;
pub mod proposal;
pub mod sop;
