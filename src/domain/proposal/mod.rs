//! Change proposal model: approval state machine with audit trail.

mod proposal;

pub use proposal::{ChangeProposal, ProposalStatus, ReviewAction, ReviewEntry};
