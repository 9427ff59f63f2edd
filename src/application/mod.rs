//! Application layer - orchestration over ports.

pub mod cache;
pub mod proposals;
pub mod regeneration;
pub mod single_flight;
pub mod streaming;

pub use cache::{spawn_refresh_scheduler, CacheStats, SopCache};
pub use proposals::ProposalService;
pub use regeneration::{
    RegenerationOutcome, RegenerationPipeline, RegenerationSummary, SyncStatusEntry,
};
pub use single_flight::SingleFlight;
pub use streaming::{KeepAliveOptions, KeepAliveStream, DEFAULT_KEEP_ALIVE_INTERVAL};
