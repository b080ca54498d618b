//! Demand-paging simulator.
//!
//! A fixed pool of physical frames is shared by processes that each run
//! binary searches over an array too large to keep resident. Faults are
//! served from the pool while it is comfortably full; below the `nff_min`
//! threshold a victim is chosen by aging-based approximate LRU and the
//! incoming page gets a frame picked by an ownership-affinity heuristic.

pub mod config;
pub mod error;
pub mod frame_pool;
pub mod mmu;
pub mod page_replacer;
pub mod page_table;
pub mod process;
pub mod scheduler;
pub mod stats;

pub use config::{Config, FallbackPolicy};
pub use error::VmError;
pub use frame_pool::Tier;
pub use scheduler::{Report, Simulation};
pub use stats::Stats;
