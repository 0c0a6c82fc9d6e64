//! fibmark - Fibonacci strategies and a recursion-aware benchmark harness
//!
//! This library provides two Fibonacci implementations (memoized recursive
//! and iterative) and a harness that times and memory-profiles calls,
//! recording one CSV row per outermost call even when the measured function
//! recurses through the harness.

pub mod alloc;
pub mod cli;
pub mod csv_output;
pub mod error;
pub mod fibonacci;
pub mod guard;
pub mod harness;
pub mod runner;
pub mod sampler;
pub mod schema;
pub mod subject;
pub mod version;

pub use error::{HarnessError, Result};

#[cfg(feature = "alloc-tracking")]
#[global_allocator]
static GLOBAL: alloc::TrackingAllocator = alloc::TrackingAllocator::new();
