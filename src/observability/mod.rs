//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - One log record per request correlating remote address and ordinal
//! - Rejections and allow-list misses each get a distinct record
//! - Credentials never appear in any log line

pub mod logging;
pub mod metrics;
