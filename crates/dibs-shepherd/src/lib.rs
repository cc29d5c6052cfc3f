//! Dibs Shepherd
//!
//! Background service that keeps issue claims honest: contributors who go
//! quiet get reminder nudges, and claims abandoned past the expiry window
//! are released automatically so maintainers can hand the issue to someone
//! else.
//!
//! # Overview
//!
//! On a fixed cadence the shepherd:
//! - scans every claim in `active` status (each run is self-contained; no
//!   cursor state survives between runs)
//! - records a nudge when a claim has gone `nudge_interval_days` without
//!   one, then notifies the claimant best-effort
//! - releases a claim that has gone `claim_expiry_days` without activity,
//!   with the note "Automatically released due to inactivity", then
//!   notifies the claimant best-effort
//!
//! The two checks are independent: a claim past both thresholds is nudged
//! and released in the same run. Failures are isolated per claim, lost
//! races against concurrent writers are dropped silently, and notification
//! failures never undo a committed state change.
//!
//! # Usage
//!
//! ## One-time Sweep
//!
//! ```no_run
//! use dibs_domain::SystemClock;
//! use dibs_shepherd::{Shepherd, ShepherdConfig};
//! use dibs_store::SqliteStore;
//! # use dibs_domain::{traits::Notifier, PrincipalId};
//! # struct NoopNotifier;
//! # impl Notifier for NoopNotifier {
//! #     type Error = String;
//! #     fn notify(&self, _: PrincipalId, _: &str) -> Result<(), String> { Ok(()) }
//! # }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut store = SqliteStore::new("dibs.db")?;
//! let config = ShepherdConfig::new(7, 14)?;
//! let mut shepherd = Shepherd::new(config, SystemClock);
//!
//! let metrics = shepherd.sweep(&mut store, &NoopNotifier)?;
//! println!("{}", metrics.summary());
//! # Ok(())
//! # }
//! ```
//!
//! ## Background Worker
//!
//! ```no_run
//! use dibs_domain::SystemClock;
//! use dibs_shepherd::{ShepherdConfig, ShepherdWorker};
//! use dibs_store::SqliteStore;
//! # use dibs_domain::{traits::Notifier, PrincipalId};
//! # struct NoopNotifier;
//! # impl Notifier for NoopNotifier {
//! #     type Error = String;
//! #     fn notify(&self, _: PrincipalId, _: &str) -> Result<(), String> { Ok(()) }
//! # }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = SqliteStore::new("dibs.db")?;
//!     let config = ShepherdConfig::new(7, 14)?;
//!     let mut worker = ShepherdWorker::new(config, SystemClock);
//!
//!     // Run indefinitely (until Ctrl+C or a StopHandle)
//!     worker.run(store, NoopNotifier).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Configuration
//!
//! The shepherd can be configured via TOML (the daemon does this):
//!
//! ```toml
//! [shepherd]
//! nudge_interval_days = 7
//! claim_expiry_days = 14
//! sweep_interval_minutes = 60
//! # sweep_budget_secs = 120
//! ```
//!
//! The two day thresholds carry no default and must be supplied.

#![warn(missing_docs)]

mod config;
mod error;
mod metrics;
mod shepherd;
mod worker;

pub use config::ShepherdConfig;
pub use error::ShepherdError;
pub use metrics::ShepherdMetrics;
pub use shepherd::{Shepherd, AUTO_RELEASE_NOTE};
pub use worker::{ShepherdWorker, StopHandle};
