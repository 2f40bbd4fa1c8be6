#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # stratus
//!
//! Network reservation reconciliation and the external Cloud Provider
//! Interface for a cloud orchestration control plane.
//!
//! ## Core Types
//!
//! - [`Reservation`] and [`NetworkPlan`]: network claims and their classification
//! - [`ReservationReconciler`]: converges desired reservations against existing ones
//! - [`StaticIpRepo`]: static IP pool for one planning pass
//! - [`cpi::ExternalCpi`] and [`cpi::ExternalCpiResponseWrapper`]: the provider client
//! - [`Error`] and [`Result`]: Error handling types
//! - [`Logger`] and [`LogLevel`]: Logging infrastructure
//!
//! ## Examples
//!
//! ```
//! use stratus::{Logger, LogLevel, Reservation, ReservationReconciler};
//!
//! let mut existing = Reservation::new_dynamic("private").unwrap();
//! existing.mark_reserved();
//! let desired = Reservation::new_dynamic("private").unwrap();
//!
//! let reconciler = ReservationReconciler::new(&Logger::new(LogLevel::Quiet));
//! let plans = reconciler.reconcile(&[desired], &[existing]);
//! assert_eq!(plans.len(), 1);
//! assert!(plans[0].is_existing());
//! ```

pub mod config;
pub mod cpi;
pub mod error;
pub mod logging;
pub mod network;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigBuilder};
pub use error::{Error, Result};
pub use logging::{init_logger, LogLevel, Logger};
pub use network::{
    JobNetwork, NetworkPlan, NetworkPlanner, PlanPartition, Reservation, ReservationReconciler,
    ReservationType, StaticIpRepo,
};
