//! Network reservation reconciliation.
//!
//! This module converges an instance's desired network reservations against
//! the reservations persisted by previous passes:
//!
//! - [`Reservation`]: a dynamic or static claim on one network
//! - [`NetworkPlan`]: the classification of a reservation as reused, new or obsolete
//! - [`ReservationReconciler`]: desired × existing → plans
//! - [`StaticIpRepo`]: the pool of unclaimed static IPs for one planning pass
//! - [`NetworkPlanner`]: builds desired plans, claiming static IPs per zone
//!
//! Everything here is synchronous and free of I/O.

pub mod job_network;
pub mod plan;
pub mod planner;
pub mod reconciler;
pub mod reservation;
pub mod static_ip_repo;

#[cfg(test)]
mod proptests;

pub use job_network::{DeploymentNetwork, JobNetwork, Subnet};
pub use plan::{NetworkPlan, PlanPartition};
pub use planner::NetworkPlanner;
pub use reconciler::ReservationReconciler;
pub use reservation::{Reservation, ReservationBuilder, ReservationType, ValidationError};
pub use static_ip_repo::StaticIpRepo;
