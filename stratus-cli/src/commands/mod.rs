//! CLI command implementations.
//!
//! - `reconcile`: Classify reservations into reuse/reserve/release plans
//! - `cpi`: Invoke a single CPI method through the version adapter
//! - `validate`: Validate a director configuration file

pub mod cpi;
pub mod reconcile;
pub mod validate;

pub use cpi::CpiCommand;
pub use reconcile::ReconcileCommand;
pub use validate::ValidateCommand;
