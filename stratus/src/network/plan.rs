//! Plan types for network reconciliation.
//!
//! A [`NetworkPlan`] classifies one reservation as reused, newly desired or
//! obsolete. Plans are recomputed on every convergence pass; only the wrapped
//! reservation is ever persisted.

use std::fmt;

use crate::network::Reservation;

/// One reservation together with its reconciliation classification.
///
/// A plan is exactly one of reused-existing, newly-desired or obsolete. The
/// constructors are the only way to build one, so a plan can never be both
/// existing and obsolete.
///
/// # Examples
///
/// ```
/// use stratus::{NetworkPlan, Reservation};
///
/// let plan = NetworkPlan::desired(Reservation::new_dynamic("default").unwrap());
/// assert!(plan.is_desired());
/// assert!(!plan.is_existing());
/// assert!(!plan.is_obsolete());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkPlan {
    reservation: Reservation,
    existing: bool,
    obsolete: bool,
}

impl NetworkPlan {
    /// A reservation that still needs to be claimed.
    #[must_use]
    pub const fn desired(reservation: Reservation) -> Self {
        Self {
            reservation,
            existing: false,
            obsolete: false,
        }
    }

    /// An existing reservation that is reused unchanged.
    #[must_use]
    pub const fn existing(reservation: Reservation) -> Self {
        Self {
            reservation,
            existing: true,
            obsolete: false,
        }
    }

    /// An existing reservation that must be released.
    #[must_use]
    pub const fn obsolete(reservation: Reservation) -> Self {
        Self {
            reservation,
            existing: false,
            obsolete: true,
        }
    }

    /// Returns the wrapped reservation.
    #[must_use]
    pub const fn reservation(&self) -> &Reservation {
        &self.reservation
    }

    /// Consumes the plan, returning the reservation to persist.
    #[must_use]
    pub fn into_reservation(self) -> Reservation {
        self.reservation
    }

    /// True when the plan reuses an existing reservation.
    #[must_use]
    pub const fn is_existing(&self) -> bool {
        self.existing
    }

    /// True when the plan releases an existing reservation.
    #[must_use]
    pub const fn is_obsolete(&self) -> bool {
        self.obsolete
    }

    /// True when the plan asks for a fresh reservation.
    #[must_use]
    pub const fn is_desired(&self) -> bool {
        !self.existing && !self.obsolete
    }

    /// Returns a human-readable description of this plan.
    #[must_use]
    pub fn description(&self) -> String {
        if self.existing {
            format!("Reuse {}", self.reservation)
        } else if self.obsolete {
            format!("Release {}", self.reservation)
        } else {
            format!("Reserve {}", self.reservation)
        }
    }
}

impl fmt::Display for NetworkPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

/// Borrowed view of a plan list grouped by classification.
///
/// # Examples
///
/// ```
/// use stratus::{NetworkPlan, PlanPartition, Reservation};
///
/// let plans = vec![
///     NetworkPlan::existing(Reservation::new_dynamic("a").unwrap()),
///     NetworkPlan::obsolete(Reservation::new_dynamic("b").unwrap()),
/// ];
/// let partition = PlanPartition::new(&plans);
/// assert_eq!(partition.reused.len(), 1);
/// assert_eq!(partition.desired.len(), 0);
/// assert_eq!(partition.obsolete.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct PlanPartition<'a> {
    /// Existing reservations reused unchanged.
    pub reused: Vec<&'a Reservation>,
    /// Reservations that must be claimed.
    pub desired: Vec<&'a Reservation>,
    /// Existing reservations that must be released.
    pub obsolete: Vec<&'a Reservation>,
}

impl<'a> PlanPartition<'a> {
    /// Groups `plans` by classification, preserving order within each group.
    #[must_use]
    pub fn new(plans: &'a [NetworkPlan]) -> Self {
        let mut partition = Self::default();
        for plan in plans {
            if plan.is_existing() {
                partition.reused.push(plan.reservation());
            } else if plan.is_obsolete() {
                partition.obsolete.push(plan.reservation());
            } else {
                partition.desired.push(plan.reservation());
            }
        }
        partition
    }

    /// True when the pass changes nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.desired.is_empty() && self.obsolete.is_empty()
    }
}
