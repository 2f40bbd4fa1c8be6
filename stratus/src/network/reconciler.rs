//! Reconciliation of desired network reservations against existing ones.
//!
//! Reusing an unchanged reservation avoids releasing and reacquiring network
//! resources (DHCP leases, port-group bindings) on a no-op redeploy. When no
//! compatible match exists the reconciler never guesses: the existing claim is
//! released and a fresh one is requested.

use crate::logging::Logger;
use crate::network::{NetworkPlan, Reservation};

/// Classifies reservations into reused, new and obsolete plans.
///
/// The reconciler is pure: it performs no I/O and never fails.
///
/// # Examples
///
/// ```
/// use stratus::{Logger, Reservation, ReservationReconciler};
///
/// let desired = vec![Reservation::new_dynamic("default").unwrap()];
/// let mut existing = Reservation::new_dynamic("default").unwrap();
/// existing.mark_reserved();
///
/// let plans = ReservationReconciler::new(&Logger::default()).reconcile(&desired, &[existing]);
/// assert_eq!(plans.len(), 1);
/// assert!(plans[0].is_existing());
/// ```
#[derive(Debug, Clone)]
pub struct ReservationReconciler {
    logger: Logger,
}

impl ReservationReconciler {
    /// Creates a reconciler logging through `logger`.
    #[must_use]
    pub fn new(logger: &Logger) -> Self {
        Self {
            logger: logger.tagged("network-planner"),
        }
    }

    /// Reconciles `desired` against `existing`.
    ///
    /// The result lists reused plans first, then plans for reservations that
    /// still need to be claimed, then obsolete plans. Each group keeps the
    /// order of its input list.
    ///
    /// Every existing reservation ends up in exactly one reused or obsolete
    /// plan. Every desired reservation is either satisfied by exactly one
    /// reused plan or appears in exactly one new plan.
    ///
    /// Only existing reservations marked as reserved can be reused. Each one
    /// is matched against the first not-yet-satisfied desired reservation on
    /// the same network; if that one is incompatible the existing reservation
    /// becomes obsolete.
    #[must_use]
    pub fn reconcile(&self, desired: &[Reservation], existing: &[Reservation]) -> Vec<NetworkPlan> {
        // Slots, not values: two equal existing reservations are still two claims.
        let mut unplaced = vec![true; existing.len()];
        let mut satisfied = vec![false; desired.len()];
        let mut reused = Vec::new();

        for (existing_index, existing_reservation) in existing.iter().enumerate() {
            if !existing_reservation.is_reserved() {
                self.logger.debug(&format!(
                    "Existing {existing_reservation} is not reserved, it will be released"
                ));
                continue;
            }

            let candidate = desired.iter().enumerate().find(|(index, reservation)| {
                !satisfied[*index] && reservation.network() == existing_reservation.network()
            });

            let Some((desired_index, desired_reservation)) = candidate else {
                self.logger.debug(&format!(
                    "No desired reservation on network '{}' for existing {existing_reservation}",
                    existing_reservation.network()
                ));
                continue;
            };

            if existing_reservation.satisfies(desired_reservation) {
                self.logger.debug(&format!(
                    "Reusing existing {existing_reservation} for desired {desired_reservation}"
                ));
                reused.push(NetworkPlan::existing(existing_reservation.clone()));
                unplaced[existing_index] = false;
                satisfied[desired_index] = true;
            } else {
                self.logger.debug(&format!(
                    "Existing {existing_reservation} does not match desired {desired_reservation}"
                ));
            }
        }

        let desired_plans = desired
            .iter()
            .zip(&satisfied)
            .filter(|(_, satisfied)| !**satisfied)
            .map(|(reservation, _)| NetworkPlan::desired(reservation.clone()));

        let obsolete_plans = existing
            .iter()
            .zip(&unplaced)
            .filter(|(_, unplaced)| **unplaced)
            .map(|(reservation, _)| {
                self.logger
                    .debug(&format!("Existing {reservation} is obsolete"));
                NetworkPlan::obsolete(reservation.clone())
            });

        let mut plans = reused;
        plans.extend(desired_plans);
        plans.extend(obsolete_plans);
        plans
    }
}
