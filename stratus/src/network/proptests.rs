//! Property-based tests for network reconciliation and the static IP pool.

use super::{
    DeploymentNetwork, JobNetwork, NetworkPlan, PlanPartition, Reservation, ReservationReconciler,
    StaticIpRepo, Subnet,
};
use crate::logging::{LogLevel, Logger};
use proptest::prelude::*;
use std::net::{IpAddr, Ipv4Addr};

// Few networks and addresses so collisions are common.
fn network_strategy() -> impl Strategy<Value = String> {
    prop_oneof![Just("a".to_string()), Just("b".to_string()), Just("c".to_string())]
}

fn ip_strategy() -> impl Strategy<Value = IpAddr> {
    (1u8..=4).prop_map(|last| IpAddr::V4(Ipv4Addr::new(10, 0, 0, last)))
}

fn desired_strategy() -> impl Strategy<Value = Reservation> {
    prop_oneof![
        network_strategy().prop_map(|n| Reservation::new_dynamic(n).unwrap()),
        (network_strategy(), ip_strategy()).prop_map(|(n, ip)| Reservation::new_static(n, ip).unwrap()),
    ]
}

fn existing_strategy() -> impl Strategy<Value = Reservation> {
    (desired_strategy(), any::<bool>(), prop::option::of(ip_strategy())).prop_map(
        |(mut reservation, reserved, resolved)| {
            if let Some(ip) = resolved {
                if reservation.is_dynamic() {
                    reservation.resolve_ip(ip).unwrap();
                }
            }
            if reserved {
                reservation.mark_reserved();
            }
            reservation
        },
    )
}

fn reconciler() -> ReservationReconciler {
    ReservationReconciler::new(&Logger::new(LogLevel::Quiet))
}

// True when both slices hold the same reservations with the same multiplicity.
fn same_multiset(left: &[&Reservation], right: &[Reservation]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    let mut remaining: Vec<&Reservation> = right.iter().collect();
    for item in left {
        match remaining.iter().position(|candidate| candidate == item) {
            Some(index) => {
                remaining.swap_remove(index);
            }
            None => return false,
        }
    }
    true
}

fn is_sub_multiset(left: &[&Reservation], right: &[Reservation]) -> bool {
    let mut remaining: Vec<&Reservation> = right.iter().collect();
    left.iter().all(|item| match remaining.iter().position(|c| c == item) {
        Some(index) => {
            remaining.swap_remove(index);
            true
        }
        None => false,
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 2000,
        .. ProptestConfig::default()
    })]

    // Every existing reservation is reused or obsolete exactly once, and every
    // desired reservation is reused or new exactly once.
    #[test]
    fn reconcile_partitions_inputs(
        desired in prop::collection::vec(desired_strategy(), 0..6),
        existing in prop::collection::vec(existing_strategy(), 0..6),
    ) {
        let plans = reconciler().reconcile(&desired, &existing);
        let partition = PlanPartition::new(&plans);

        let mut accounted_existing = partition.reused.clone();
        accounted_existing.extend(partition.obsolete.iter().copied());
        prop_assert!(same_multiset(&accounted_existing, &existing));

        prop_assert_eq!(partition.reused.len() + partition.desired.len(), desired.len());
        prop_assert!(is_sub_multiset(&partition.desired, &desired));
        prop_assert_eq!(plans.len(), existing.len() + partition.desired.len());
    }

    // Reused plans only ever wrap reserved reservations.
    #[test]
    fn reconcile_reuses_only_reserved(
        desired in prop::collection::vec(desired_strategy(), 0..6),
        existing in prop::collection::vec(existing_strategy(), 0..6),
    ) {
        let plans = reconciler().reconcile(&desired, &existing);
        for plan in plans.iter().filter(|p| p.is_existing()) {
            prop_assert!(plan.reservation().is_reserved());
        }
    }

    // Feeding a pass's reused and new plans back as existing is a no-op.
    #[test]
    fn reconcile_is_idempotent(
        desired in prop::collection::vec(desired_strategy(), 0..6),
        existing in prop::collection::vec(existing_strategy(), 0..6),
    ) {
        let reconciler = reconciler();
        let first = reconciler.reconcile(&desired, &existing);

        let next_existing: Vec<Reservation> = first
            .into_iter()
            .filter(|plan| !plan.is_obsolete())
            .map(|plan| {
                let mut reservation = plan.into_reservation();
                reservation.mark_reserved();
                reservation
            })
            .collect();

        let second = reconciler.reconcile(&desired, &next_existing);
        let partition = PlanPartition::new(&second);
        prop_assert!(partition.obsolete.is_empty());
        prop_assert!(partition.desired.is_empty());
        prop_assert!(second.iter().all(NetworkPlan::is_existing));
    }

    // A reserved dynamic reservation is reused whatever address it resolved to.
    #[test]
    fn dynamic_reuse_ignores_ip(network in network_strategy(), ip in ip_strategy()) {
        let mut existing = Reservation::new_dynamic(network.as_str()).unwrap();
        existing.resolve_ip(ip).unwrap();
        existing.mark_reserved();
        let desired = Reservation::new_dynamic(network.as_str()).unwrap();

        let plans = reconciler().reconcile(&[desired], &[existing]);
        prop_assert_eq!(plans.len(), 1);
        prop_assert!(plans[0].is_existing());
    }

    // Changing a static IP always releases the old one and requests the new one.
    #[test]
    fn static_ip_change_never_reused(
        network in network_strategy(),
        old_ip in ip_strategy(),
        new_ip in ip_strategy(),
    ) {
        prop_assume!(old_ip != new_ip);
        let mut existing = Reservation::new_static(network.as_str(), old_ip).unwrap();
        existing.mark_reserved();
        let desired = Reservation::new_static(network.as_str(), new_ip).unwrap();

        let plans = reconciler().reconcile(&[desired], &[existing]);
        let partition = PlanPartition::new(&plans);
        prop_assert_eq!(partition.reused.len(), 0);
        prop_assert_eq!(partition.desired.len(), 1);
        prop_assert_eq!(partition.desired[0].ip(), Some(new_ip));
        prop_assert_eq!(partition.obsolete.len(), 1);
        prop_assert_eq!(partition.obsolete[0].ip(), Some(old_ip));
    }
}

#[derive(Debug, Clone)]
enum ClaimOp {
    Exact(IpAddr),
    ForAz(&'static str),
}

fn claim_op_strategy() -> impl Strategy<Value = ClaimOp> {
    prop_oneof![
        ip_strategy().prop_map(ClaimOp::Exact),
        prop_oneof![Just("z1"), Just("z2")].prop_map(ClaimOp::ForAz),
    ]
}

fn pool_network(pool: Vec<IpAddr>) -> JobNetwork {
    let z1 = vec![
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)),
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)),
    ];
    let z2 = vec![
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, 3)),
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, 4)),
    ];
    JobNetwork {
        name: "a".into(),
        static_ips: Some(pool),
        deployment_network: DeploymentNetwork {
            name: "a".into(),
            subnets: vec![
                Subnet::new(z1, vec!["z1".into()]),
                Subnet::new(z2, vec!["z2".into(), "z1".into()]),
            ],
        },
    }
}

proptest! {
    // No interleaving of claims hands out the same address twice.
    #[test]
    fn static_ip_repo_never_repeats(
        pool in prop::collection::vec(ip_strategy(), 0..8),
        ops in prop::collection::vec(claim_op_strategy(), 0..16),
    ) {
        let network = pool_network(pool);
        let mut repo = StaticIpRepo::new(std::slice::from_ref(&network));
        let mut handed_out: Vec<IpAddr> = Vec::new();

        for op in ops {
            match op {
                ClaimOp::Exact(ip) => {
                    if repo.try_to_claim_ip(&network, ip) {
                        prop_assert!(!handed_out.contains(&ip));
                        handed_out.push(ip);
                    }
                }
                ClaimOp::ForAz(az) => {
                    if let Ok(ip) = repo.claim_static_ip_for_az_and_network(az, &network) {
                        prop_assert!(!handed_out.contains(&ip));
                        handed_out.push(ip);
                    }
                }
            }
        }
    }
}
