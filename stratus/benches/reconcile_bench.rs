use std::net::{IpAddr, Ipv4Addr};

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};

use stratus::network::{DeploymentNetwork, Subnet};
use stratus::{JobNetwork, LogLevel, Logger, Reservation, ReservationReconciler, StaticIpRepo};

const RESERVATION_COUNTS: &[usize] = &[1, 10, 100, 500];
const POOL_SIZES: &[usize] = &[16, 256, 1024];

fn address(index: usize) -> IpAddr {
    let [_, _, high, low] = u32::try_from(index)
        .expect("index fits in u32")
        .to_be_bytes();
    IpAddr::V4(Ipv4Addr::new(10, 0, high, low))
}

// Half the networks keep their reservation; the other half change static IP.
fn reservations(count: usize) -> (Vec<Reservation>, Vec<Reservation>) {
    let mut desired = Vec::with_capacity(count);
    let mut existing = Vec::with_capacity(count);

    for index in 0..count {
        let network = format!("net-{index}");
        if index % 2 == 0 {
            desired.push(Reservation::new_dynamic(network.as_str()).expect("valid reservation"));
            let mut reservation = Reservation::new_dynamic(network).expect("valid reservation");
            reservation.mark_reserved();
            existing.push(reservation);
        } else {
            desired.push(
                Reservation::new_static(network.as_str(), address(index)).expect("valid reservation"),
            );
            let mut reservation =
                Reservation::new_static(network, address(index + count)).expect("valid reservation");
            reservation.mark_reserved();
            existing.push(reservation);
        }
    }

    (desired, existing)
}

fn pool_network(size: usize) -> JobNetwork {
    let ips: Vec<IpAddr> = (1..=size).map(address).collect();
    let (z1, z2) = ips.split_at(size / 2);
    JobNetwork {
        name: "private".into(),
        static_ips: Some(ips.clone()),
        deployment_network: DeploymentNetwork {
            name: "private".into(),
            subnets: vec![
                Subnet::new(z1.to_vec(), vec!["z1".into()]),
                Subnet::new(z2.to_vec(), vec!["z2".into()]),
            ],
        },
    }
}

fn bench_reconcile(c: &mut Criterion) {
    let reconciler = ReservationReconciler::new(&Logger::new(LogLevel::Quiet));
    let mut group = c.benchmark_group("reconcile");

    for &count in RESERVATION_COUNTS {
        let (desired, existing) = reservations(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| black_box(reconciler.reconcile(&desired, &existing)));
        });
    }

    group.finish();
}

fn bench_claim_for_az(c: &mut Criterion) {
    let mut group = c.benchmark_group("claim_static_ip_for_az");

    for &size in POOL_SIZES {
        let network = pool_network(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter_batched(
                || StaticIpRepo::new(std::slice::from_ref(&network)),
                |mut repo| {
                    // z2 addresses sit at the back of the pool.
                    while let Ok(ip) = repo.claim_static_ip_for_az_and_network("z2", &network) {
                        black_box(ip);
                    }
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_reconcile, bench_claim_for_az);
criterion_main!(benches);
