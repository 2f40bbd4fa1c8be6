//! Per-pass pool of unclaimed static IPs.
//!
//! A [`StaticIpRepo`] is built once per planning pass from the job networks'
//! static IP declarations and is discarded afterwards. IPs are only ever
//! removed from it, so no address is handed out twice.

use std::collections::HashMap;
use std::net::IpAddr;

use crate::error::{Error, Result};
use crate::network::{DeploymentNetwork, JobNetwork, Subnet};

#[derive(Debug, Clone)]
struct StaticIpPool {
    remaining: Vec<IpAddr>,
    network: DeploymentNetwork,
}

/// Unclaimed static IPs keyed by job network name.
///
/// Not safe for concurrent use; one repo serves one locked planning pass.
///
/// # Examples
///
/// ```
/// use stratus::network::{DeploymentNetwork, JobNetwork, StaticIpRepo, Subnet};
///
/// let ips = vec!["10.0.0.5".parse().unwrap(), "10.0.1.5".parse().unwrap()];
/// let network = JobNetwork {
///     name: "default".into(),
///     static_ips: Some(ips.clone()),
///     deployment_network: DeploymentNetwork {
///         name: "default".into(),
///         subnets: vec![
///             Subnet::new(vec![ips[0]], vec!["z1".into()]),
///             Subnet::new(vec![ips[1]], vec!["z2".into()]),
///         ],
///     },
/// };
///
/// let mut repo = StaticIpRepo::new(std::slice::from_ref(&network));
/// let ip = repo.claim_static_ip_for_az_and_network("z2", &network).unwrap();
/// assert_eq!(ip, ips[1]);
/// assert!(repo.claim_static_ip_for_az_and_network("z2", &network).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticIpRepo {
    pools: HashMap<String, StaticIpPool>,
}

impl StaticIpRepo {
    /// Seeds the repo from every job network that declares static IPs.
    ///
    /// Each pool is a private copy in declaration order; repeated addresses
    /// are kept once.
    #[must_use]
    pub fn new(job_networks: &[JobNetwork]) -> Self {
        let mut pools = HashMap::new();
        for job_network in job_networks {
            let Some(static_ips) = &job_network.static_ips else {
                continue;
            };
            let mut remaining: Vec<IpAddr> = Vec::with_capacity(static_ips.len());
            for ip in static_ips {
                if !remaining.contains(ip) {
                    remaining.push(*ip);
                }
            }
            pools.insert(
                job_network.name.clone(),
                StaticIpPool {
                    remaining,
                    network: job_network.deployment_network.clone(),
                },
            );
        }
        Self { pools }
    }

    /// Claims `ip` if it is still in the network's pool.
    ///
    /// Used to re-affirm a static IP an instance already holds. Claiming an
    /// address that is absent, or already claimed, is a no-op.
    ///
    /// Returns whether the address was removed from the pool.
    pub fn try_to_claim_ip(&mut self, job_network: &JobNetwork, ip: IpAddr) -> bool {
        let Some(pool) = self.pools.get_mut(&job_network.name) else {
            return false;
        };
        match pool.remaining.iter().position(|candidate| *candidate == ip) {
            Some(index) => {
                pool.remaining.remove(index);
                true
            }
            None => false,
        }
    }

    /// Claims the first remaining IP of `job_network` that lives in `az_name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StaticIpExhausted`] when no remaining IP belongs to a
    /// subnet of that zone.
    pub fn claim_static_ip_for_az_and_network(
        &mut self,
        az_name: &str,
        job_network: &JobNetwork,
    ) -> Result<IpAddr> {
        let exhausted = || Error::StaticIpExhausted {
            network: job_network.name.clone(),
            az: az_name.to_string(),
        };

        let pool = self.pools.get_mut(&job_network.name).ok_or_else(exhausted)?;
        let index = Self::find_static_ip_for_az(pool, az_name).ok_or_else(exhausted)?;
        Ok(pool.remaining.remove(index))
    }

    /// Returns the position of the first remaining IP whose owning subnet's
    /// first availability zone is `az_name`.
    ///
    /// Only the first zone of a multi-zone subnet is considered.
    fn find_static_ip_for_az(pool: &StaticIpPool, az_name: &str) -> Option<usize> {
        pool.remaining.iter().position(|ip| {
            pool.network
                .subnet_for_static_ip(*ip)
                .and_then(Subnet::first_availability_zone)
                == Some(az_name)
        })
    }

    /// Returns the unclaimed IPs of a network, in pool order.
    #[must_use]
    pub fn available(&self, job_network: &JobNetwork) -> Vec<IpAddr> {
        self.pools
            .get(&job_network.name)
            .map(|pool| pool.remaining.clone())
            .unwrap_or_default()
    }

    /// Returns true if `ip` is still unclaimed on the network.
    #[must_use]
    pub fn is_available(&self, job_network: &JobNetwork, ip: IpAddr) -> bool {
        self.pools
            .get(&job_network.name)
            .is_some_and(|pool| pool.remaining.contains(&ip))
    }
}
