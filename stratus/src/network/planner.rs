//! Construction of desired network plans for one instance.
//!
//! The orchestrator asks the planner for one desired plan per job network of
//! an instance. Static networks take their address from the pass's
//! [`StaticIpRepo`], constrained to the instance's availability zone.

use std::net::IpAddr;

use crate::error::Result;
use crate::logging::Logger;
use crate::network::{JobNetwork, NetworkPlan, Reservation, StaticIpRepo};

/// Builds desired network plans.
#[derive(Debug, Clone)]
pub struct NetworkPlanner {
    logger: Logger,
}

impl NetworkPlanner {
    /// Creates a planner logging through `logger`.
    #[must_use]
    pub fn new(logger: &Logger) -> Self {
        Self {
            logger: logger.tagged("network-planner"),
        }
    }

    /// A desired plan for a dynamic reservation on `job_network`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the network has no name.
    pub fn network_plan_with_dynamic_reservation(&self, job_network: &JobNetwork) -> Result<NetworkPlan> {
        let reservation = Reservation::new_dynamic(job_network.name.as_str())?;
        Ok(NetworkPlan::desired(reservation))
    }

    /// A desired plan for the static address `ip` on `job_network`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the network has no name.
    pub fn network_plan_with_static_reservation(
        &self,
        job_network: &JobNetwork,
        ip: IpAddr,
    ) -> Result<NetworkPlan> {
        let reservation = Reservation::new_static(job_network.name.as_str(), ip)?;
        Ok(NetworkPlan::desired(reservation))
    }

    /// A desired static plan whose address is claimed from `repo` in `az_name`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::StaticIpExhausted`] when the zone has no free
    /// static IP left on the network.
    pub fn network_plan_for_az(
        &self,
        repo: &mut StaticIpRepo,
        job_network: &JobNetwork,
        az_name: &str,
    ) -> Result<NetworkPlan> {
        let ip = repo.claim_static_ip_for_az_and_network(az_name, job_network)?;
        self.logger.debug(&format!(
            "Claiming IP '{ip}' on network {} and az '{az_name}'",
            job_network.name
        ));
        self.network_plan_with_static_reservation(job_network, ip)
    }

    /// Desired plans for every job network of one instance in `az_name`.
    ///
    /// Networks with a static pool get an AZ-claimed static plan, all others a
    /// dynamic plan.
    ///
    /// # Errors
    ///
    /// Fails on the first static network whose pool is exhausted for the zone.
    pub fn desired_plans_for_instance(
        &self,
        repo: &mut StaticIpRepo,
        job_networks: &[JobNetwork],
        az_name: &str,
    ) -> Result<Vec<NetworkPlan>> {
        job_networks
            .iter()
            .map(|job_network| {
                if job_network.is_static() {
                    self.network_plan_for_az(repo, job_network, az_name)
                } else {
                    self.network_plan_with_dynamic_reservation(job_network)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::logging::LogLevel;
    use crate::network::{DeploymentNetwork, Subnet};

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    fn planner() -> NetworkPlanner {
        NetworkPlanner::new(&Logger::new(LogLevel::Quiet))
    }

    fn networks() -> Vec<JobNetwork> {
        vec![
            JobNetwork {
                name: "private".into(),
                static_ips: Some(vec![ip("10.0.0.5"), ip("10.0.1.5")]),
                deployment_network: DeploymentNetwork {
                    name: "private".into(),
                    subnets: vec![
                        Subnet::new(vec![ip("10.0.0.5")], vec!["z1".into()]),
                        Subnet::new(vec![ip("10.0.1.5")], vec!["z2".into()]),
                    ],
                },
            },
            JobNetwork {
                name: "dynamic".into(),
                static_ips: None,
                deployment_network: DeploymentNetwork {
                    name: "dynamic".into(),
                    subnets: vec![],
                },
            },
        ]
    }

    #[test]
    fn test_desired_plans_for_instance() {
        let networks = networks();
        let mut repo = StaticIpRepo::new(&networks);
        let plans = planner()
            .desired_plans_for_instance(&mut repo, &networks, "z2")
            .unwrap();

        assert_eq!(plans.len(), 2);
        assert!(plans.iter().all(NetworkPlan::is_desired));
        assert_eq!(plans[0].reservation().ip(), Some(ip("10.0.1.5")));
        assert!(plans[0].reservation().is_static());
        assert!(plans[1].reservation().is_dynamic());
        assert!(!repo.is_available(&networks[0], ip("10.0.1.5")));
    }

    #[test]
    fn test_exhausted_zone_is_reported() {
        let networks = networks();
        let mut repo = StaticIpRepo::new(&networks);
        let planner = planner();

        planner.network_plan_for_az(&mut repo, &networks[0], "z1").unwrap();
        let err = planner
            .network_plan_for_az(&mut repo, &networks[0], "z1")
            .unwrap_err();
        assert!(matches!(err, Error::StaticIpExhausted { .. }));
    }

    #[test]
    fn test_static_plan_with_explicit_ip() {
        let networks = networks();
        let plan = planner()
            .network_plan_with_static_reservation(&networks[0], ip("10.0.0.5"))
            .unwrap();
        assert_eq!(plan.reservation().network(), "private");
        assert_eq!(plan.reservation().ip(), Some(ip("10.0.0.5")));
    }
}
