//! Network topology as seen by one instance group.
//!
//! A [`JobNetwork`] is an instance group's membership in a deployment network.
//! It may carry the static IPs the operator assigned to the group; the
//! deployment network's subnets say which availability zones those IPs live in.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// A subnet of a deployment network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Subnet {
    /// Static IPs owned by this subnet.
    #[serde(default)]
    pub static_ips: Vec<IpAddr>,

    /// Availability zones the subnet belongs to, in declaration order.
    #[serde(default, rename = "azs")]
    pub availability_zone_names: Vec<String>,
}

impl Subnet {
    /// Creates a subnet owning `static_ips` in the given zones.
    #[must_use]
    pub fn new(static_ips: Vec<IpAddr>, availability_zone_names: Vec<String>) -> Self {
        Self {
            static_ips,
            availability_zone_names,
        }
    }

    /// Returns true if `ip` is one of this subnet's static IPs.
    #[must_use]
    pub fn owns_static_ip(&self, ip: IpAddr) -> bool {
        self.static_ips.contains(&ip)
    }

    /// Returns the first declared availability zone name.
    #[must_use]
    pub fn first_availability_zone(&self) -> Option<&str> {
        self.availability_zone_names.first().map(String::as_str)
    }
}

/// A named network made of subnets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeploymentNetwork {
    /// Network name.
    pub name: String,
    /// Subnets of the network.
    #[serde(default)]
    pub subnets: Vec<Subnet>,
}

impl DeploymentNetwork {
    /// Returns the subnet whose static IP set contains `ip`.
    #[must_use]
    pub fn subnet_for_static_ip(&self, ip: IpAddr) -> Option<&Subnet> {
        self.subnets.iter().find(|subnet| subnet.owns_static_ip(ip))
    }
}

/// An instance group's view of a deployment network.
///
/// # Examples
///
/// ```
/// use stratus::network::{DeploymentNetwork, JobNetwork, Subnet};
///
/// let ip = "10.0.0.5".parse().unwrap();
/// let network = JobNetwork {
///     name: "default".into(),
///     static_ips: Some(vec![ip]),
///     deployment_network: DeploymentNetwork {
///         name: "default".into(),
///         subnets: vec![Subnet::new(vec![ip], vec!["z1".into()])],
///     },
/// };
/// assert!(network.is_static());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobNetwork {
    /// Network name.
    pub name: String,
    /// Static IPs assigned to the instance group, in declaration order.
    #[serde(default)]
    pub static_ips: Option<Vec<IpAddr>>,
    /// The deployment network this job network refers to.
    pub deployment_network: DeploymentNetwork,
}

impl JobNetwork {
    /// Returns true if the group declares a static IP pool on this network.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.static_ips.as_ref().is_some_and(|ips| !ips.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_subnet_for_static_ip() {
        let network = DeploymentNetwork {
            name: "default".into(),
            subnets: vec![
                Subnet::new(vec![ip("192.168.1.10")], vec!["zone_1".into()]),
                Subnet::new(vec![ip("192.168.2.10")], vec!["zone_2".into()]),
            ],
        };
        let subnet = network.subnet_for_static_ip(ip("192.168.2.10")).unwrap();
        assert_eq!(subnet.first_availability_zone(), Some("zone_2"));
        assert!(network.subnet_for_static_ip(ip("192.168.3.10")).is_none());
    }

    #[test]
    fn test_first_availability_zone_of_multi_az_subnet() {
        let subnet = Subnet::new(vec![], vec!["z1".into(), "z2".into()]);
        assert_eq!(subnet.first_availability_zone(), Some("z1"));
        assert_eq!(Subnet::new(vec![], vec![]).first_availability_zone(), None);
    }

    #[test]
    fn test_is_static() {
        let mut network = JobNetwork {
            name: "default".into(),
            static_ips: None,
            deployment_network: DeploymentNetwork {
                name: "default".into(),
                subnets: vec![],
            },
        };
        assert!(!network.is_static());
        network.static_ips = Some(vec![]);
        assert!(!network.is_static());
        network.static_ips = Some(vec![ip("10.0.0.1")]);
        assert!(network.is_static());
    }

    #[test]
    fn test_deserialize_yaml() {
        let yaml = r"
name: default
static_ips: [10.0.0.5, 10.0.0.6]
deployment_network:
  name: default
  subnets:
    - static_ips: [10.0.0.5, 10.0.0.6]
      azs: [z1, z2]
";
        let network: JobNetwork = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(network.static_ips.as_ref().unwrap().len(), 2);
        assert_eq!(
            network.deployment_network.subnets[0].availability_zone_names,
            vec!["z1".to_string(), "z2".to_string()]
        );
    }
}
