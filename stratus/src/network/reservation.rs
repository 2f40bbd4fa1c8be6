//! Reservation types for tracking network address claims.
//!
//! A reservation is one instance's claim on one network, either dynamic
//! (the provider picks the address) or static (the operator picked it).
//! Reservations are value types: reconciliation compares them by network,
//! type and static IP, never by identity.

use std::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// How the address of a reservation is chosen.
///
/// # Examples
///
/// ```
/// use stratus::ReservationType;
///
/// assert_eq!(ReservationType::Static.to_string(), "static");
/// assert_eq!(ReservationType::parse("DYNAMIC").unwrap(), ReservationType::Dynamic);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationType {
    /// The address is assigned by the provider and carries no operator intent.
    Dynamic,
    /// The address was requested explicitly by the operator.
    Static,
}

impl ReservationType {
    /// Parses a reservation type (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the string is neither "dynamic" nor "static".
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.to_lowercase().as_str() {
            "dynamic" => Ok(Self::Dynamic),
            "static" => Ok(Self::Static),
            _ => Err(ValidationError {
                field: "type".into(),
                message: format!("unknown reservation type '{s}'"),
            }),
        }
    }
}

impl fmt::Display for ReservationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dynamic => write!(f, "dynamic"),
            Self::Static => write!(f, "static"),
        }
    }
}

/// A claim of network address space for one instance on one network.
///
/// Static reservations always carry an IP. Desired dynamic reservations carry
/// none; an existing dynamic reservation may carry the address the provider
/// resolved for it.
///
/// # Examples
///
/// ```
/// use stratus::Reservation;
///
/// let desired = Reservation::new_static("default", "10.0.0.5".parse().unwrap()).unwrap();
/// assert!(desired.is_static());
/// assert!(!desired.is_reserved());
///
/// let mut existing = Reservation::new_dynamic("default").unwrap();
/// existing.mark_reserved();
/// assert!(existing.is_reserved());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ReservationRecord", into = "ReservationRecord")]
pub struct Reservation {
    network: String,
    reservation_type: ReservationType,
    ip: Option<IpAddr>,
    reserved: bool,
}

impl Reservation {
    /// Creates a reservation builder.
    #[must_use]
    pub fn builder(network: impl Into<String>, reservation_type: ReservationType) -> ReservationBuilder {
        ReservationBuilder {
            network: network.into(),
            reservation_type,
            ip: None,
            reserved: false,
        }
    }

    /// Creates an unreserved dynamic reservation on `network`.
    ///
    /// # Errors
    ///
    /// Returns an error if the network name is empty.
    pub fn new_dynamic(network: impl Into<String>) -> Result<Self, ValidationError> {
        Self::builder(network, ReservationType::Dynamic).build()
    }

    /// Creates an unreserved static reservation for `ip` on `network`.
    ///
    /// # Errors
    ///
    /// Returns an error if the network name is empty.
    pub fn new_static(network: impl Into<String>, ip: IpAddr) -> Result<Self, ValidationError> {
        Self::builder(network, ReservationType::Static).ip(Some(ip)).build()
    }

    /// Returns the network name.
    #[must_use]
    pub fn network(&self) -> &str {
        &self.network
    }

    /// Returns the reservation type.
    #[must_use]
    pub const fn reservation_type(&self) -> ReservationType {
        self.reservation_type
    }

    /// Returns the address, if one is known.
    #[must_use]
    pub const fn ip(&self) -> Option<IpAddr> {
        self.ip
    }

    /// Returns whether the claim is currently held in the backing store.
    #[must_use]
    pub const fn is_reserved(&self) -> bool {
        self.reserved
    }

    /// Returns true for static reservations.
    #[must_use]
    pub const fn is_static(&self) -> bool {
        matches!(self.reservation_type, ReservationType::Static)
    }

    /// Returns true for dynamic reservations.
    #[must_use]
    pub const fn is_dynamic(&self) -> bool {
        matches!(self.reservation_type, ReservationType::Dynamic)
    }

    /// Marks the claim as held.
    pub fn mark_reserved(&mut self) {
        self.reserved = true;
    }

    /// Records the address the provider assigned to a dynamic reservation.
    ///
    /// # Errors
    ///
    /// Returns an error for static reservations, whose address is fixed.
    pub fn resolve_ip(&mut self, ip: IpAddr) -> Result<(), ValidationError> {
        if self.is_static() {
            return Err(ValidationError {
                field: "ip".into(),
                message: "static reservation addresses cannot be re-resolved".into(),
            });
        }
        self.ip = Some(ip);
        Ok(())
    }

    /// Checks whether this existing reservation can satisfy `desired` as is.
    ///
    /// Dynamic reservations are interchangeable on the same network. Static
    /// reservations additionally need an identical address.
    ///
    /// # Examples
    ///
    /// ```
    /// use stratus::Reservation;
    ///
    /// let mut existing = Reservation::new_dynamic("default").unwrap();
    /// existing.resolve_ip("10.0.0.9".parse().unwrap()).unwrap();
    /// let desired = Reservation::new_dynamic("default").unwrap();
    /// assert!(existing.satisfies(&desired));
    ///
    /// let old = Reservation::new_static("default", "10.0.0.6".parse().unwrap()).unwrap();
    /// let new = Reservation::new_static("default", "10.0.0.5".parse().unwrap()).unwrap();
    /// assert!(!old.satisfies(&new));
    /// ```
    #[must_use]
    pub fn satisfies(&self, desired: &Self) -> bool {
        if self.network != desired.network || self.reservation_type != desired.reservation_type {
            return false;
        }
        match desired.reservation_type {
            ReservationType::Dynamic => true,
            ReservationType::Static => self.ip == desired.ip,
        }
    }
}

impl fmt::Display for Reservation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} reservation on network '{}'", self.reservation_type, self.network)?;
        if let Some(ip) = self.ip {
            write!(f, " with ip {ip}")?;
        }
        Ok(())
    }
}

/// Builder for creating `Reservation` instances.
#[derive(Debug)]
pub struct ReservationBuilder {
    network: String,
    reservation_type: ReservationType,
    ip: Option<IpAddr>,
    reserved: bool,
}

impl ReservationBuilder {
    /// Sets the address.
    #[must_use]
    pub fn ip(mut self, ip: Option<IpAddr>) -> Self {
        self.ip = ip;
        self
    }

    /// Sets whether the claim is already held.
    #[must_use]
    pub const fn reserved(mut self, reserved: bool) -> Self {
        self.reserved = reserved;
        self
    }

    /// Builds the reservation.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The network name is empty after trimming
    /// - The reservation is static but has no IP
    pub fn build(self) -> Result<Reservation, ValidationError> {
        let network = self.network.trim();
        if network.is_empty() {
            return Err(ValidationError {
                field: "network".into(),
                message: "network must be non-empty after trimming whitespace".into(),
            });
        }

        if self.reservation_type == ReservationType::Static && self.ip.is_none() {
            return Err(ValidationError {
                field: "ip".into(),
                message: format!("static reservation on network '{network}' requires an ip"),
            });
        }

        Ok(Reservation {
            network: network.to_string(),
            reservation_type: self.reservation_type,
            ip: self.ip,
            reserved: self.reserved,
        })
    }
}

/// Serialized form of a reservation, as persisted or read from files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReservationRecord {
    network: String,
    #[serde(rename = "type")]
    reservation_type: ReservationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ip: Option<IpAddr>,
    #[serde(default)]
    reserved: bool,
}

impl TryFrom<ReservationRecord> for Reservation {
    type Error = ValidationError;

    fn try_from(record: ReservationRecord) -> Result<Self, Self::Error> {
        Self::builder(record.network, record.reservation_type)
            .ip(record.ip)
            .reserved(record.reserved)
            .build()
    }
}

impl From<Reservation> for ReservationRecord {
    fn from(reservation: Reservation) -> Self {
        Self {
            network: reservation.network,
            reservation_type: reservation.reservation_type,
            ip: reservation.ip,
            reserved: reservation.reserved,
        }
    }
}

/// Error type for validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The field that failed validation.
    pub field: String,
    /// A description of the validation failure.
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation error for '{}': {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_new_dynamic() {
        let r = Reservation::new_dynamic("default").unwrap();
        assert_eq!(r.network(), "default");
        assert_eq!(r.reservation_type(), ReservationType::Dynamic);
        assert_eq!(r.ip(), None);
        assert!(!r.is_reserved());
    }

    #[test]
    fn test_new_static() {
        let r = Reservation::new_static("default", ip("10.0.0.5")).unwrap();
        assert!(r.is_static());
        assert_eq!(r.ip(), Some(ip("10.0.0.5")));
    }

    #[test]
    fn test_network_trimming() {
        let r = Reservation::new_dynamic("  default  ").unwrap();
        assert_eq!(r.network(), "default");
    }

    #[test]
    fn test_empty_network_rejected() {
        let err = Reservation::new_dynamic("   ").unwrap_err();
        assert_eq!(err.field, "network");
        assert!(err.message.contains("non-empty"));
    }

    #[test]
    fn test_static_without_ip_rejected() {
        let err = Reservation::builder("default", ReservationType::Static)
            .build()
            .unwrap_err();
        assert_eq!(err.field, "ip");
    }

    #[test]
    fn test_resolve_ip_only_for_dynamic() {
        let mut dynamic = Reservation::new_dynamic("default").unwrap();
        dynamic.resolve_ip(ip("10.0.0.9")).unwrap();
        assert_eq!(dynamic.ip(), Some(ip("10.0.0.9")));

        let mut fixed = Reservation::new_static("default", ip("10.0.0.5")).unwrap();
        assert!(fixed.resolve_ip(ip("10.0.0.6")).is_err());
        assert_eq!(fixed.ip(), Some(ip("10.0.0.5")));
    }

    #[test]
    fn test_satisfies_dynamic_ignores_ip() {
        let mut existing = Reservation::new_dynamic("default").unwrap();
        existing.resolve_ip(ip("192.168.1.2")).unwrap();
        let desired = Reservation::new_dynamic("default").unwrap();
        assert!(existing.satisfies(&desired));
    }

    #[test]
    fn test_satisfies_requires_same_network_and_type() {
        let existing = Reservation::new_dynamic("default").unwrap();
        assert!(!existing.satisfies(&Reservation::new_dynamic("other").unwrap()));

        let existing = Reservation::new_static("default", ip("10.0.0.5")).unwrap();
        assert!(!existing.satisfies(&Reservation::new_dynamic("default").unwrap()));
    }

    #[test]
    fn test_satisfies_static_requires_identical_ip() {
        let existing = Reservation::new_static("default", ip("10.0.0.5")).unwrap();
        assert!(existing.satisfies(&Reservation::new_static("default", ip("10.0.0.5")).unwrap()));
        assert!(!existing.satisfies(&Reservation::new_static("default", ip("10.0.0.6")).unwrap()));
    }

    #[test]
    fn test_display() {
        let r = Reservation::new_static("default", ip("10.0.0.5")).unwrap();
        assert_eq!(r.to_string(), "static reservation on network 'default' with ip 10.0.0.5");
        let r = Reservation::new_dynamic("private").unwrap();
        assert_eq!(r.to_string(), "dynamic reservation on network 'private'");
    }

    #[test]
    fn test_deserialize_from_yaml() {
        let yaml = "network: default\ntype: static\nip: 10.0.0.6\nreserved: true\n";
        let r: Reservation = serde_yaml::from_str(yaml).unwrap();
        assert!(r.is_static());
        assert!(r.is_reserved());
        assert_eq!(r.ip(), Some(ip("10.0.0.6")));
    }

    #[test]
    fn test_deserialize_rejects_static_without_ip() {
        let yaml = "network: default\ntype: static\n";
        assert!(serde_yaml::from_str::<Reservation>(yaml).is_err());
    }

    #[test]
    fn test_serialize_json_shape() {
        let r = Reservation::new_dynamic("default").unwrap();
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"network": "default", "type": "dynamic", "reserved": false})
        );
    }

    #[test]
    fn test_reservation_type_parse() {
        assert_eq!(ReservationType::parse("static").unwrap(), ReservationType::Static);
        assert_eq!(ReservationType::parse("Dynamic").unwrap(), ReservationType::Dynamic);
        assert!(ReservationType::parse("manual").is_err());
    }
}
