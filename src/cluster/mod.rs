//! Cluster descriptor.
//!
//! # Responsibilities
//! - Describe this node's role within the cluster
//! - Carry the load-balancing policy identifier for the forwarding tier
//!
//! # Design Decisions
//! - Plain immutable value, built once by the configuration loader
//! - The dispatcher stores and exposes it but never branches on it
//! - Policy is an identifier only; selection algorithms live elsewhere

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Role of this node within the cluster.
///
/// Deserialized through [`FromStr`], so config values are case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub enum ClusterRole {
    /// Not part of a cluster; serves everything itself.
    #[default]
    Standalone,
    /// Accepts client traffic and distributes it across workers.
    Master,
    /// Receives traffic forwarded by a master.
    Worker,
}

impl ClusterRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterRole::Standalone => "standalone",
            ClusterRole::Master => "master",
            ClusterRole::Worker => "worker",
        }
    }
}

impl fmt::Display for ClusterRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClusterRole {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standalone" => Ok(ClusterRole::Standalone),
            "master" => Ok(ClusterRole::Master),
            "worker" => Ok(ClusterRole::Worker),
            _ => Err(UnknownVariant::new("cluster role", s)),
        }
    }
}

impl TryFrom<String> for ClusterRole {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClusterRole> for String {
    fn from(role: ClusterRole) -> Self {
        role.as_str().to_string()
    }
}

/// Load-balancing policy identifier consulted by the forwarding tier.
///
/// Unrecognised identifiers are kept verbatim in [`LoadPolicy::Other`]; the
/// node never interprets the policy itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum LoadPolicy {
    #[default]
    RoundRobin,
    Random,
    WeightedRoundRobin,
    LeastConnections,
    IpHash,
    Other(String),
}

impl LoadPolicy {
    pub fn as_str(&self) -> &str {
        match self {
            LoadPolicy::RoundRobin => "round_robin",
            LoadPolicy::Random => "random",
            LoadPolicy::WeightedRoundRobin => "weighted_round_robin",
            LoadPolicy::LeastConnections => "least_connections",
            LoadPolicy::IpHash => "ip_hash",
            LoadPolicy::Other(name) => name,
        }
    }
}

impl fmt::Display for LoadPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoadPolicy {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept both `least_connections` and `least-connections`.
        let policy = match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "round_robin" => LoadPolicy::RoundRobin,
            "random" => LoadPolicy::Random,
            "weighted_round_robin" => LoadPolicy::WeightedRoundRobin,
            "least_connections" => LoadPolicy::LeastConnections,
            "ip_hash" => LoadPolicy::IpHash,
            _ => LoadPolicy::Other(s.to_string()),
        };
        Ok(policy)
    }
}

impl From<String> for LoadPolicy {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(policy) => policy,
            Err(never) => match never {},
        }
    }
}

impl From<LoadPolicy> for String {
    fn from(policy: LoadPolicy) -> Self {
        match policy {
            LoadPolicy::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

/// Returned when a role string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value:?}")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// This node's cluster membership and forwarding policy.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ClusterDescriptor {
    enabled: bool,
    role: ClusterRole,
    /// Whether a master answers requests directly instead of forwarding.
    is_master_handler: bool,
    name: String,
    cluster_id: String,
    load_policy: LoadPolicy,
}

impl ClusterDescriptor {
    /// Descriptor for a node that is not part of any cluster.
    pub fn standalone() -> Self {
        Self::default()
    }

    pub fn builder() -> ClusterDescriptorBuilder {
        ClusterDescriptorBuilder::default()
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn role(&self) -> ClusterRole {
        self.role
    }

    pub fn is_master_handler(&self) -> bool {
        self.is_master_handler
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cluster_id(&self) -> &str {
        &self.cluster_id
    }

    pub fn load_policy(&self) -> &LoadPolicy {
        &self.load_policy
    }
}

/// Builder used by bootstrap code and tests; the built value is frozen.
#[derive(Debug, Default)]
pub struct ClusterDescriptorBuilder {
    inner: ClusterDescriptor,
}

impl ClusterDescriptorBuilder {
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.inner.enabled = enabled;
        self
    }

    pub fn role(mut self, role: ClusterRole) -> Self {
        self.inner.role = role;
        self
    }

    pub fn master_handler(mut self, is_master_handler: bool) -> Self {
        self.inner.is_master_handler = is_master_handler;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.inner.name = name.into();
        self
    }

    pub fn cluster_id(mut self, cluster_id: impl Into<String>) -> Self {
        self.inner.cluster_id = cluster_id.into();
        self
    }

    pub fn load_policy(mut self, policy: LoadPolicy) -> Self {
        self.inner.load_policy = policy;
        self
    }

    pub fn build(self) -> ClusterDescriptor {
        self.inner
    }
}
