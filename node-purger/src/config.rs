//! Runtime configuration.

use std::time::Duration;

use serde::Deserialize;
use time::ext::NumericalStdDuration as _;

/// Prefix shared by every environment variable the purger reads.
pub(crate) const ENV_PREFIX: &str = "NODE_PURGER_";

/// Runtime configuration data, read from `NODE_PURGER_*` variables.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct Config {
    /// The cloud project owning the cluster.
    pub(crate) project_id: String,
    /// The cluster whose node pools are purged.
    pub(crate) cluster: String,
    /// Node pools forming the group, comma separated.
    #[serde(default)]
    pub(crate) node_pools: Vec<String>,
    /// Use the local kubeconfig and a static access token instead of the
    /// in-cluster service account and the metadata server.
    #[serde(default)]
    pub(crate) local: bool,
    pub(crate) access_token: Option<String>,
    #[serde(default = "Config::default_step_timeout_seconds")]
    pub(crate) step_timeout_seconds: u64,
    /// Run a cycle every this many seconds instead of once.
    pub(crate) interval_seconds: Option<u64>,
}

impl Config {
    pub(crate) fn from_env() -> Result<Self, envy::Error> {
        Self::from_vars(std::env::vars())
    }

    pub(crate) fn from_vars(
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self, envy::Error> {
        envy::prefixed(ENV_PREFIX)
            .from_iter::<_, Self>(vars)?
            .validated()
    }

    fn validated(mut self) -> Result<Self, envy::Error> {
        self.node_pools.retain(|pool| !pool.trim().is_empty());
        self.access_token = self.access_token.filter(|token| !token.is_empty());
        if self.local && self.access_token.is_none() {
            return Err(envy::Error::Custom(format!(
                "{ENV_PREFIX}ACCESS_TOKEN is required when {ENV_PREFIX}LOCAL is set"
            )));
        }
        Ok(self)
    }

    /// Token to use instead of the metadata server, only for local runs.
    pub(crate) fn static_token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|_| self.local)
    }

    pub(crate) fn step_timeout(&self) -> Duration {
        self.step_timeout_seconds.std_seconds()
    }

    pub(crate) fn interval(&self) -> Option<Duration> {
        self.interval_seconds
            .filter(|seconds| *seconds > 0)
            .map(|seconds| seconds.std_seconds())
    }

    fn default_step_timeout_seconds() -> u64 {
        120
    }
}

#[cfg(test)]
mod tests;
