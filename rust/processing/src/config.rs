// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Analysis configuration loaded from environment variables.

use serde::{Deserialize, Serialize};
use toska_core::{Connectivity, Result};

/// Analysis configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Neighborhood used for classification. `None` picks `n8` for 2D and
    /// `n26` for 3D rasters.
    pub connectivity: Option<Connectivity>,
    /// Number of worker threads for parallel processing.
    pub worker_threads: usize,
    /// Maximum number of directed cycles enumerated per object.
    pub cycle_limit: Option<u64>,
}

impl AnalysisConfig {
    /// Load configuration from environment variables.
    ///
    /// - `TOSKA_CONNECTIVITY`: `n4`, `n8`, `n6`, `n18` or `n26`
    /// - `TOSKA_WORKER_THREADS`: defaults to the number of CPUs
    /// - `TOSKA_CYCLE_LIMIT`: unlimited when unset
    ///
    /// Unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self {
            connectivity: std::env::var("TOSKA_CONNECTIVITY")
                .ok()
                .and_then(|s| s.parse().ok()),
            worker_threads: std::env::var("TOSKA_WORKER_THREADS")
                .unwrap_or_else(|_| num_cpus::get().to_string())
                .parse()
                .unwrap_or_else(|_| num_cpus::get()),
            cycle_limit: std::env::var("TOSKA_CYCLE_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok()),
        }
    }

    /// Connectivity to use on a raster of rank `ndim`.
    pub fn connectivity_for(&self, ndim: usize) -> Result<Connectivity> {
        match self.connectivity {
            Some(connectivity) => connectivity.check_ndim(ndim),
            None if ndim == 3 => Ok(Connectivity::N26),
            None => Connectivity::N8.check_ndim(ndim),
        }
    }

    pub fn with_connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = Some(connectivity);
        self
    }

    pub fn with_cycle_limit(mut self, limit: u64) -> Self {
        self.cycle_limit = Some(limit);
        self
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            connectivity: None,
            worker_threads: num_cpus::get(),
            cycle_limit: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toska_core::Error;

    #[test]
    fn default_connectivity_follows_rank() {
        let config = AnalysisConfig::default();
        assert_eq!(config.connectivity_for(2), Ok(Connectivity::N8));
        assert_eq!(config.connectivity_for(3), Ok(Connectivity::N26));
    }

    #[test]
    fn explicit_connectivity_is_checked() {
        let config = AnalysisConfig::default().with_connectivity(Connectivity::N4);
        assert_eq!(config.connectivity_for(2), Ok(Connectivity::N4));
        assert!(matches!(
            config.connectivity_for(3),
            Err(Error::InvalidConnectivity { .. })
        ));
    }

    #[test]
    fn serializes_connectivity_by_name() {
        let config = AnalysisConfig {
            connectivity: Some(Connectivity::N18),
            worker_threads: 2,
            cycle_limit: Some(100),
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"n18\""));
        let back: AnalysisConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
