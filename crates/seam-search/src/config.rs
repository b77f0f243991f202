//! Search configuration and validation.

use seam_core::SearchError;

/// Tunables shared by every locator an engine creates.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchConfig {
    /// Number of master candidates kept per slave node. Default: 40.
    pub patch_size: usize,
    /// Slack (in side-parameter units) allowed when deciding whether a
    /// projection lands on a master side. Default: 0.0.
    pub tangential_tolerance: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            patch_size: 40,
            tangential_tolerance: 0.0,
        }
    }
}

impl SearchConfig {
    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.patch_size == 0 {
            return Err(SearchError::InvalidConfig {
                reason: "patch_size must be at least 1".to_string(),
            });
        }
        if !self.tangential_tolerance.is_finite() || self.tangential_tolerance < 0.0 {
            return Err(SearchError::InvalidConfig {
                reason: format!(
                    "tangential_tolerance must be finite and non-negative, got {}",
                    self.tangential_tolerance
                ),
            });
        }
        Ok(())
    }
}
