use crate::error::{LinkageError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for a linker run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkerConfig {
    /// Largest distance at which a pair becomes a link (inclusive).
    /// Default: 0.5
    pub threshold: f64,

    /// Tag stored on every emitted link. Default: "SIBLING"
    pub link_type: String,

    /// Prefix of each link's provenance string. Default: "linker"
    pub provenance: String,

    /// Role of the set1 record. Default: "baby"
    pub stored_role: String,

    /// Role of the set2 record. Default: "baby"
    pub query_role: String,

    /// How many progress lines to log over a full pass. 0 disables.
    /// Default: 10
    pub progress_updates: usize,
}

impl Default for LinkerConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            link_type: crate::relations::link_types::SIBLING.into(),
            provenance: "linker".into(),
            stored_role: crate::relations::roles::BABY.into(),
            query_role: crate::relations::roles::BABY.into(),
            progress_updates: 10,
        }
    }
}

impl LinkerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_link_type(mut self, link_type: impl Into<String>) -> Self {
        self.link_type = link_type.into();
        self
    }

    pub fn with_provenance(mut self, provenance: impl Into<String>) -> Self {
        self.provenance = provenance.into();
        self
    }

    pub fn with_roles(mut self, stored: impl Into<String>, query: impl Into<String>) -> Self {
        self.stored_role = stored.into();
        self.query_role = query.into();
        self
    }

    pub fn with_progress_updates(mut self, updates: usize) -> Self {
        self.progress_updates = updates;
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.threshold)?;
        if self.link_type.trim().is_empty() {
            return Err(LinkageError::Validation("link_type must not be empty".into()));
        }
        Ok(())
    }
}

pub(crate) fn validate_threshold(threshold: f64) -> Result<()> {
    if threshold.is_nan() || threshold < 0.0 {
        return Err(LinkageError::Validation(format!(
            "threshold must be >= 0, got {}",
            threshold
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LinkerConfig::default();
        assert_eq!(config.threshold, 0.5);
        assert_eq!(config.link_type, "SIBLING");
        assert_eq!(config.stored_role, "baby");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = LinkerConfig::new()
            .with_threshold(f64::INFINITY)
            .with_link_type("IDENTITY")
            .with_roles("baby", "deceased")
            .with_provenance("birth-death")
            .with_progress_updates(0);
        assert_eq!(config.query_role, "deceased");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        assert!(LinkerConfig::new().with_threshold(-1.0).validate().is_err());
        assert!(LinkerConfig::new().with_threshold(f64::NAN).validate().is_err());
        assert!(LinkerConfig::new().with_link_type(" ").validate().is_err());
    }
}
