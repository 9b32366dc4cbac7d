//! Program configuration.

use crate::error::OptionsError;
use serde::{Deserialize, Serialize};

/// Options a [`crate::Program`] is created with. Every key is optional.
///
/// ```json
/// { "threads": 4, "cascade": false }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgramOptions {
    /// Size of a dedicated worker pool. `None` uses the global rayon pool.
    pub threads: Option<usize>,
    /// Default for [`AnalyzeOptions::cascade`].
    pub cascade: bool,
}

impl Default for ProgramOptions {
    fn default() -> Self {
        Self {
            threads: None,
            cascade: true,
        }
    }
}

impl ProgramOptions {
    pub fn from_json(text: &str) -> Result<Self, OptionsError> {
        let options: ProgramOptions = serde_json::from_str(text)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), OptionsError> {
        match self.threads {
            Some(0) => Err(OptionsError::ZeroThreads),
            _ => Ok(()),
        }
    }

    pub fn analyze_options(&self) -> AnalyzeOptions {
        AnalyzeOptions {
            cascade: self.cascade,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyzeOptions {
    /// Re-analyze the programs that reference this one afterwards.
    pub cascade: bool,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self { cascade: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_object() {
        let options = ProgramOptions::from_json("{}").unwrap();
        assert_eq!(options, ProgramOptions::default());
        assert!(options.analyze_options().cascade);
    }

    #[test]
    fn test_camel_case_keys() {
        let options = ProgramOptions::from_json(r#"{"threads": 2, "cascade": false}"#).unwrap();
        assert_eq!(options.threads, Some(2));
        assert!(!options.cascade);
    }

    #[test]
    fn test_zero_threads_rejected() {
        let err = ProgramOptions::from_json(r#"{"threads": 0}"#).unwrap_err();
        assert!(matches!(err, OptionsError::ZeroThreads));
        assert!(ProgramOptions::from_json("[").is_err());
    }
}
