use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;
use strum::EnumIter;

use crate::errors::{LimsError, Result};

/// Which hosted instance a CI run deploys to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum DeployMode {
    Test,
    Prod,
    Both,
}

pub const TEST_BRANCH: &str = "test_deploy";
pub const PROD_BRANCH: &str = "deploy";

impl DeployMode {
    /// Branches to force-update, in push order
    pub fn branches(&self) -> &'static [&'static str] {
        match self {
            DeployMode::Test => &[TEST_BRANCH],
            DeployMode::Prod => &[PROD_BRANCH],
            DeployMode::Both => &[TEST_BRANCH, PROD_BRANCH],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeployMode::Test => "test",
            DeployMode::Prod => "prod",
            DeployMode::Both => "both",
        }
    }

    /// Read `deploy_mode.txt`, or `deploy_mode.yaml` / `.yml`
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            LimsError::deploy_mode(format!("Cannot read {}: {}", path.display(), e))
        })?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&text),
            _ => text.parse(),
        }
    }

    /// A bare scalar or a mapping with a `deploy_mode` key
    pub fn from_yaml(text: &str) -> Result<Self> {
        let value: serde_yaml::Value = serde_yaml::from_str(text)
            .map_err(|e| LimsError::deploy_mode(format!("Invalid deploy mode YAML: {}", e)))?;

        let raw = match &value {
            serde_yaml::Value::String(s) => s.as_str(),
            serde_yaml::Value::Mapping(map) => map
                .get("deploy_mode")
                .and_then(|v| v.as_str())
                .ok_or_else(|| LimsError::deploy_mode("YAML has no 'deploy_mode' string"))?,
            _ => return Err(LimsError::deploy_mode("Deploy mode must be a string")),
        };
        raw.parse()
    }
}

impl FromStr for DeployMode {
    type Err = LimsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "test" => Ok(DeployMode::Test),
            "prod" => Ok(DeployMode::Prod),
            "both" => Ok(DeployMode::Both),
            other => Err(LimsError::deploy_mode(format!(
                "Invalid deploy mode '{}'. Valid: test, prod, both",
                other
            ))),
        }
    }
}

impl fmt::Display for DeployMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn modes_map_to_branches() {
        assert_eq!(DeployMode::Test.branches(), &["test_deploy"]);
        assert_eq!(DeployMode::Prod.branches(), &["deploy"]);
        assert_eq!(DeployMode::Both.branches(), &["test_deploy", "deploy"]);
    }

    #[test]
    fn parsing_trims_whitespace_only() {
        assert_eq!("prod\n".parse::<DeployMode>().unwrap(), DeployMode::Prod);
        assert_eq!("  both ".parse::<DeployMode>().unwrap(), DeployMode::Both);
        assert!("Prod".parse::<DeployMode>().is_err());
        assert!("".parse::<DeployMode>().is_err());
        assert!("production".parse::<DeployMode>().is_err());
    }

    #[test]
    fn yaml_forms() {
        assert_eq!(DeployMode::from_yaml("test\n").unwrap(), DeployMode::Test);
        assert_eq!(
            DeployMode::from_yaml("deploy_mode: both\n").unwrap(),
            DeployMode::Both
        );
        assert!(DeployMode::from_yaml("mode: both\n").is_err());
        assert!(DeployMode::from_yaml("- test\n").is_err());
    }

    #[test]
    fn display_round_trips() {
        for mode in DeployMode::iter() {
            assert_eq!(mode.to_string().parse::<DeployMode>().unwrap(), mode);
        }
    }
}
