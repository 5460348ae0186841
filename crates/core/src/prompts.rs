//! Role Instructions
//!
//! Each agent runs under a fixed system instruction. Defaults ship with the
//! crate; a directory of `*.md` files keyed by file stem can override them.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

const CURRICULUM: &str = include_str!("../prompts/curriculum.md");
const RESOURCE_FINDER: &str = include_str!("../prompts/resource_finder.md");
const PROJECT_PLANNER: &str = include_str!("../prompts/project_planner.md");

/// The instruction text for every agent role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompts {
    pub curriculum: String,
    pub resource_finder: String,
    pub project_planner: String,
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            curriculum: CURRICULUM.to_string(),
            resource_finder: RESOURCE_FINDER.to_string(),
            project_planner: PROJECT_PLANNER.to_string(),
        }
    }
}

impl Prompts {
    /// Loads overrides from `dir`; roles without a file keep their default.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut prompts = Self::default();
        let entries = fs::read_dir(dir)
            .with_context(|| format!("Could not read prompts directory {}", dir.display()))?;
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("md") {
                continue;
            }
            let key = path
                .file_stem()
                .and_then(|s| s.to_str())
                .context("Could not get file stem")?;
            let slot = match key {
                "curriculum" => &mut prompts.curriculum,
                "resource_finder" => &mut prompts.resource_finder,
                "project_planner" => &mut prompts.project_planner,
                other => {
                    warn!(file = %path.display(), key = other, "Ignoring unknown prompt file");
                    continue;
                }
            };
            *slot = fs::read_to_string(&path)
                .with_context(|| format!("Could not read prompt {}", path.display()))?;
            info!(key, "Loaded prompt override");
        }
        Ok(prompts)
    }

    /// Defaults, or overrides from `dir` when one is given.
    pub fn load(dir: Option<&Path>) -> Result<Self> {
        match dir {
            Some(dir) => Self::from_dir(dir),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_embedded() {
        let prompts = Prompts::default();
        assert!(prompts.curriculum.contains("5 to 7"));
        assert!(prompts.resource_finder.contains("web_search"));
        assert!(prompts.project_planner.contains("Title: "));
    }

    #[test]
    fn test_from_dir_overrides_by_stem() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("curriculum.md"), "custom curriculum").unwrap();
        fs::write(dir.path().join("unrelated.md"), "ignored").unwrap();
        fs::write(dir.path().join("project_planner.txt"), "wrong extension").unwrap();

        let prompts = Prompts::from_dir(dir.path()).unwrap();
        assert_eq!(prompts.curriculum, "custom curriculum");
        assert_eq!(prompts.resource_finder, Prompts::default().resource_finder);
        assert_eq!(prompts.project_planner, Prompts::default().project_planner);
    }

    #[test]
    fn test_missing_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(Prompts::load(Some(&missing)).is_err());
        assert_eq!(Prompts::load(None).unwrap(), Prompts::default());
    }
}
