use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{action::Action, error::RunError};

pub const DEFAULT_WORKSPACE: &str = "./";

/// Host-provided inputs for a single run, gathered once at startup.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct RunConfig {
    pub workspace: Option<PathBuf>,
    pub target: Option<String>,
    pub save_to: Option<String>,
    pub action: Option<String>,
    pub argument: Option<String>,
}

/// Fully validated run request: concrete paths plus a known action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRun {
    pub input: PathBuf,
    pub output: PathBuf,
    pub action: Action,
    pub argument: Option<String>,
}

impl RunConfig {
    /// Values set in `overrides` win over the ones in `self`.
    pub fn merge(self, overrides: RunConfig) -> RunConfig {
        RunConfig {
            workspace: overrides.workspace.or(self.workspace),
            target: overrides.target.or(self.target),
            save_to: overrides.save_to.or(self.save_to),
            action: overrides.action.or(self.action),
            argument: overrides.argument.or(self.argument),
        }
    }

    pub fn workspace(&self) -> &Path {
        self.workspace
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_WORKSPACE))
    }

    /// Validates inputs and resolves paths. Touches no files.
    pub fn resolve(&self) -> Result<ResolvedRun, RunError> {
        let target = non_blank(&self.target).ok_or(RunError::MissingInput("target"))?;
        let input = self.workspace().join(target);
        let output = match non_blank(&self.save_to) {
            Some(save_to) => self.workspace().join(save_to),
            None => input.clone(),
        };
        let action = non_blank(&self.action)
            .ok_or(RunError::MissingInput("action"))?
            .parse::<Action>()?;
        Ok(ResolvedRun {
            input,
            output,
            action,
            argument: self.argument.clone(),
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(target: Option<&str>, save_to: Option<&str>, action: &str) -> RunConfig {
        RunConfig {
            workspace: Some(PathBuf::from("/work")),
            target: target.map(String::from),
            save_to: save_to.map(String::from),
            action: Some(action.into()),
            argument: None,
        }
    }

    #[test]
    fn relative_target_is_joined_onto_workspace() {
        let run = config(Some("pkg/package.json"), None, "get_version")
            .resolve()
            .unwrap();
        assert_eq!(run.input, PathBuf::from("/work/pkg/package.json"));
        assert_eq!(run.output, run.input);
    }

    #[test]
    fn absolute_paths_ignore_workspace() {
        let run = config(Some("/abs/package.json"), Some("/out/package.json"), "set_version")
            .resolve()
            .unwrap();
        assert_eq!(run.input, PathBuf::from("/abs/package.json"));
        assert_eq!(run.output, PathBuf::from("/out/package.json"));
    }

    #[test]
    fn save_to_resolves_against_workspace() {
        let run = config(Some("package.json"), Some("dist/package.json"), "set_version")
            .resolve()
            .unwrap();
        assert_eq!(run.output, PathBuf::from("/work/dist/package.json"));
    }

    #[test]
    fn blank_save_to_falls_back_to_target() {
        let run = config(Some("package.json"), Some("  "), "get_version")
            .resolve()
            .unwrap();
        assert_eq!(run.output, PathBuf::from("/work/package.json"));
    }

    #[test]
    fn missing_target_is_a_config_error() {
        let err = config(None, Some("out.json"), "get_version")
            .resolve()
            .unwrap_err();
        assert!(matches!(err, RunError::MissingInput("target")));
        assert!(err.is_config());
    }

    #[test]
    fn unknown_action_fails_resolution() {
        let err = config(Some("package.json"), None, "delete_everything")
            .resolve()
            .unwrap_err();
        assert_eq!(err.to_string(), "Unknown action: delete_everything");
    }

    #[test]
    fn default_workspace_is_current_dir() {
        let cfg = RunConfig {
            target: Some("package.json".into()),
            action: Some("get_version".into()),
            ..RunConfig::default()
        };
        assert_eq!(cfg.resolve().unwrap().input, PathBuf::from("./package.json"));
    }

    #[test]
    fn merge_prefers_overrides() {
        let file = RunConfig {
            target: Some("a.json".into()),
            action: Some("get_version".into()),
            ..RunConfig::default()
        };
        let cli = RunConfig {
            target: Some("b.json".into()),
            ..RunConfig::default()
        };
        let merged = file.merge(cli);
        assert_eq!(merged.target.as_deref(), Some("b.json"));
        assert_eq!(merged.action.as_deref(), Some("get_version"));
    }
}
