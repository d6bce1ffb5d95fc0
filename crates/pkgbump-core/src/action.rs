use std::{fmt, str::FromStr};

use pkgbump_manifest::{DependencyKind, DependencySpec, Manifest};

use crate::error::RunError;

/// The six get/set operations a run can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SetVersion,
    SetDepVersion,
    SetDevDepVersion,
    GetDepVersion,
    GetDevDepVersion,
    GetVersion,
}

/// Value produced by an action.
///
/// `Null` means the dependency table itself is missing, `Absent` that the
/// field or entry is. Hosts see both as an empty output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResult {
    Value(String),
    Null,
    Absent,
}

impl ActionResult {
    pub fn as_output(&self) -> &str {
        match self {
            ActionResult::Value(value) => value,
            ActionResult::Null | ActionResult::Absent => "",
        }
    }

    fn from_option(value: Option<String>) -> Self {
        value.map_or(ActionResult::Absent, ActionResult::Value)
    }
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::SetVersion,
        Action::SetDepVersion,
        Action::SetDevDepVersion,
        Action::GetDepVersion,
        Action::GetDevDepVersion,
        Action::GetVersion,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Action::SetVersion => "set_version",
            Action::SetDepVersion => "set_dep_version",
            Action::SetDevDepVersion => "set_devdep_version",
            Action::GetDepVersion => "get_dep_version",
            Action::GetDevDepVersion => "get_devdep_version",
            Action::GetVersion => "get_version",
        }
    }

    /// Whether the manifest must be written back after this action.
    pub fn mutates(self) -> bool {
        matches!(
            self,
            Action::SetVersion | Action::SetDepVersion | Action::SetDevDepVersion
        )
    }

    pub fn apply(
        self,
        manifest: &mut Manifest,
        argument: Option<&str>,
    ) -> Result<ActionResult, RunError> {
        let argument = argument.unwrap_or_default();
        match self {
            Action::SetVersion => {
                manifest.set_version(argument);
                Ok(ActionResult::Value(argument.to_string()))
            }
            Action::SetDepVersion => {
                self.set_dependency(manifest, DependencyKind::Dependencies, argument)
            }
            Action::SetDevDepVersion => {
                self.set_dependency(manifest, DependencyKind::DevDependencies, argument)
            }
            Action::GetDepVersion => Ok(get_dependency(
                manifest,
                DependencyKind::Dependencies,
                argument,
            )),
            Action::GetDevDepVersion => Ok(get_dependency(
                manifest,
                DependencyKind::DevDependencies,
                argument,
            )),
            Action::GetVersion => Ok(ActionResult::from_option(manifest.version_text())),
        }
    }

    fn set_dependency(
        self,
        manifest: &mut Manifest,
        kind: DependencyKind,
        argument: &str,
    ) -> Result<ActionResult, RunError> {
        let mut tokens = argument.split_whitespace();
        let name = tokens.next().ok_or_else(|| RunError::Operation {
            action: self,
            message: "argument must be `<name> <version>`".into(),
        })?;
        let version = tokens.next();
        let dropped = tokens.count();
        if dropped > 0 {
            tracing::warn!(action = %self, dropped, "ignoring extra argument tokens");
        }

        let table = manifest.table_mut_or_default(kind);
        match version {
            Some(version) => {
                tracing::debug!(table = kind.key(), name, version, "setting dependency");
                table.set(name, version);
                Ok(ActionResult::Value(version.to_string()))
            }
            None => {
                // A name without a version clears the entry; the result has no value.
                tracing::warn!(table = kind.key(), name, "no version given; removing entry");
                table.remove(name);
                Ok(ActionResult::Absent)
            }
        }
    }
}

fn get_dependency(manifest: &Manifest, kind: DependencyKind, name: &str) -> ActionResult {
    match manifest.table(kind) {
        Some(table) => {
            ActionResult::from_option(table.get(name).and_then(DependencySpec::text))
        }
        // Present but not an object: there is no entry to look up.
        None if manifest.extra(kind.key()).is_some() => ActionResult::Absent,
        None => ActionResult::Null,
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Action {
    type Err = RunError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|action| action.name() == s)
            .ok_or_else(|| RunError::UnknownAction(s.to_string()))
    }
}
