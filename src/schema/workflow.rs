use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A policy workflow as authored in YAML.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Workflow {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Absent means blocking; see [`Workflow::is_blocking`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocking: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<Concurrency>,
    #[serde(default)]
    pub on: On,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, String>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Workflow {
    pub fn is_blocking(&self) -> bool {
        self.blocking.unwrap_or(true)
    }

    pub fn from_yaml(source: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&source)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Concurrency {
    pub group: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_parallel: Option<u32>,
}

/// Trigger conditions. Any subset may be declared; the workflow matches
/// when any declared kind matches.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct On {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hooks: Option<HooksTrigger>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<ToolTrigger>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolTrigger>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FileTrigger>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<CommitTrigger>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push: Option<PushTrigger>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct HooksTrigger {
    /// `preToolUse`, `postToolUse`. Empty means any.
    #[serde(default)]
    pub types: Vec<String>,
    /// Tool names. Empty means any.
    #[serde(default)]
    pub tools: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ToolTrigger {
    pub name: String,
    /// Argument name to glob over the argument's text form.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub args: HashMap<String, String>,
    #[serde(default, rename = "if", skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct FileTrigger {
    /// `create`, `edit`. Empty means any.
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub paths: Vec<String>,
    #[serde(default)]
    pub paths_ignore: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct CommitTrigger {
    #[serde(default)]
    pub paths: Vec<String>,
    #[serde(default)]
    pub paths_ignore: Vec<String>,
    /// Parsed but not evaluated: a pending commit carries no branch.
    #[serde(default)]
    pub branches: Vec<String>,
    #[serde(default)]
    pub branches_ignore: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PushTrigger {
    #[serde(default)]
    pub paths: Vec<String>,
    #[serde(default)]
    pub paths_ignore: Vec<String>,
    #[serde(default)]
    pub branches: Vec<String>,
    #[serde(default)]
    pub branches_ignore: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub tags_ignore: Vec<String>,
}

/// A workflow step. Executed by the step runner, carried here only so
/// workflows round-trip.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Step {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, rename = "if", skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uses: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub with: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<String>,
    /// Seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(default)]
    pub continue_on_error: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORKFLOW: &str = r#"
name: protect-main
description: Block pushes to main
concurrency:
  group: git
  max-parallel: 2
on:
  push:
    branches: [main]
  tool:
    name: bash
    args:
      command: "rm *"
    if: "env.STRICT == 'true'"
env:
  STRICT: "true"
steps:
  - name: Refuse
    run: exit 1
    continue-on-error: false
    working-directory: /tmp
    timeout: 30
"#;

    #[test]
    fn parses_full_workflow() {
        let wf = Workflow::from_yaml(WORKFLOW).unwrap();
        assert_eq!(wf.name, "protect-main");
        assert!(wf.is_blocking());
        assert_eq!(wf.concurrency.as_ref().unwrap().max_parallel, Some(2));
        assert_eq!(wf.on.push.as_ref().unwrap().branches, vec!["main"]);
        let tool = wf.on.tool.as_ref().unwrap();
        assert_eq!(tool.args["command"], "rm *");
        assert_eq!(tool.condition.as_deref(), Some("env.STRICT == 'true'"));
        assert_eq!(wf.env["STRICT"], "true");
        assert_eq!(wf.steps[0].working_directory.as_deref(), Some("/tmp"));
        assert_eq!(wf.steps[0].timeout, Some(30));
    }

    #[test]
    fn blocking_defaults_to_true() {
        let wf = Workflow::from_yaml("name: x\non: {}\n").unwrap();
        assert!(wf.is_blocking());
        let wf = Workflow::from_yaml("name: x\nblocking: false\n").unwrap();
        assert!(!wf.is_blocking());
    }

    #[test]
    fn kebab_case_filters() {
        let wf = Workflow::from_yaml(
            "name: x\non:\n  file:\n    paths-ignore: ['**/*.md']\n  push:\n    tags-ignore: ['v0*']\n",
        )
        .unwrap();
        assert_eq!(wf.on.file.unwrap().paths_ignore, vec!["**/*.md"]);
        assert_eq!(wf.on.push.unwrap().tags_ignore, vec!["v0*"]);
    }

    #[test]
    fn rejects_malformed_yaml() {
        assert!(matches!(
            Workflow::from_yaml("name: [unclosed"),
            Err(Error::Yaml(_))
        ));
    }
}
