//! Builds an [`Event`] from a raw hook payload.
//!
//! Two payload shapes are accepted: the native event JSON (`hook`, `tool`,
//! `file`, `commit`, `push`, `cwd`, `timestamp`) and the host agent's hook
//! input (`hook_event_name`, `tool_name`, `tool_input`, `cwd`). For shell
//! tools, a `git commit` or `git push` in the command is turned into a
//! pending commit or push event so commit and push triggers can fire
//! before git runs.

mod repo;

use serde::Deserialize;
use serde_json::{Map, Value};

pub use repo::{RepoState, StaticRepoState};

use crate::config::Config;
use crate::error::Result;
use crate::git::{GitClassifier, GitOperation};
use crate::logging::timestamp_now;
use crate::schema::{
    CommitEvent, Event, FileAction, FileEvent, HookEvent, PENDING_SHA, PushEvent, ToolEvent,
    ZERO_SHA,
};

/// Hook input as sent by the host agent.
#[derive(Debug, Deserialize)]
struct HostPayload {
    #[serde(default)]
    hook_event_name: String,
    tool_name: Option<String>,
    #[serde(default)]
    tool_input: Map<String, Value>,
    #[serde(default)]
    cwd: String,
}

impl HostPayload {
    fn detect(payload: &Value) -> bool {
        payload.get("hook_event_name").is_some() || payload.get("tool_name").is_some()
    }

    fn into_event(self) -> Event {
        // PreToolUse -> preToolUse
        let mut chars = self.hook_event_name.chars();
        let hook_type: String = match chars.next() {
            Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
            None => String::new(),
        };

        let tool = self.tool_name.map(|name| ToolEvent {
            name,
            args: self.tool_input,
            hook_type: (!hook_type.is_empty()).then(|| hook_type.clone()),
        });
        let hook = (!hook_type.is_empty()).then(|| HookEvent {
            hook_type,
            tool: None,
            cwd: self.cwd.clone(),
        });

        Event {
            hook,
            tool,
            cwd: self.cwd,
            ..Default::default()
        }
    }
}

/// Tool names and argument names the synthesizer recognizes.
#[derive(Debug, Clone)]
pub struct HookConfig {
    classifier: GitClassifier,
    shell_tools: Vec<String>,
    edit_tools: Vec<String>,
    create_tools: Vec<String>,
    path_args: Vec<String>,
    default_branch: String,
}

impl Default for HookConfig {
    fn default() -> Self {
        Self::from_config(&Config::default_config())
    }
}

impl HookConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            classifier: GitClassifier::from_config(&config.git),
            shell_tools: config.shell.tools.clone(),
            edit_tools: config.files.edit_tools.clone(),
            create_tools: config.files.create_tools.clone(),
            path_args: config.files.path_args.clone(),
            default_branch: config.git.default_branch.clone(),
        }
    }

    pub fn is_shell_tool(&self, name: &str) -> bool {
        self.shell_tools.iter().any(|t| t.eq_ignore_ascii_case(name))
    }

    fn file_action(&self, name: &str) -> Option<FileAction> {
        if self.create_tools.iter().any(|t| t == name) {
            Some(FileAction::Create)
        } else if self.edit_tools.iter().any(|t| t == name) {
            Some(FileAction::Edit)
        } else {
            None
        }
    }

    fn path_arg<'a>(&self, tool: &'a ToolEvent) -> Option<&'a str> {
        self.path_args
            .iter()
            .find_map(|arg| tool.str_arg(arg).filter(|p| !p.is_empty()))
    }
}

/// Turn a raw payload into an [`Event`], filling in what the payload
/// leaves implicit.
pub fn synthesize(payload: &Value, config: &HookConfig, repo: &dyn RepoState) -> Result<Event> {
    let mut event = if HostPayload::detect(payload) {
        HostPayload::deserialize(payload)?.into_event()
    } else {
        Event::deserialize(payload)?
    };

    // hook.tool and tool describe the same invocation
    if let Some(hook) = event.hook.as_mut() {
        if hook.tool.is_none() {
            hook.tool = event.tool.clone();
        } else if event.tool.is_none() {
            event.tool = hook.tool.clone();
        }
        if event.cwd.is_empty() {
            event.cwd = hook.cwd.clone();
        }
    }

    if let Some(tool) = event.tool.clone() {
        if config.is_shell_tool(&tool.name)
            && let Some(command) = tool.str_arg("command")
        {
            synthesize_git(&mut event, command, config, repo);
        }

        if event.file.is_none()
            && let Some(action) = config.file_action(&tool.name)
            && let Some(path) = config.path_arg(&tool)
        {
            event.file = Some(FileEvent {
                path: path.to_string(),
                action,
                content: tool.str_arg("content").map(String::from),
            });
        }
    }

    if event.timestamp.is_empty() {
        event.timestamp = timestamp_now();
    }

    Ok(event)
}

fn synthesize_git(event: &mut Event, command: &str, config: &HookConfig, repo: &dyn RepoState) {
    let classifier = &config.classifier;
    let ops = classifier.classify(command);

    if event.commit.is_none() && ops.contains(&GitOperation::Commit) {
        log::debug!("synthesizing pending commit from {command:?}");
        event.commit = Some(CommitEvent {
            sha: PENDING_SHA.into(),
            message: classifier.commit_message(command),
            author: repo.author(),
            files: repo.staged_files(),
        });
    }

    if event.push.is_none() && ops.contains(&GitOperation::Push) {
        let mut branch = repo.current_branch();
        if branch.is_empty() {
            branch = config.default_branch.clone();
        }
        let git_ref = classifier.push_ref(command, &branch);
        log::debug!("synthesizing push to {git_ref} from {command:?}");
        event.push = Some(PushEvent {
            git_ref,
            before: ZERO_SHA.into(),
            after: PENDING_SHA.into(),
            commits: Vec::new(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ChangeStatus, FileStatus};
    use serde_json::json;

    fn synth(payload: Value) -> Event {
        synthesize(&payload, &HookConfig::default(), &StaticRepoState::new("main")).unwrap()
    }

    #[test]
    fn native_commit_command() {
        let event = synth(json!({
            "tool": { "name": "bash", "args": { "command": "git add . && git commit -m \"feat: x\"" } }
        }));
        let commit = event.commit.unwrap();
        assert_eq!(commit.sha, "pending");
        assert_eq!(commit.message, "feat: x");
        assert!(event.push.is_none());
    }

    #[test]
    fn commit_uses_repo_state() {
        let repo = StaticRepoState::new("dev")
            .with_author("Ada <ada@example.com>")
            .with_files(vec![FileStatus {
                path: "src/main.go".into(),
                status: ChangeStatus::Added,
            }]);
        let payload = json!({ "tool": { "name": "sh", "args": { "command": "git commit -am wip" } } });
        let event = synthesize(&payload, &HookConfig::default(), &repo).unwrap();
        let commit = event.commit.unwrap();
        assert_eq!(commit.author, "Ada <ada@example.com>");
        assert_eq!(commit.files.len(), 1);
        assert_eq!(commit.message, "wip");
    }

    #[test]
    fn push_command() {
        let event = synth(json!({
            "tool": { "name": "PowerShell", "args": { "command": "git push origin v1.0.0" } }
        }));
        let push = event.push.unwrap();
        assert_eq!(push.git_ref, "refs/tags/v1.0.0");
        assert_eq!(push.before, ZERO_SHA);
        assert_eq!(push.after, "pending");
        assert!(push.commits.is_empty());
        assert!(event.commit.is_none());
    }

    #[test]
    fn push_defaults_to_current_branch() {
        let payload = json!({ "tool": { "name": "bash", "args": { "command": "git push" } } });
        let event =
            synthesize(&payload, &HookConfig::default(), &StaticRepoState::new("feature/x"))
                .unwrap();
        assert_eq!(event.push.unwrap().git_ref, "refs/heads/feature/x");

        // unknown branch falls back to the configured default
        let event =
            synthesize(&payload, &HookConfig::default(), &StaticRepoState::default()).unwrap();
        assert_eq!(event.push.unwrap().git_ref, "refs/heads/main");
    }

    #[test]
    fn quoted_phrase_is_not_a_commit() {
        let event = synth(json!({
            "tool": { "name": "bash", "args": { "command": "echo \"git commit -m x\"" } }
        }));
        assert!(event.commit.is_none());
    }

    #[test]
    fn non_shell_tool_ignored() {
        let event = synth(json!({
            "tool": { "name": "python", "args": { "command": "git commit -m x" } }
        }));
        assert!(event.commit.is_none());
    }

    #[test]
    fn existing_commit_is_kept() {
        let event = synth(json!({
            "tool": { "name": "bash", "args": { "command": "git commit -m new" } },
            "commit": { "sha": "abc123", "message": "old" }
        }));
        assert_eq!(event.commit.unwrap().sha, "abc123");
    }

    #[test]
    fn host_payload() {
        let event = synth(json!({
            "hook_event_name": "PreToolUse",
            "tool_name": "Bash",
            "tool_input": { "command": "git commit -m 'ship it'" },
            "cwd": "/work"
        }));
        let hook = event.hook.as_ref().unwrap();
        assert_eq!(hook.hook_type, "preToolUse");
        assert_eq!(hook.tool.as_ref().unwrap().name, "Bash");
        assert_eq!(event.tool.as_ref().unwrap().hook_type.as_deref(), Some("preToolUse"));
        assert_eq!(event.cwd, "/work");
        assert_eq!(event.commit.unwrap().message, "ship it");
    }

    #[test]
    fn hook_tool_fills_top_level_tool() {
        let event = synth(json!({
            "hook": { "type": "postToolUse", "tool": { "name": "edit", "args": { "path": "a.rs" } }, "cwd": "/r" }
        }));
        assert_eq!(event.tool.as_ref().unwrap().name, "edit");
        assert_eq!(event.cwd, "/r");
        assert_eq!(event.file.unwrap().path, "a.rs");
    }

    #[test]
    fn file_tools() {
        let event = synth(json!({
            "tool_name": "Write",
            "tool_input": { "file_path": "docs/new.md", "content": "# hi" }
        }));
        let file = event.file.unwrap();
        assert_eq!(file.action, FileAction::Create);
        assert_eq!(file.path, "docs/new.md");
        assert_eq!(file.content.as_deref(), Some("# hi"));

        let event = synth(json!({ "tool": { "name": "MultiEdit", "args": { "file_path": "x.rs" } } }));
        assert_eq!(event.file.unwrap().action, FileAction::Edit);

        let event = synth(json!({ "tool": { "name": "Edit", "args": {} } }));
        assert!(event.file.is_none());
    }

    #[test]
    fn timestamp_filled_when_empty() {
        let event = synth(json!({}));
        assert_eq!(event.timestamp.len(), "2024-01-01T00:00:00Z".len());
        assert!(event.timestamp.ends_with('Z'));

        let event = synth(json!({ "timestamp": "2020-02-02T02:02:02Z" }));
        assert_eq!(event.timestamp, "2020-02-02T02:02:02Z");
    }

    #[test]
    fn malformed_native_payload() {
        let payload = json!({ "tool": "not an object" });
        assert!(synthesize(&payload, &HookConfig::default(), &StaticRepoState::default()).is_err());
    }
}
