use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Sentinel sha for a commit that has not been created yet.
pub const PENDING_SHA: &str = "pending";

/// Sentinel `before` sha for a push whose remote state is unknown.
pub const ZERO_SHA: &str = "0000000000000000000000000000000000000000";

/// The runtime event matched against workflow triggers. Every substructure
/// is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Event {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hook: Option<HookEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<ToolEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FileEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<CommitEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push: Option<PushEvent>,
    #[serde(default)]
    pub cwd: String,
    #[serde(default)]
    pub timestamp: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct HookEvent {
    /// `preToolUse` or `postToolUse`.
    #[serde(rename = "type", default)]
    pub hook_type: String,
    #[serde(default)]
    pub tool: Option<ToolEvent>,
    #[serde(default)]
    pub cwd: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ToolEvent {
    pub name: String,
    #[serde(default)]
    pub args: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hook_type: Option<String>,
}

impl ToolEvent {
    /// A string argument, if present and a string.
    pub fn str_arg(&self, name: &str) -> Option<&str> {
        self.args.get(name).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileAction {
    Create,
    Edit,
}

impl FileAction {
    pub fn as_str(self) -> &'static str {
        match self {
            FileAction::Create => "create",
            FileAction::Edit => "edit",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FileEvent {
    pub path: String,
    pub action: FileAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CommitEvent {
    #[serde(default)]
    pub sha: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub files: Vec<FileStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    Added,
    Modified,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FileStatus {
    pub path: String,
    pub status: ChangeStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PushEvent {
    #[serde(rename = "ref", default)]
    pub git_ref: String,
    #[serde(default)]
    pub before: String,
    #[serde(default)]
    pub after: String,
    #[serde(default)]
    pub commits: Vec<CommitEvent>,
}
