use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Allow => "allow",
            Decision::Deny => "deny",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Decision::Allow => "ALLOW",
            Decision::Deny => "DENY",
        }
    }
}

/// The permission decision returned to the host agent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowResult {
    pub permission_decision: Decision,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission_decision_reason: Option<String>,
}

impl WorkflowResult {
    pub fn allow() -> Self {
        Self {
            permission_decision: Decision::Allow,
            permission_decision_reason: None,
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            permission_decision: Decision::Deny,
            permission_decision_reason: Some(reason.into()),
        }
    }

    /// Wrap in the envelope the host reads from a hook's stdout.
    pub fn hook_output(&self, hook_event_name: &str) -> serde_json::Value {
        let mut inner = serde_json::json!({
            "hookEventName": hook_event_name,
            "permissionDecision": self.permission_decision.as_str(),
        });
        if let Some(reason) = &self.permission_decision_reason {
            inner["permissionDecisionReason"] = reason.clone().into();
        }
        serde_json::json!({ "hookSpecificOutput": inner })
    }
}
