//! agentic-ops: a permission hook for AI coding agents.
//!
//! Before an agent edits a file or runs a shell command, the host asks this
//! crate which policy workflows the action triggers. A raw hook payload is
//! turned into an [`Event`](schema::Event), shell commands that are really
//! `git commit` / `git push` become pending commit and push events, and
//! each workflow's `on` block is matched against the result.
//!
//! # Architecture
//!
//! - **[`glob`]**: path, branch and tag patterns (`*`, `**`).
//! - **[`parse`]**: quote-aware shell splitting and word tokenization.
//! - **[`git`]**: commit/push classification, message and ref extraction.
//! - **[`expr`]**: the `${{ }}` expression language used in `if` conditions.
//! - **[`trigger`]**: compiled workflow triggers and event matching.
//! - **[`hook`]**: event synthesis from hook payloads.
//! - **[`schema`]**: workflow and event data model.
//! - **[`config`]**: embedded defaults plus user overlay.
//! - **[`logging`]**: file logging of match outcomes.

/// Configuration types, loading, and overlay merge logic.
pub mod config;
/// Allow/deny decisions returned to the host.
pub mod decision;
/// Crate-level errors.
pub mod error;
pub mod expr;
/// Git command classification and extraction.
pub mod git;
pub mod glob;
pub mod hook;
/// File-based logging.
pub mod logging;
/// Shell command splitting and tokenization.
pub mod parse;
pub mod schema;
pub mod trigger;

pub use error::{Error, Result, TriggerError};

use hook::{HookConfig, RepoState};
use schema::Workflow;
use trigger::Matcher;

/// Synthesize an event from `payload` with the default configuration and
/// return the names of the workflows it triggers, in order.
///
/// This is the main entry point for tests and simple usage.
/// For CLI usage with user config, build a [`HookConfig`] and [`Matcher`]s directly.
pub fn matching_workflows(
    payload: &serde_json::Value,
    workflows: &[Workflow],
    repo: &dyn RepoState,
) -> Result<Vec<String>> {
    let event = hook::synthesize(payload, &HookConfig::default(), repo)?;
    Ok(workflows
        .iter()
        .map(Matcher::new)
        .filter(|m| m.matches(&event))
        .map(|m| m.name().to_string())
        .collect())
}
