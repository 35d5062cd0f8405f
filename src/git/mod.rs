//! Git command classification for shell tool invocations.
//!
//! The hook fires before the shell runs, so a commit or push only exists as
//! text. [`GitClassifier`] looks at each statement of a command line and
//! decides whether one of them *is* a `git commit` / `git push`, without
//! being fooled by the phrase appearing inside another command's arguments
//! (`echo "git commit"`).

/// Commit message extraction from `-m` / `--message` flags.
pub mod message;
/// Push destination refs and ref-name helpers.
pub mod refs;

pub use message::extract_commit_message;
pub use refs::{extract_branch, extract_push_ref, extract_tag};

use crate::config::GitConfig;
use crate::parse;

/// Git global options whose value is a separate word (`git -C repo commit`).
const GLOBAL_VALUE_OPTIONS: &[&str] = &[
    "-C",
    "-c",
    "--git-dir",
    "--work-tree",
    "--namespace",
    "--super-prefix",
    "--config-env",
];

/// A git operation the classifier can recognize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitOperation {
    Commit,
    Push,
}

/// Decides which statements of a command line are commits or pushes.
#[derive(Debug, Clone)]
pub struct GitClassifier {
    commit_subcommands: Vec<String>,
    push_subcommands: Vec<String>,
}

impl Default for GitClassifier {
    fn default() -> Self {
        Self {
            commit_subcommands: vec!["commit".into(), "ci".into()],
            push_subcommands: vec!["push".into()],
        }
    }
}

impl GitClassifier {
    pub fn from_config(config: &GitConfig) -> Self {
        Self {
            commit_subcommands: config.commit_subcommands.clone(),
            push_subcommands: config.push_subcommands.clone(),
        }
    }

    fn subcommands(&self, op: GitOperation) -> &[String] {
        match op {
            GitOperation::Commit => &self.commit_subcommands,
            GitOperation::Push => &self.push_subcommands,
        }
    }

    /// Classify a single statement. Returns the operation together with the
    /// statement's words and the index of the subcommand word.
    fn classify_statement(&self, statement: &str) -> Option<(GitOperation, Vec<String>, usize)> {
        let words = parse::command_words(statement);
        let idx = subcommand_index(&words)?;
        let sub = words[idx].as_str();
        [GitOperation::Commit, GitOperation::Push]
            .into_iter()
            .find(|op| self.subcommands(*op).iter().any(|s| s == sub))
            .map(|op| (op, words, idx))
    }

    /// The first statement in `command` performing `op`.
    pub fn find_statement(&self, command: &str, op: GitOperation) -> Option<String> {
        parse::statements(command)
            .into_iter()
            .find(|s| matches!(self.classify_statement(s), Some((found, _, _)) if found == op))
    }

    /// Words following the subcommand of the first statement performing `op`.
    pub(crate) fn arguments(&self, command: &str, op: GitOperation) -> Option<Vec<String>> {
        parse::statements(command).iter().find_map(|s| {
            let (found, mut words, idx) = self.classify_statement(s)?;
            (found == op).then(|| words.split_off(idx + 1))
        })
    }

    /// Every operation present in `command`, in first-seen order.
    pub fn classify(&self, command: &str) -> Vec<GitOperation> {
        let mut ops = Vec::new();
        for statement in parse::statements(command) {
            if let Some((op, _, _)) = self.classify_statement(&statement)
                && !ops.contains(&op)
            {
                ops.push(op);
            }
        }
        ops
    }

    pub fn is_commit(&self, command: &str) -> bool {
        self.find_statement(command, GitOperation::Commit).is_some()
    }

    pub fn is_push(&self, command: &str) -> bool {
        self.find_statement(command, GitOperation::Push).is_some()
    }
}

/// Locate the git subcommand word (e.g. "push" in "git -C repo push origin").
///
/// The first word must be `git` (or a path ending in `/git`); global options
/// between `git` and the subcommand are skipped.
fn subcommand_index(words: &[String]) -> Option<usize> {
    let program = words.first()?;
    let name = program.rsplit('/').next().unwrap_or(program);
    if name != "git" {
        return None;
    }
    let mut i = 1;
    while i < words.len() {
        let word = words[i].as_str();
        if GLOBAL_VALUE_OPTIONS.contains(&word) {
            i += 2;
            continue;
        }
        if word.starts_with('-') {
            i += 1;
            continue;
        }
        return Some(i);
    }
    None
}

/// Whether `command` contains a `git commit` (or `git ci`) statement.
pub fn is_commit_command(command: &str) -> bool {
    GitClassifier::default().is_commit(command)
}

/// Whether `command` contains a `git push` statement.
pub fn is_push_command(command: &str) -> bool {
    GitClassifier::default().is_push(command)
}
