use super::Scope;
use crate::error::TriggerError;
use crate::expr::{Expr, ExprError, to_text, truthy};
use crate::git::{extract_branch, extract_tag};
use crate::glob::{Filter, PatternList};
use crate::schema::{
    CommitTrigger, Event, FileTrigger, HooksTrigger, PushTrigger, ToolEvent, ToolTrigger,
};

/// One compiled trigger kind from a workflow's `on` block.
#[derive(Debug, Clone)]
pub enum TriggerKind {
    Hooks {
        types: Vec<String>,
        tools: Vec<String>,
    },
    Tool(ToolMatcher),
    Tools(Vec<ToolMatcher>),
    File {
        types: Vec<String>,
        paths: Filter,
    },
    Commit {
        paths: Filter,
    },
    Push {
        paths: Filter,
        branches: Filter,
        tags: Filter,
    },
}

impl TriggerKind {
    pub fn hooks(t: &HooksTrigger) -> Self {
        TriggerKind::Hooks {
            types: t.types.clone(),
            tools: t.tools.clone(),
        }
    }

    pub fn file(t: &FileTrigger) -> Self {
        TriggerKind::File {
            types: t.types.clone(),
            paths: Filter::new(&t.paths, &t.paths_ignore),
        }
    }

    pub fn commit(t: &CommitTrigger) -> Self {
        TriggerKind::Commit {
            paths: Filter::new(&t.paths, &t.paths_ignore),
        }
    }

    pub fn push(t: &PushTrigger) -> Self {
        TriggerKind::Push {
            paths: Filter::new(&t.paths, &t.paths_ignore),
            branches: Filter::new(&t.branches, &t.branches_ignore),
            tags: Filter::new(&t.tags, &t.tags_ignore),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TriggerKind::Hooks { .. } => "hooks",
            TriggerKind::Tool(_) => "tool",
            TriggerKind::Tools(_) => "tools",
            TriggerKind::File { .. } => "file",
            TriggerKind::Commit { .. } => "commit",
            TriggerKind::Push { .. } => "push",
        }
    }

    /// Glob and expression compile errors.
    pub fn errors(&self) -> Vec<String> {
        let prefix = self.label();
        let mut out = Vec::new();
        match self {
            TriggerKind::Hooks { .. } => {}
            TriggerKind::Tool(m) => out.extend(m.errors()),
            TriggerKind::Tools(ms) => ms.iter().for_each(|m| out.extend(m.errors())),
            TriggerKind::File { paths, .. } | TriggerKind::Commit { paths } => {
                out.extend(paths.errors().map(|e| format!("{prefix}: {e}")));
            }
            TriggerKind::Push {
                paths,
                branches,
                tags,
            } => {
                let all = paths.errors().chain(branches.errors()).chain(tags.errors());
                out.extend(all.map(|e| format!("{prefix}: {e}")));
            }
        }
        out
    }

    pub fn evaluate(&self, scope: &Scope<'_>) -> Result<bool, TriggerError> {
        let event = scope.event;
        match self {
            TriggerKind::Hooks { types, tools } => Ok(match_hooks(types, tools, event)),
            TriggerKind::Tool(m) => m.evaluate(scope),
            TriggerKind::Tools(ms) => {
                let mut first_err = None;
                for m in ms {
                    match m.evaluate(scope) {
                        Ok(true) => return Ok(true),
                        Ok(false) => {}
                        Err(e) => {
                            first_err.get_or_insert(e);
                        }
                    }
                }
                first_err.map_or(Ok(false), Err)
            }
            TriggerKind::File { types, paths } => Ok(event.file.as_ref().is_some_and(|f| {
                (types.is_empty() || types.iter().any(|t| t == f.action.as_str()))
                    && paths.passes(&f.path)
            })),
            TriggerKind::Commit { paths } => Ok(event
                .commit
                .as_ref()
                .is_some_and(|c| c.files.iter().any(|f| paths.passes(&f.path)))),
            TriggerKind::Push {
                paths,
                branches,
                tags,
            } => Ok(event.push.as_ref().is_some_and(|p| {
                let ref_ok = match_ref(&p.git_ref, branches, tags);
                let paths_ok = !paths.is_declared()
                    || p.commits
                        .iter()
                        .flat_map(|c| &c.files)
                        .any(|f| paths.passes(&f.path));
                ref_ok && paths_ok
            })),
        }
    }
}

fn match_hooks(types: &[String], tools: &[String], event: &Event) -> bool {
    let Some(hook) = &event.hook else {
        return false;
    };
    let type_ok = types.is_empty() || types.contains(&hook.hook_type);
    let tool_ok = tools.is_empty()
        || hook
            .tool
            .as_ref()
            .is_some_and(|t| tools.contains(&t.name));
    type_ok && tool_ok
}

/// Branch refs go through the branch filters, tag refs through the tag
/// filters. With no ref filters at all, any ref matches.
fn match_ref(git_ref: &str, branches: &Filter, tags: &Filter) -> bool {
    if !branches.is_declared() && !tags.is_declared() {
        return true;
    }
    let branch = extract_branch(git_ref);
    if !branch.is_empty() {
        return branches.is_declared() && branches.passes(branch);
    }
    let tag = extract_tag(git_ref);
    if !tag.is_empty() {
        return tags.is_declared() && tags.passes(tag);
    }
    false
}

/// A single `tool` trigger: name, argument globs and an optional `if`.
#[derive(Debug, Clone)]
pub struct ToolMatcher {
    label: String,
    name: String,
    args: Vec<(String, PatternList)>,
    condition: Option<Result<Expr, ExprError>>,
}

impl ToolMatcher {
    pub fn new(label: String, t: &ToolTrigger) -> Self {
        let mut args: Vec<(String, PatternList)> = t
            .args
            .iter()
            .map(|(k, pattern)| (k.clone(), PatternList::new(std::slice::from_ref(pattern))))
            .collect();
        args.sort_by(|a, b| a.0.cmp(&b.0));
        Self {
            label,
            name: t.name.clone(),
            args,
            condition: t.condition.as_deref().map(Expr::parse),
        }
    }

    fn errors(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .args
            .iter()
            .flat_map(|(k, p)| p.errors().iter().map(move |e| format!("{}: args.{k}: {e}", self.label)))
            .collect();
        if let Some(Err(e)) = &self.condition {
            out.push(format!("{}: if: {e}", self.label));
        }
        out
    }

    fn args_match(&self, tool: &ToolEvent) -> bool {
        self.args.iter().all(|(name, patterns)| match tool.args.get(name) {
            None | Some(serde_json::Value::Null) => false,
            Some(value) => patterns.any_match(&to_text(value)),
        })
    }

    fn evaluate(&self, scope: &Scope<'_>) -> Result<bool, TriggerError> {
        let Some(tool) = &scope.event.tool else {
            return Ok(false);
        };
        if tool.name != self.name || !self.args_match(tool) {
            return Ok(false);
        }
        let wrap = |source| TriggerError {
            trigger: self.label.clone(),
            source,
        };
        match &self.condition {
            None => Ok(true),
            Some(Err(e)) => Err(wrap(e.clone())),
            Some(Ok(expr)) => {
                expr.evaluate(scope.context())
                    .map(|v| truthy(&v))
                    .map_err(wrap)
            }
        }
    }
}
