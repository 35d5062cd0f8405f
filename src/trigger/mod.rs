//! Decides whether an [`Event`] satisfies a workflow's `on` block.
//!
//! A [`Matcher`] compiles the `on` block once (globs and `if`
//! expressions) and can then be shared and applied to any number of
//! events. A workflow matches when any of its declared trigger kinds
//! matches; kinds whose event substructure is absent simply do not match.

mod kind;

use std::cell::OnceCell;
use std::collections::HashMap;

use crate::error::TriggerError;
use crate::expr::Context;
use crate::schema::{Event, Workflow};

pub use kind::{ToolMatcher, TriggerKind};

/// Per-evaluation state shared by the trigger kinds. The expression
/// context is only built if some `if` condition needs it.
pub struct Scope<'a> {
    event: &'a Event,
    env: &'a HashMap<String, String>,
    context: OnceCell<Context>,
}

impl<'a> Scope<'a> {
    fn new(event: &'a Event, env: &'a HashMap<String, String>) -> Self {
        Self {
            event,
            env,
            context: OnceCell::new(),
        }
    }

    fn context(&self) -> &Context {
        self.context.get_or_init(|| {
            let event = serde_json::to_value(self.event).unwrap_or_default();
            Context::new(event, self.env.clone())
        })
    }
}

#[derive(Debug, Clone)]
pub struct Matcher {
    name: String,
    env: HashMap<String, String>,
    kinds: Vec<TriggerKind>,
}

impl Matcher {
    pub fn new(workflow: &Workflow) -> Self {
        let on = &workflow.on;
        let mut kinds = Vec::new();

        if let Some(t) = &on.hooks {
            kinds.push(TriggerKind::hooks(t));
        }
        if let Some(t) = &on.tool {
            kinds.push(TriggerKind::Tool(ToolMatcher::new("tool".into(), t)));
        }
        if !on.tools.is_empty() {
            let tools = on
                .tools
                .iter()
                .enumerate()
                .map(|(i, t)| ToolMatcher::new(format!("tools[{i}]"), t))
                .collect();
            kinds.push(TriggerKind::Tools(tools));
        }
        if let Some(t) = &on.file {
            kinds.push(TriggerKind::file(t));
        }
        if let Some(t) = &on.commit {
            kinds.push(TriggerKind::commit(t));
        }
        if let Some(t) = &on.push {
            kinds.push(TriggerKind::push(t));
        }

        Self {
            name: workflow.name.clone(),
            env: workflow.env.clone(),
            kinds,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kinds(&self) -> &[TriggerKind] {
        &self.kinds
    }

    /// Evaluate every declared kind in order, stopping at the first match.
    ///
    /// An `if` condition that fails to parse or evaluate is reported only
    /// when no other kind matched.
    pub fn evaluate(&self, event: &Event) -> Result<bool, TriggerError> {
        let scope = Scope::new(event, &self.env);
        let mut first_err = None;
        for kind in &self.kinds {
            match kind.evaluate(&scope) {
                Ok(true) => return Ok(true),
                Ok(false) => {}
                Err(e) => {
                    first_err.get_or_insert(e);
                }
            }
        }
        first_err.map_or(Ok(false), Err)
    }

    /// Like [`Matcher::evaluate`], treating a failed condition as no match.
    pub fn matches(&self, event: &Event) -> bool {
        match self.evaluate(event) {
            Ok(matched) => matched,
            Err(e) => {
                log::warn!("workflow {:?}: {e}", self.name);
                false
            }
        }
    }

    /// Compile errors: malformed globs and unparseable `if` conditions.
    pub fn validate(&self) -> Vec<String> {
        self.kinds.iter().flat_map(TriggerKind::errors).collect()
    }
}
