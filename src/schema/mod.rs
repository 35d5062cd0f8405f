//! Serde data model: workflows (YAML) and events (JSON).

mod event;
mod workflow;

pub use event::{
    ChangeStatus, CommitEvent, Event, FileAction, FileEvent, FileStatus, HookEvent, PENDING_SHA,
    PushEvent, ToolEvent, ZERO_SHA,
};
pub use workflow::{
    CommitTrigger, Concurrency, FileTrigger, HooksTrigger, On, PushTrigger, Step, ToolTrigger,
    Workflow,
};
