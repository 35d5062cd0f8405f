//! Types produced by the shell splitter and consumed by the git classifier.

/// A command line split into top-level statements.
///
/// For `git add . && git commit -m 'x'` there are two segments. Substitution
/// bodies (`$(...)`, backticks, `<(...)`) are not split; they stay inside the
/// segment that contains them and are exposed separately through
/// `substitutions`.
#[derive(Debug, Clone, Default)]
pub struct ParsedPipeline {
    pub segments: Vec<String>,
    /// Inner command text of every top-level substitution, in order.
    pub substitutions: Vec<String>,
}
