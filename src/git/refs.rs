use super::{GitClassifier, GitOperation};

const HEADS_PREFIX: &str = "refs/heads/";
const TAGS_PREFIX: &str = "refs/tags/";

/// `git push` options whose value is a separate word.
const PUSH_VALUE_OPTIONS: &[&str] = &["-o", "--push-option", "--repo", "--receive-pack", "--exec"];

/// Branch name of a `refs/heads/...` ref, or `""` for anything else.
pub fn extract_branch(git_ref: &str) -> &str {
    git_ref.strip_prefix(HEADS_PREFIX).unwrap_or("")
}

/// Tag name of a `refs/tags/...` ref, or `""` for anything else.
pub fn extract_tag(git_ref: &str) -> &str {
    git_ref.strip_prefix(TAGS_PREFIX).unwrap_or("")
}

/// Positional (non-option) arguments of a `git push` invocation.
fn positionals(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut options_done = false;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if !options_done {
            if arg == "--" {
                options_done = true;
                continue;
            }
            if PUSH_VALUE_OPTIONS.contains(&arg.as_str()) {
                iter.next();
                continue;
            }
            if arg.starts_with('-') {
                continue;
            }
        }
        out.push(arg.as_str());
    }
    out
}

/// Turn a refspec into a full ref name.
///
/// The classifier cannot ask git which refs exist, so a name that differs
/// from the checked-out branch is taken to be a tag.
/// Deletes (`:dst`) go through the same rule as any other destination.
fn qualify(refspec: &str, current_branch: &str) -> String {
    let stripped = refspec.trim_start_matches('+');
    let name = match stripped.split_once(':') {
        Some((src, "")) => src,
        Some((_, dst)) => dst,
        None => stripped,
    };
    if name.starts_with(HEADS_PREFIX) || name.starts_with(TAGS_PREFIX) {
        return name.to_string();
    }
    if name == "HEAD" || name == current_branch {
        return format!("{HEADS_PREFIX}{current_branch}");
    }
    format!("{TAGS_PREFIX}{name}")
}

impl GitClassifier {
    /// Destination ref of the first push statement in `command`.
    ///
    /// The first positional argument names the remote and the second the
    /// refspec. Without a refspec the current branch is pushed.
    pub fn push_ref(&self, command: &str, current_branch: &str) -> String {
        let args = self
            .arguments(command, GitOperation::Push)
            .unwrap_or_default();
        match positionals(&args).get(1) {
            Some(refspec) => qualify(refspec, current_branch),
            None => format!("{HEADS_PREFIX}{current_branch}"),
        }
    }
}

/// Extract the destination ref of a `git push` command line.
pub fn extract_push_ref(command: &str, current_branch: &str) -> String {
    GitClassifier::default().push_ref(command, current_branch)
}
