use super::{GitClassifier, GitOperation};

/// Short boolean flags of `git commit` that may precede `m` in a cluster (`-am`).
const CLUSTER_FLAGS: &str = "aenqsv";

/// Split a statement into raw words on whitespace outside quotes.
///
/// Unlike shlex tokenizing, quote characters are kept so the message can be
/// returned verbatim.
fn raw_words(statement: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let mut start: Option<usize> = None;
    let (mut sq, mut dq, mut esc) = (false, false, false);

    for (i, c) in statement.char_indices() {
        if esc {
            esc = false;
            continue;
        }
        match c {
            '\\' if !sq => esc = true,
            '\'' if !dq => sq = !sq,
            '"' if !sq => dq = !dq,
            c if c.is_whitespace() && !sq && !dq => {
                if let Some(s) = start.take() {
                    words.push(&statement[s..i]);
                }
                continue;
            }
            _ => {}
        }
        if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        words.push(&statement[s..]);
    }
    words
}

/// The text between a leading quote and its matching close, verbatim.
/// Bare words are returned unchanged.
fn unquote(word: &str) -> &str {
    let Some(quote) = word.chars().next().filter(|c| *c == '\'' || *c == '"') else {
        return word;
    };
    let body = &word[1..];
    let mut escaped = false;
    for (i, c) in body.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if c == '\\' && quote == '"' {
            escaped = true;
            continue;
        }
        if c == quote {
            return &body[..i];
        }
    }
    body
}

/// If `word` carries the message flag, what follows the flag inside the
/// same word: `Some("")` when the value is the next word.
fn message_flag(word: &str) -> Option<&str> {
    if word == "--message" {
        return Some("");
    }
    if let Some(value) = word.strip_prefix("--message=") {
        return Some(value);
    }
    let cluster = word.strip_prefix('-').filter(|w| !w.starts_with('-'))?;
    let m = cluster.find('m')?;
    cluster[..m]
        .chars()
        .all(|c| CLUSTER_FLAGS.contains(c))
        .then(|| &cluster[m + 1..])
}

/// Extract the commit message from a statement, joining repeated `-m`
/// values with a blank line the way git does.
fn message_from_statement(statement: &str) -> String {
    let words = raw_words(statement);
    let mut paragraphs = Vec::new();
    let mut i = 0;
    while i < words.len() {
        if let Some(attached) = message_flag(words[i]) {
            if attached.is_empty() {
                if let Some(next) = words.get(i + 1) {
                    paragraphs.push(unquote(next));
                    i += 1;
                }
            } else {
                paragraphs.push(unquote(attached));
            }
        }
        i += 1;
    }
    paragraphs.join("\n\n")
}

impl GitClassifier {
    /// Message of the first commit statement in `command`, or `""` when it
    /// has no `-m` flag (e.g. `--amend`) or there is no commit at all.
    pub fn commit_message(&self, command: &str) -> String {
        self.find_statement(command, GitOperation::Commit)
            .map(|s| message_from_statement(&s))
            .unwrap_or_default()
    }
}

/// Extract the commit message of a `git commit` command line.
pub fn extract_commit_message(command: &str) -> String {
    GitClassifier::default().commit_message(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_quotes() {
        assert_eq!(
            extract_commit_message("git commit -m \"feat: add feature\""),
            "feat: add feature"
        );
    }

    #[test]
    fn single_quotes() {
        assert_eq!(extract_commit_message("git commit -m 'fix: bug fix'"), "fix: bug fix");
    }

    #[test]
    fn no_message_flag() {
        assert_eq!(extract_commit_message("git commit --amend"), "");
    }

    #[test]
    fn message_in_later_statement() {
        assert_eq!(extract_commit_message("git add . && git commit -m \"done\""), "done");
    }

    #[test]
    fn trailing_statement_does_not_leak() {
        assert_eq!(
            extract_commit_message("git commit -m 'one' && echo -m 'two'"),
            "one"
        );
    }

    #[test]
    fn verbatim_escapes() {
        assert_eq!(
            extract_commit_message(r#"git commit -m "say \"hi\"""#),
            r#"say \"hi\""#
        );
    }

    #[test]
    fn cluster_flag() {
        assert_eq!(extract_commit_message("git commit -am 'all'"), "all");
    }

    #[test]
    fn long_flag() {
        assert_eq!(extract_commit_message("git commit --message='long'"), "long");
        assert_eq!(extract_commit_message("git commit --message \"long\""), "long");
    }

    #[test]
    fn bare_word() {
        assert_eq!(extract_commit_message("git commit -m wip"), "wip");
    }

    #[test]
    fn repeated_flags() {
        assert_eq!(
            extract_commit_message("git commit -m 'title' -m 'body'"),
            "title\n\nbody"
        );
    }

    #[test]
    fn not_a_commit() {
        assert_eq!(extract_commit_message("echo -m 'x'"), "");
    }
}
