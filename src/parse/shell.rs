use super::types::ParsedPipeline;

/// Split a command at statement separators (&&, ||, ;, |, |&, newline),
/// respecting single/double quotes, backticks, backslash escapes and
/// `$(...)` / `<(...)` / `>(...)` spans.
///
/// Empty segments (blank lines, a trailing `;`) are dropped.
pub fn split_compound_command(command: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut buf = String::new();

    let chars: Vec<char> = command.chars().collect();
    let len = chars.len();
    let mut i = 0;
    let (mut sq, mut dq, mut bt, mut esc) = (false, false, false, false);
    let mut depth: u32 = 0;

    while i < len {
        let c = chars[i];

        if esc {
            buf.push(c);
            esc = false;
            i += 1;
            continue;
        }
        if c == '\\' && !sq {
            esc = true;
            buf.push(c);
            i += 1;
            continue;
        }
        if c == '\'' && !dq && !bt {
            sq = !sq;
            buf.push(c);
            i += 1;
            continue;
        }
        if c == '"' && !sq && !bt {
            dq = !dq;
            buf.push(c);
            i += 1;
            continue;
        }
        if c == '`' && !sq {
            bt = !bt;
            buf.push(c);
            i += 1;
            continue;
        }
        if sq || dq || bt {
            buf.push(c);
            i += 1;
            continue;
        }

        // Substitution spans are never split
        if matches!(c, '$' | '<' | '>') && i + 1 < len && chars[i + 1] == '(' {
            depth += 1;
            buf.push(c);
            buf.push('(');
            i += 2;
            continue;
        }
        if depth > 0 {
            match c {
                '(' => depth += 1,
                ')' => depth -= 1,
                _ => {}
            }
            buf.push(c);
            i += 1;
            continue;
        }

        // &&, ||, |&
        if i + 1 < len && matches!((c, chars[i + 1]), ('&', '&') | ('|', '|') | ('|', '&')) {
            parts.push(buf.trim().to_string());
            buf.clear();
            i += 2;
            continue;
        }

        if matches!(c, '|' | ';' | '\n') {
            parts.push(buf.trim().to_string());
            buf.clear();
            i += 1;
            continue;
        }

        buf.push(c);
        i += 1;
    }

    let tail = buf.trim().to_string();
    if !tail.is_empty() {
        parts.push(tail);
    }

    parts.retain(|p| !p.is_empty());
    parts
}

/// Read a balanced `(...)` body starting just after the opening paren.
///
/// Returns the body and the index just past the closing paren (or `len`
/// when the span is unterminated).
fn take_balanced(chars: &[char], mut i: usize) -> (String, usize) {
    let len = chars.len();
    let mut depth: u32 = 1;
    let mut inner = String::new();
    let (mut sq, mut dq, mut esc) = (false, false, false);

    while i < len {
        let c = chars[i];
        if esc {
            inner.push(c);
            esc = false;
            i += 1;
            continue;
        }
        if c == '\\' && !sq {
            esc = true;
            inner.push(c);
            i += 1;
            continue;
        }
        if c == '\'' && !dq {
            sq = !sq;
        } else if c == '"' && !sq {
            dq = !dq;
        } else if !sq && !dq {
            if c == '(' {
                depth += 1;
            }
            if c == ')' {
                depth -= 1;
                if depth == 0 {
                    return (inner, i + 1);
                }
            }
        }
        inner.push(c);
        i += 1;
    }

    (inner, len)
}

/// Extract command substitution contents from `$(...)`, backticks and
/// process substitutions `<(...)` / `>(...)`.
///
/// Nested substitutions stay inside their parent's body and are picked up
/// when that body is parsed in turn.
///
/// `$()` is extracted even inside double quotes (shell expands it there).
/// Only single quotes block substitution detection.
pub fn extract_substitutions(command: &str) -> Vec<String> {
    let chars: Vec<char> = command.chars().collect();
    let len = chars.len();
    let mut inners = Vec::new();
    let mut i = 0;
    let (mut sq, mut dq, mut esc) = (false, false, false);

    while i < len {
        let c = chars[i];

        if esc {
            esc = false;
            i += 1;
            continue;
        }
        if c == '\\' && !sq {
            esc = true;
            i += 1;
            continue;
        }
        if c == '\'' && !dq {
            sq = !sq;
            i += 1;
            continue;
        }
        if c == '"' && !sq {
            dq = !dq;
            i += 1;
            continue;
        }
        if sq {
            i += 1;
            continue;
        }

        let opens_span = i + 1 < len
            && chars[i + 1] == '('
            && (c == '$' || ((c == '<' || c == '>') && !dq));
        if opens_span {
            let (inner, next) = take_balanced(&chars, i + 2);
            let trimmed = inner.trim();
            if !trimmed.is_empty() {
                inners.push(trimmed.to_string());
            }
            i = next;
            continue;
        }

        // Backtick: extract to matching backtick (no nesting)
        if c == '`' {
            let mut inner = String::new();
            i += 1;
            while i < len && chars[i] != '`' {
                if chars[i] == '\\' && i + 1 < len {
                    inner.push(chars[i]);
                    inner.push(chars[i + 1]);
                    i += 2;
                    continue;
                }
                inner.push(chars[i]);
                i += 1;
            }
            if i < len {
                i += 1;
            }
            let trimmed = inner.trim();
            if !trimmed.is_empty() {
                inners.push(trimmed.to_string());
            }
            continue;
        }

        i += 1;
    }

    inners
}

/// Parse a full command line into its top-level statements and the bodies
/// of its top-level substitutions.
pub fn parse(command: &str) -> ParsedPipeline {
    ParsedPipeline {
        segments: split_compound_command(command),
        substitutions: extract_substitutions(command),
    }
}

/// Every statement in a command line, including statements nested in
/// substitutions, in source order of discovery (top level first).
pub fn statements(command: &str) -> Vec<String> {
    let pipeline = parse(command);
    let mut out = pipeline.segments;
    for inner in &pipeline.substitutions {
        out.extend(statements(inner));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_simple() {
        assert_eq!(split_compound_command("git status"), vec!["git status"]);
    }

    #[test]
    fn split_and() {
        assert_eq!(
            split_compound_command("cd repo && git commit -m 'x'"),
            vec!["cd repo", "git commit -m 'x'"]
        );
    }

    #[test]
    fn split_newline() {
        assert_eq!(
            split_compound_command("git add .\ngit push"),
            vec!["git add .", "git push"]
        );
    }

    #[test]
    fn split_semi_and_pipe() {
        assert_eq!(
            split_compound_command("git log | head; git push |& tee log || true"),
            vec!["git log", "head", "git push", "tee log", "true"]
        );
    }

    #[test]
    fn split_quoted_operator() {
        assert_eq!(
            split_compound_command("echo 'a && git commit'"),
            vec!["echo 'a && git commit'"]
        );
    }

    #[test]
    fn split_keeps_substitution_whole() {
        assert_eq!(
            split_compound_command("echo $(cd x && git push) done"),
            vec!["echo $(cd x && git push) done"]
        );
    }

    #[test]
    fn split_trailing_separator() {
        assert_eq!(split_compound_command("git push;"), vec!["git push"]);
    }

    #[test]
    fn extract_dollar_paren() {
        assert_eq!(
            extract_substitutions("git commit -m \"$(cat msg.txt)\""),
            vec!["cat msg.txt"]
        );
    }

    #[test]
    fn extract_backtick() {
        assert_eq!(extract_substitutions("echo `git push`"), vec!["git push"]);
    }

    #[test]
    fn extract_single_quoted_suppressed() {
        assert!(extract_substitutions("echo '$(git push)'").is_empty());
    }

    #[test]
    fn statements_include_substitutions() {
        let all = statements("echo $(cd x && git push)");
        assert_eq!(all, vec!["echo $(cd x && git push)", "cd x", "git push"]);
    }
}
