/// Whether a word is a `NAME=value` shell assignment.
fn is_assignment(word: &str) -> bool {
    let Some((name, _)) = word.split_once('=') else {
        return false;
    };
    !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
}

/// Tokenize a command segment into words using shlex (POSIX word splitting).
pub fn tokenize(command: &str) -> Vec<String> {
    shlex::split(command).unwrap_or_else(|| {
        // Fallback: simple whitespace splitting if shlex can't parse
        command.split_whitespace().map(String::from).collect()
    })
}

/// Words of a statement with leading VAR=value assignments removed.
///
/// The first returned word is the command itself (`git`, `/usr/bin/git`).
pub fn command_words(command: &str) -> Vec<String> {
    let mut words = tokenize(command);
    let skip = words.iter().take_while(|w| is_assignment(w)).count();
    words.drain(..skip);
    words
}
