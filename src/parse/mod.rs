pub mod shell;
pub mod tokenize;
pub mod types;

pub use shell::{extract_substitutions, parse, split_compound_command, statements};
pub use tokenize::{command_words, tokenize};
pub use types::ParsedPipeline;
