use std::io::Read;
use std::path::PathBuf;
use std::process::exit;

use clap::{Parser, Subcommand};

use agentic_ops::config::{Config, ErrorPolicy};
use agentic_ops::decision::WorkflowResult;
use agentic_ops::hook::{self, HookConfig, StaticRepoState};
use agentic_ops::logging;
use agentic_ops::schema::Workflow;
use agentic_ops::trigger::Matcher;

#[derive(Debug, Parser)]
#[command(name = "agentic-ops")]
#[command(about = "Match agent hook payloads against policy workflows", long_about = None)]
#[command(version)]
#[command(arg_required_else_help = true, args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Print the effective configuration as TOML
    #[arg(long)]
    dump_config: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Read a hook payload from stdin and print the workflows it triggers
    Match {
        /// Current branch (defaults to git.default_branch)
        #[arg(long)]
        branch: Option<String>,
        #[arg(required = true, value_name = "WORKFLOW")]
        workflows: Vec<PathBuf>,
    },
    /// Check workflow files for schema and expression errors
    Validate {
        #[arg(required = true, value_name = "WORKFLOW")]
        workflows: Vec<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    let config = Config::load();

    if cli.dump_config {
        dump_config(&config);
        return;
    }

    match cli.command {
        Some(Commands::Match { branch, workflows }) => {
            logging::init(&config);
            run_match(&config, branch, &workflows);
        }
        Some(Commands::Validate { workflows }) => run_validate(&workflows),
        None => {}
    }
}

fn dump_config(config: &Config) {
    match toml::to_string_pretty(config) {
        Ok(s) => print!("{s}"),
        Err(e) => {
            eprintln!("failed to serialize config: {e}");
            exit(1);
        }
    }
}

fn load_workflows(paths: &[PathBuf]) -> Vec<Workflow> {
    let mut workflows = Vec::with_capacity(paths.len());
    for path in paths {
        match Workflow::from_path(path) {
            Ok(wf) => workflows.push(wf),
            Err(e) => {
                eprintln!("{}: {e}", path.display());
                exit(1);
            }
        }
    }
    workflows
}

fn run_match(config: &Config, branch: Option<String>, paths: &[PathBuf]) {
    let workflows = load_workflows(paths);

    let mut input = String::new();
    if std::io::stdin().read_to_string(&mut input).is_err() {
        eprintln!("failed to read stdin");
        exit(1);
    }
    let payload: serde_json::Value = match serde_json::from_str(&input) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("JSON parse error: {e}");
            exit(1);
        }
    };

    let repo = StaticRepoState::new(branch.unwrap_or_else(|| config.git.default_branch.clone()));
    let event = match hook::synthesize(&payload, &HookConfig::from_config(config), &repo) {
        Ok(event) => event,
        Err(e) => {
            eprintln!("{e}");
            exit(1);
        }
    };

    let mut matched = Vec::new();
    let mut failures = Vec::new();
    for wf in &workflows {
        let outcome = Matcher::new(wf).evaluate(&event);
        logging::log_match(&wf.name, &event, &outcome);
        match outcome {
            Ok(true) => matched.push(wf.name.as_str()),
            Ok(false) => {}
            Err(e) if wf.is_blocking() => failures.push(format!("{}: {e}", wf.name)),
            Err(_) => {}
        }
    }

    if config.settings.on_expression_error == ErrorPolicy::Deny && !failures.is_empty() {
        let hook_event_name = payload
            .get("hook_event_name")
            .and_then(|v| v.as_str())
            .unwrap_or("PreToolUse");
        let result = WorkflowResult::deny(format!(
            "workflow condition failed:\n{}",
            failures.join("\n")
        ));
        log::warn!(
            "{}\t{}",
            result.permission_decision.label(),
            failures.join("; ")
        );
        println!("{}", result.hook_output(hook_event_name));
        return;
    }

    for name in matched {
        println!("{name}");
    }
}

fn run_validate(paths: &[PathBuf]) {
    let mut failed = false;
    for path in paths {
        let workflow = match Workflow::from_path(path) {
            Ok(wf) => wf,
            Err(e) => {
                eprintln!("{}: {e}", path.display());
                failed = true;
                continue;
            }
        };
        let errors = Matcher::new(&workflow).validate();
        for e in &errors {
            eprintln!("{}: {e}", path.display());
        }
        failed |= !errors.is_empty();
    }
    if failed {
        exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use clap::error::ErrorKind;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn match_with_branch() {
        let cli = Cli::try_parse_from(["agentic-ops", "match", "--branch=dev", "a.yml", "b.yml"])
            .unwrap();
        match cli.command {
            Some(Commands::Match { branch, workflows }) => {
                assert_eq!(branch.as_deref(), Some("dev"));
                assert_eq!(workflows, vec![PathBuf::from("a.yml"), PathBuf::from("b.yml")]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn unknown_flag_rejected() {
        let err = Cli::try_parse_from(["agentic-ops", "match", "--brnch=dev", "wf.yml"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn branch_requires_value() {
        assert!(Cli::try_parse_from(["agentic-ops", "match", "wf.yml", "--branch"]).is_err());
    }

    #[test]
    fn workflows_required() {
        let err = Cli::try_parse_from(["agentic-ops", "validate"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn subcommand_help() {
        let err = Cli::try_parse_from(["agentic-ops", "validate", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn dump_config_flag() {
        let cli = Cli::try_parse_from(["agentic-ops", "--dump-config"]).unwrap();
        assert!(cli.dump_config);
        assert!(cli.command.is_none());
        assert!(Cli::try_parse_from(["agentic-ops", "--dump-config", "validate", "x.yml"]).is_err());
    }
}
