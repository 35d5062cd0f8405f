use serde::{Deserialize, Serialize};

/// Embedded default configuration.
const DEFAULT_CONFIG: &str = include_str!("../config.default.toml");

// ── Final (merged) config types ──

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub shell: ShellConfig,
    #[serde(default)]
    pub git: GitConfig,
    #[serde(default)]
    pub files: FilesConfig,
}

/// How a trigger whose `if` expression fails is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// The trigger does not match.
    #[default]
    Skip,
    /// A blocking workflow with a failing trigger denies the action.
    Deny,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub on_expression_error: ErrorPolicy,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_dir: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            on_expression_error: ErrorPolicy::default(),
            log_level: default_log_level(),
            log_dir: String::new(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct ShellConfig {
    #[serde(default)]
    pub tools: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct GitConfig {
    #[serde(default)]
    pub commit_subcommands: Vec<String>,
    #[serde(default)]
    pub push_subcommands: Vec<String>,
    /// Branch assumed checked out when no repository state supplies one.
    #[serde(default)]
    pub default_branch: String,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct FilesConfig {
    #[serde(default)]
    pub edit_tools: Vec<String>,
    #[serde(default)]
    pub create_tools: Vec<String>,
    #[serde(default)]
    pub path_args: Vec<String>,
}

// ── Overlay types (user config that merges with defaults) ──

#[derive(Debug, Deserialize, Default)]
struct ConfigOverlay {
    #[serde(default)]
    settings: SettingsOverlay,
    #[serde(default)]
    shell: ShellOverlay,
    #[serde(default)]
    git: GitOverlay,
    #[serde(default)]
    files: FilesOverlay,
}

#[derive(Debug, Deserialize, Default)]
struct SettingsOverlay {
    on_expression_error: Option<ErrorPolicy>,
    log_level: Option<String>,
    log_dir: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct ShellOverlay {
    #[serde(default)]
    replace: bool,
    #[serde(default)]
    tools: Vec<String>,
    #[serde(default)]
    remove_tools: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
struct GitOverlay {
    #[serde(default)]
    replace: bool,
    #[serde(default)]
    commit_subcommands: Vec<String>,
    #[serde(default)]
    push_subcommands: Vec<String>,
    default_branch: Option<String>,
    #[serde(default)]
    remove_commit_subcommands: Vec<String>,
    #[serde(default)]
    remove_push_subcommands: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
struct FilesOverlay {
    #[serde(default)]
    replace: bool,
    #[serde(default)]
    edit_tools: Vec<String>,
    #[serde(default)]
    create_tools: Vec<String>,
    #[serde(default)]
    path_args: Vec<String>,
    #[serde(default)]
    remove_edit_tools: Vec<String>,
    #[serde(default)]
    remove_create_tools: Vec<String>,
    #[serde(default)]
    remove_path_args: Vec<String>,
}

// ── Merge logic ──

/// Merge a user list into a default list.
/// In replace mode: user list replaces default entirely.
/// In merge mode: remove items first, then extend with additions (deduped).
fn merge_list(base: &mut Vec<String>, add: Vec<String>, remove: &[String], replace: bool) {
    if replace {
        *base = add;
    } else {
        base.retain(|item| !remove.contains(item));
        for item in add {
            if !base.contains(&item) {
                base.push(item);
            }
        }
    }
}

impl Config {
    /// Load the default embedded configuration.
    pub fn default_config() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("embedded default config must parse")
    }

    /// Load configuration with resolution order:
    /// 1. Start with embedded defaults
    /// 2. Merge user overlay from ~/.config/agentic-ops/config.toml (if exists)
    ///
    /// User config merges with defaults: lists extend, scalars override.
    /// Set `replace = true` in any section to replace its defaults entirely.
    /// Use `remove_<field>` lists to subtract specific items from defaults.
    pub fn load() -> Self {
        let mut config = Self::default_config();
        if let Some(overlay) = Self::load_overlay() {
            config.apply_overlay(overlay);
        }
        config
    }

    /// Try to load user overlay from ~/.config/agentic-ops/config.toml.
    fn load_overlay() -> Option<ConfigOverlay> {
        let home = std::env::var_os("HOME")?;
        let path = std::path::Path::new(&home).join(".config/agentic-ops/config.toml");
        let content = std::fs::read_to_string(path).ok()?;
        match Self::parse_overlay(&content) {
            Ok(overlay) => Some(overlay),
            Err(e) => {
                // The logger is configured from this file, so it is not up yet.
                eprintln!("agentic-ops: config parse error: {e}");
                None
            }
        }
    }

    fn parse_overlay(content: &str) -> crate::Result<ConfigOverlay> {
        Ok(toml::from_str(content)?)
    }

    /// Apply an overlay on top of this config (merge semantics).
    fn apply_overlay(&mut self, overlay: ConfigOverlay) {
        // Settings: scalar overrides
        let s = overlay.settings;
        if let Some(v) = s.on_expression_error {
            self.settings.on_expression_error = v;
        }
        if let Some(v) = s.log_level {
            self.settings.log_level = v;
        }
        if let Some(v) = s.log_dir {
            self.settings.log_dir = v;
        }

        // Shell
        let sh = overlay.shell;
        merge_list(&mut self.shell.tools, sh.tools, &sh.remove_tools, sh.replace);

        // Git
        let g = overlay.git;
        merge_list(
            &mut self.git.commit_subcommands,
            g.commit_subcommands,
            &g.remove_commit_subcommands,
            g.replace,
        );
        merge_list(
            &mut self.git.push_subcommands,
            g.push_subcommands,
            &g.remove_push_subcommands,
            g.replace,
        );
        if let Some(v) = g.default_branch {
            self.git.default_branch = v;
        }

        // Files
        let f = overlay.files;
        merge_list(
            &mut self.files.edit_tools,
            f.edit_tools,
            &f.remove_edit_tools,
            f.replace,
        );
        merge_list(
            &mut self.files.create_tools,
            f.create_tools,
            &f.remove_create_tools,
            f.replace,
        );
        merge_list(
            &mut self.files.path_args,
            f.path_args,
            &f.remove_path_args,
            f.replace,
        );
    }

    /// Directory for log files, with `~` and `$VAR` expanded.
    pub fn log_dir(&self) -> Option<std::path::PathBuf> {
        if self.settings.log_dir.is_empty() {
            return None;
        }
        shellexpand::full(&self.settings.log_dir)
            .ok()
            .map(|p| std::path::PathBuf::from(p.as_ref()))
    }

    /// Apply an overlay from a TOML string. Used for testing.
    #[cfg(test)]
    fn apply_overlay_str(&mut self, toml_str: &str) {
        let overlay = Self::parse_overlay(toml_str).unwrap();
        self.apply_overlay(overlay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_parses() {
        let config = Config::default_config();
        assert!(!config.shell.tools.is_empty());
        assert!(!config.git.commit_subcommands.is_empty());
        assert!(!config.git.push_subcommands.is_empty());
        assert!(!config.files.path_args.is_empty());
    }

    #[test]
    fn default_config_has_expected_entries() {
        let config = Config::default_config();
        assert!(config.shell.tools.contains(&"bash".to_string()));
        assert!(config.shell.tools.contains(&"powershell".to_string()));
        assert!(config.git.commit_subcommands.contains(&"ci".to_string()));
        assert_eq!(config.git.default_branch, "main");
    }

    #[test]
    fn default_policy_is_skip() {
        let config = Config::default_config();
        assert_eq!(config.settings.on_expression_error, ErrorPolicy::Skip);
    }

    #[test]
    fn overlay_extends_shell_tools() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [shell]
            tools = ["zsh"]
        "#,
        );
        assert!(config.shell.tools.contains(&"bash".to_string()));
        assert!(config.shell.tools.contains(&"zsh".to_string()));
    }

    #[test]
    fn overlay_removes_shell_tool() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [shell]
            remove_tools = ["cmd"]
        "#,
        );
        assert!(!config.shell.tools.contains(&"cmd".to_string()));
        assert!(config.shell.tools.contains(&"sh".to_string()));
    }

    #[test]
    fn overlay_replace_git() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [git]
            replace = true
            commit_subcommands = ["commit"]
            default_branch = "trunk"
        "#,
        );
        assert_eq!(config.git.commit_subcommands, vec!["commit"]);
        assert!(config.git.push_subcommands.is_empty());
        assert_eq!(config.git.default_branch, "trunk");
    }

    #[test]
    fn overlay_policy_deny() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [settings]
            on_expression_error = "deny"
        "#,
        );
        assert_eq!(config.settings.on_expression_error, ErrorPolicy::Deny);
        // Unrelated scalar keeps its default
        assert_eq!(config.settings.log_level, "info");
    }

    #[test]
    fn overlay_no_duplicates() {
        let mut config = Config::default_config();
        config.apply_overlay_str(
            r#"
            [files]
            edit_tools = ["Edit"]
        "#,
        );
        let count = config.files.edit_tools.iter().filter(|s| *s == "Edit").count();
        assert_eq!(count, 1);
    }

    #[test]
    fn empty_overlay_changes_nothing() {
        let original = Config::default_config();
        let mut config = Config::default_config();
        config.apply_overlay_str("");
        assert_eq!(config.shell.tools, original.shell.tools);
        assert_eq!(config.files.create_tools, original.files.create_tools);
    }

    #[test]
    fn bad_overlay_is_a_toml_error() {
        let err = Config::parse_overlay("[settings\nlog_level = 1").unwrap_err();
        assert!(matches!(err, crate::Error::Toml(_)));
        assert!(err.to_string().starts_with("invalid TOML"));
    }

    #[test]
    fn log_dir_from_settings() {
        let mut config = Config::default_config();
        config.settings.log_dir = "/var/log/agentic-ops".into();
        assert_eq!(
            config.log_dir(),
            Some(std::path::PathBuf::from("/var/log/agentic-ops"))
        );
        config.settings.log_dir.clear();
        assert!(config.log_dir().is_none());
    }
}
