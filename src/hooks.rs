//! Shell hooks run around mutating commands.
//!
//! Hooks live in the config under `hooks.<command>.<action>`:
//!
//! ```json
//! {
//!     "hooks": {
//!         "repo": {
//!             "new": {
//!                 "before": [],
//!                 "after": ["echo created {{options.new}}"]
//!             }
//!         }
//!     }
//! }
//! ```
//!
//! Each entry is run with `sh -c` after `{{options.<name>}}` placeholders
//! are replaced by option values. A failing hook is logged and never aborts
//! the command.

use gh_command::ResolvedOptions;
use gh_config::Config;
use serde_json::Value;
use tokio::process::Command;
use tracing::{debug, instrument, warn};

/// When a hook runs relative to its action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Before,
    After,
}

impl Phase {
    fn key(self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
        }
    }
}

/// Returns the hook commands configured for `action` (e.g. `repo.new`).
pub fn commands(config: &Config, action: &str, phase: Phase) -> Vec<String> {
    let path = format!("hooks.{action}.{}", phase.key());
    match config.get_path(&path) {
        Some(Value::Array(entries)) => entries
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::String(single)) => vec![single.clone()],
        _ => Vec::new(),
    }
}

/// Replaces `{{options.<name>}}` placeholders with option values.
pub fn render(template: &str, options: &ResolvedOptions) -> String {
    let Value::Object(values) = options.to_json() else {
        return template.to_string();
    };

    values.iter().fold(template.to_string(), |rendered, (name, value)| {
        let text = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        rendered.replace(&format!("{{{{options.{name}}}}}"), &text)
    })
}

/// Runs every hook configured for `action` and `phase`.
#[instrument(skip(config, options))]
pub async fn invoke(config: &Config, action: &str, phase: Phase, options: &ResolvedOptions) {
    for template in commands(config, action, phase) {
        let script = render(&template, options);
        debug!(%script, "running hook");

        match Command::new("sh").arg("-c").arg(&script).status().await {
            Ok(status) if status.success() => {}
            Ok(status) => warn!(%script, %status, "hook failed"),
            Err(err) => warn!(%script, error = %err, "can't run hook"),
        }
    }
}
