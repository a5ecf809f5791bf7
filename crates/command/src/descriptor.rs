//! Command metadata: option types, shorthands and payload hooks.
//!
//! Every command, built in or provided by a plugin, is described by a
//! [`CommandDescriptor`]. Built-in commands construct theirs with the
//! builder methods; external plugins print theirs as JSON (see
//! [`DescriptorManifest`]).

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CommandError, Result};
use crate::options::{OptionValue, ResolvedOptions};

/// The declared type of an option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionType {
    String,
    Number,
    /// A presence flag; needs no value.
    Boolean,
    Url,
    Path,
    /// A file path, or `-` for standard input.
    Stream,
    Date,
    /// The value must be one of the listed members.
    OneOf(Vec<String>),
    /// A type marker gh does not recognize. Values are kept as strings and
    /// the marker is shown as given.
    Other(String),
}

impl OptionType {
    /// Parses a type marker such as `"String"` or `"Boolean"`.
    #[must_use]
    pub fn from_marker(marker: &str) -> Self {
        match marker {
            "String" => Self::String,
            "Number" => Self::Number,
            "Boolean" => Self::Boolean,
            "Url" => Self::Url,
            "Path" => Self::Path,
            "Stream" => Self::Stream,
            "Date" => Self::Date,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the label shown in help output.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::String => "String".to_string(),
            Self::Number => "Number".to_string(),
            Self::Boolean => "Boolean".to_string(),
            Self::Url => "Url".to_string(),
            Self::Path => "Path".to_string(),
            Self::Stream => "Stream".to_string(),
            Self::Date => "Date".to_string(),
            Self::OneOf(members) => members.join("|"),
            Self::Other(marker) => marker.clone(),
        }
    }

    /// Returns whether the option is a presence flag.
    #[must_use]
    pub fn is_boolean(&self) -> bool {
        matches!(self, Self::Boolean)
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// A declared option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSpec {
    pub name: String,
    pub kind: OptionType,
}

/// A short flag and the long-form tokens it expands to.
///
/// The first expansion token is the canonical `--longflag`; any further
/// tokens are inserted as-is (for example a value: `["--type", "owner"]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shorthand {
    pub flag: String,
    pub expansion: Vec<String>,
}

impl Shorthand {
    /// Returns the option name the expansion targets, `--` stripped.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        self.expansion
            .first()
            .and_then(|long| long.strip_prefix("--"))
            .map(|long| long.split_once('=').map_or(long, |(name, _)| name))
    }
}

/// Derives extra defaults from the bare positional text of an invocation.
pub type PayloadHook = Arc<dyn Fn(&str, &mut ResolvedOptions) + Send + Sync>;

/// Metadata describing one command.
///
/// # Examples
///
/// ```
/// use gh_command::{CommandDescriptor, OptionType};
///
/// let hello = CommandDescriptor::new("hello")
///     .alias("he")
///     .description("Hello world example.")
///     .option("world", OptionType::Boolean)
///     .shorthand("w", ["--world"])
///     .payload(|_, options| options.set_flag("world", true));
///
/// assert_eq!(hello.alias.as_deref(), Some("he"));
/// assert!(hello.option_type("world").is_some_and(OptionType::is_boolean));
/// ```
#[derive(Clone)]
pub struct CommandDescriptor {
    pub name: String,
    pub alias: Option<String>,
    pub description: String,
    pub options: Vec<OptionSpec>,
    pub shorthands: Vec<Shorthand>,
    pub payload: Option<PayloadHook>,
}

impl CommandDescriptor {
    /// Creates a descriptor with no options.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            description: String::new(),
            options: Vec::new(),
            shorthands: Vec::new(),
            payload: None,
        }
    }

    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Declares an option. Declaration order is kept for help output.
    #[must_use]
    pub fn option(mut self, name: impl Into<String>, kind: OptionType) -> Self {
        self.options.push(OptionSpec {
            name: name.into(),
            kind,
        });
        self
    }

    /// Declares a short flag.
    #[must_use]
    pub fn shorthand<I, S>(mut self, flag: impl Into<String>, expansion: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.shorthands.push(Shorthand {
            flag: flag.into(),
            expansion: expansion.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Installs the payload hook.
    #[must_use]
    pub fn payload<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str, &mut ResolvedOptions) + Send + Sync + 'static,
    {
        self.payload = Some(Arc::new(hook));
        self
    }

    /// Returns the declared type of an option.
    #[must_use]
    pub fn option_type(&self, name: &str) -> Option<&OptionType> {
        self.options
            .iter()
            .find(|spec| spec.name == name)
            .map(|spec| &spec.kind)
    }

    /// Returns the shorthand declared for a flag.
    #[must_use]
    pub fn find_shorthand(&self, flag: &str) -> Option<&Shorthand> {
        self.shorthands.iter().find(|s| s.flag == flag)
    }

    /// Returns whether `name` is this command's name or alias.
    #[must_use]
    pub fn answers_to(&self, name: &str) -> bool {
        self.name == name || self.alias.as_deref() == Some(name)
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("alias", &self.alias)
            .field("description", &self.description)
            .field("options", &self.options)
            .field("shorthands", &self.shorthands)
            .field("payload", &self.payload.is_some())
            .finish()
    }
}

/// A declared option type as written in JSON: a marker string or a list of
/// allowed values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionTypeSpec {
    Marker(String),
    OneOf(Vec<String>),
}

impl From<OptionTypeSpec> for OptionType {
    fn from(spec: OptionTypeSpec) -> Self {
        match spec {
            OptionTypeSpec::Marker(marker) => OptionType::from_marker(&marker),
            OptionTypeSpec::OneOf(members) => OptionType::OneOf(members),
        }
    }
}

/// A command descriptor as printed by an external plugin's `--describe`.
///
/// ```json
/// {
///   "name": "jira",
///   "alias": "ji",
///   "description": "Jira integration",
///   "options": { "browser": "Boolean", "status": ["open", "closed"] },
///   "shorthands": { "B": ["--browser"] },
///   "payload": { "browser": true }
/// }
/// ```
///
/// `payload` holds the defaults applied when a bare positional argument is
/// given.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DescriptorManifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub options: serde_json::Map<String, Value>,
    #[serde(default)]
    pub shorthands: serde_json::Map<String, Value>,
    #[serde(default)]
    pub payload: Option<serde_json::Map<String, Value>>,
}

impl DescriptorManifest {
    /// Converts the manifest into a descriptor named `fallback_name` unless
    /// the manifest names itself.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::PluginLoad`] when an option type or shorthand
    /// is malformed.
    pub fn into_descriptor(self, fallback_name: &str) -> Result<CommandDescriptor> {
        let name = self.name.unwrap_or_else(|| fallback_name.to_string());
        let invalid = |reason: String| CommandError::plugin_load(fallback_name, reason);

        let mut descriptor = CommandDescriptor::new(name).description(self.description);
        descriptor.alias = self.alias;

        for (option, kind) in self.options {
            let spec: OptionTypeSpec = serde_json::from_value(kind)
                .map_err(|e| invalid(format!("option {option:?} has an invalid type: {e}")))?;
            descriptor = descriptor.option(option, spec.into());
        }

        for (flag, expansion) in self.shorthands {
            let expansion: Vec<String> = match expansion {
                Value::String(single) => vec![single],
                other => serde_json::from_value(other)
                    .map_err(|e| invalid(format!("shorthand {flag:?} is invalid: {e}")))?,
            };
            if expansion.first().is_none_or(|long| !long.starts_with("--")) {
                return Err(invalid(format!(
                    "shorthand {flag:?} must expand to a --long flag"
                )));
            }
            descriptor = descriptor.shorthand(flag, expansion);
        }

        if let Some(defaults) = self.payload {
            let defaults: Vec<(String, OptionValue)> = defaults
                .into_iter()
                .map(|(name, value)| (name, json_to_option_value(value)))
                .collect();
            descriptor = descriptor.payload(move |_, options| {
                for (name, value) in &defaults {
                    options.set(name.clone(), value.clone());
                }
            });
        }

        Ok(descriptor)
    }
}

fn json_to_option_value(value: Value) -> OptionValue {
    match value {
        Value::Bool(b) => OptionValue::Bool(b),
        Value::Number(n) => n
            .as_f64()
            .map_or_else(|| OptionValue::String(n.to_string()), OptionValue::Number),
        Value::String(s) => OptionValue::String(s),
        other => OptionValue::String(other.to_string()),
    }
}
