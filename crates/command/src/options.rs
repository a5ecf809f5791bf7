//! Parsed option values for one invocation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use url::Url;

/// Where a stream-typed option reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamSource {
    /// Standard input, requested with `-`.
    Stdin,
    /// A file on disk.
    File(PathBuf),
}

/// A single coerced option value.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    String(String),
    Number(f64),
    Url(Url),
    Path(PathBuf),
    Stream(StreamSource),
    Date(DateTime<Utc>),
}

impl From<&OptionValue> for Value {
    fn from(value: &OptionValue) -> Self {
        match value {
            OptionValue::Bool(b) => Value::Bool(*b),
            OptionValue::String(s) => Value::String(s.clone()),
            OptionValue::Number(n) => {
                serde_json::Number::from_f64(*n).map_or(Value::Null, Value::Number)
            }
            OptionValue::Url(url) => Value::String(url.to_string()),
            OptionValue::Path(path) => Value::String(path.display().to_string()),
            OptionValue::Stream(StreamSource::Stdin) => Value::String("-".to_string()),
            OptionValue::Stream(StreamSource::File(path)) => {
                Value::String(path.display().to_string())
            }
            OptionValue::Date(date) => Value::String(date.to_rfc3339()),
        }
    }
}

/// The final option set for one command invocation.
///
/// Built by [`OptionExpander`](crate::OptionExpander) from the raw argument
/// vector and owned by the invocation until the command body returns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedOptions {
    values: BTreeMap<String, OptionValue>,
    positional: Vec<String>,
    logged_user: Option<String>,
}

impl ResolvedOptions {
    /// Creates an empty option set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an option's value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    /// Sets an option's value, replacing any previous one.
    pub fn set(&mut self, name: impl Into<String>, value: OptionValue) {
        self.values.insert(name.into(), value);
    }

    /// Sets a boolean option.
    pub fn set_flag(&mut self, name: impl Into<String>, value: bool) {
        self.set(name, OptionValue::Bool(value));
    }

    /// Sets a string option.
    pub fn set_string(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.set(name, OptionValue::String(value.into()));
    }

    /// Removes an option, returning its value.
    pub fn unset(&mut self, name: &str) -> Option<OptionValue> {
        self.values.remove(name)
    }

    /// Returns whether an option was given or defaulted.
    #[must_use]
    pub fn is_set(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Returns a boolean option; absent options are `false`.
    #[must_use]
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(OptionValue::Bool(true)))
    }

    /// Returns a string option.
    #[must_use]
    pub fn string(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(OptionValue::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Returns a numeric option.
    #[must_use]
    pub fn number(&self, name: &str) -> Option<f64> {
        match self.values.get(name) {
            Some(OptionValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    /// Returns a URL option.
    #[must_use]
    pub fn url(&self, name: &str) -> Option<&Url> {
        match self.values.get(name) {
            Some(OptionValue::Url(url)) => Some(url),
            _ => None,
        }
    }

    /// Returns a path option.
    #[must_use]
    pub fn path(&self, name: &str) -> Option<&Path> {
        match self.values.get(name) {
            Some(OptionValue::Path(path)) => Some(path.as_path()),
            _ => None,
        }
    }

    /// Returns a stream option.
    #[must_use]
    pub fn stream(&self, name: &str) -> Option<&StreamSource> {
        match self.values.get(name) {
            Some(OptionValue::Stream(source)) => Some(source),
            _ => None,
        }
    }

    /// Returns a date option.
    #[must_use]
    pub fn date(&self, name: &str) -> Option<DateTime<Utc>> {
        match self.values.get(name) {
            Some(OptionValue::Date(date)) => Some(*date),
            _ => None,
        }
    }

    /// Iterates over every set option in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the bare positional arguments.
    #[must_use]
    pub fn positional(&self) -> &[String] {
        &self.positional
    }

    /// Appends a positional argument.
    pub fn push_positional(&mut self, arg: impl Into<String>) {
        self.positional.push(arg.into());
    }

    /// Returns the authenticated user's login, if known.
    #[must_use]
    pub fn logged_user(&self) -> Option<&str> {
        self.logged_user.as_deref()
    }

    /// Records the authenticated user's login.
    pub fn set_logged_user(&mut self, user: Option<String>) {
        self.logged_user = user;
    }

    /// Renders the options as a JSON object, as sent to external plugins.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut map: Map<String, Value> = self
            .values
            .iter()
            .map(|(name, value)| (name.clone(), Value::from(value)))
            .collect();
        if let Some(user) = &self.logged_user {
            map.insert("logged_user".to_string(), Value::String(user.clone()));
        }
        Value::Object(map)
    }
}
