//! Shorthand expansion and option coercion.
//!
//! Turning an argument vector into [`ResolvedOptions`] happens in three
//! passes:
//!
//! 1. Every short flag (`-B`, or a bundle such as `-Bc`) is replaced by the
//!    long-form tokens its shorthand declares.
//! 2. Long flags are matched against the descriptor's options and their raw
//!    values coerced to the declared type. Anything else is positional.
//! 3. When positional arguments remain, the descriptor's payload hook may
//!    set further defaults.
//!
//! A bare `--` ends flag parsing; every later token is positional.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;
use url::Url;

use crate::descriptor::{CommandDescriptor, OptionType};
use crate::error::{CommandError, Result};
use crate::options::{OptionValue, ResolvedOptions, StreamSource};

/// Name of the option defaulted to the logged-in user.
pub const USER_OPTION: &str = "user";

/// Name of the enumerated option defaulted to its first member.
pub const TYPE_OPTION: &str = "type";

/// Normalizes raw flags against a command's declared option schema.
pub struct OptionExpander;

impl OptionExpander {
    /// Expands shorthands, coerces values and applies the payload hook.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::InvalidOption`] for unknown flags, missing
    /// values, values that do not parse as the declared type, and values
    /// outside an enumerated set.
    ///
    /// # Examples
    ///
    /// ```
    /// use gh_command::{CommandDescriptor, OptionExpander, OptionType};
    ///
    /// let repo = CommandDescriptor::new("repo")
    ///     .option("list", OptionType::Boolean)
    ///     .option("user", OptionType::String)
    ///     .shorthand("l", ["--list"])
    ///     .shorthand("u", ["--user"]);
    ///
    /// let args = ["-l", "-u", "octocat"].map(String::from);
    /// let options = OptionExpander::expand(&repo, &args).unwrap();
    /// assert!(options.flag("list"));
    /// assert_eq!(options.string("user"), Some("octocat"));
    /// ```
    pub fn expand(descriptor: &CommandDescriptor, raw: &[String]) -> Result<ResolvedOptions> {
        let tokens = Self::expand_shorthands(descriptor, raw)?;
        let mut options = Self::parse(descriptor, &tokens)?;

        if let Some(hook) = &descriptor.payload {
            if !options.positional().is_empty() {
                let payload = options.positional().join(" ");
                debug!(command = %descriptor.name, %payload, "applying payload hook");
                hook(&payload, &mut options);
            }
        }

        Ok(options)
    }

    /// Replaces short flags with their declared long-form tokens.
    ///
    /// `-xyz` is first looked up as a whole; when no shorthand is named
    /// `xyz`, each letter is expanded in turn. Tokens after `--` and
    /// negative numbers are left alone.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::InvalidOption`] for an unknown short flag.
    pub fn expand_shorthands(descriptor: &CommandDescriptor, raw: &[String]) -> Result<Vec<String>> {
        let mut tokens = Vec::with_capacity(raw.len());
        let mut iter = raw.iter();

        while let Some(token) = iter.next() {
            if token == "--" {
                tokens.push(token.clone());
                tokens.extend(iter.by_ref().cloned());
                break;
            }

            let Some(flags) = short_flags(token) else {
                tokens.push(token.clone());
                continue;
            };

            if let Some(shorthand) = descriptor.find_shorthand(flags) {
                tokens.extend(shorthand.expansion.iter().cloned());
                continue;
            }

            for letter in flags.chars() {
                let mut buf = [0u8; 4];
                let letter = letter.encode_utf8(&mut buf);
                let shorthand = descriptor
                    .find_shorthand(letter)
                    .ok_or_else(|| CommandError::invalid_option(format!("-{letter}"), "unknown short flag"))?;
                tokens.extend(shorthand.expansion.iter().cloned());
            }
        }

        Ok(tokens)
    }

    fn parse(descriptor: &CommandDescriptor, tokens: &[String]) -> Result<ResolvedOptions> {
        let mut options = ResolvedOptions::new();
        let mut iter = tokens.iter().peekable();

        while let Some(token) = iter.next() {
            if token == "--" {
                for rest in iter.by_ref() {
                    options.push_positional(rest.clone());
                }
                break;
            }

            let Some(flag) = token.strip_prefix("--") else {
                options.push_positional(token.clone());
                continue;
            };

            let (name, inline) = match flag.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (flag, None),
            };

            let kind = match descriptor.option_type(name) {
                Some(kind) => kind,
                None => match name.strip_prefix("no-") {
                    Some(negated)
                        if inline.is_none()
                            && descriptor.option_type(negated).is_some_and(OptionType::is_boolean) =>
                    {
                        options.set_flag(negated, false);
                        continue;
                    }
                    _ => return Err(CommandError::invalid_option(name, "unknown option")),
                },
            };

            let value = if kind.is_boolean() {
                let raw = match inline {
                    Some(value) => Some(value),
                    None => iter
                        .next_if(|next| next.as_str() == "true" || next.as_str() == "false")
                        .map(String::as_str),
                };
                OptionValue::Bool(parse_bool(name, raw)?)
            } else {
                let raw = match inline {
                    Some(value) => value,
                    None => iter
                        .next_if(|next| !next.starts_with("--"))
                        .map(String::as_str)
                        .ok_or_else(|| CommandError::invalid_option(name, "expects a value"))?,
                };
                coerce(name, kind, raw)?
            };

            options.set(name, value);
        }

        Ok(options)
    }

    /// Injects the defaults every command body may rely on.
    ///
    /// - `logged_user` is the configured GitHub login.
    /// - A declared `user` option defaults to the logged user.
    /// - A declared enumerated `type` option defaults to its first member.
    pub fn inject_defaults(
        descriptor: &CommandDescriptor,
        options: &mut ResolvedOptions,
        logged_user: Option<&str>,
    ) {
        options.set_logged_user(logged_user.map(str::to_string));

        if descriptor.option_type(USER_OPTION).is_some() && !options.is_set(USER_OPTION) {
            if let Some(user) = logged_user {
                options.set_string(USER_OPTION, user);
            }
        }

        if let Some(OptionType::OneOf(members)) = descriptor.option_type(TYPE_OPTION) {
            if !options.is_set(TYPE_OPTION) {
                if let Some(first) = members.first() {
                    options.set_string(TYPE_OPTION, first.clone());
                }
            }
        }
    }
}

/// Returns the flag letters of a short-flag token such as `-B` or `-Bc`.
fn short_flags(token: &str) -> Option<&str> {
    let flags = token.strip_prefix('-')?;
    if flags.is_empty() || flags.starts_with('-') || flags.parse::<f64>().is_ok() {
        return None;
    }
    Some(flags)
}

fn parse_bool(name: &str, raw: Option<&str>) -> Result<bool> {
    match raw {
        None | Some("true") => Ok(true),
        Some("false") => Ok(false),
        Some(other) => Err(CommandError::invalid_option(
            name,
            format!("expected true or false, got {other:?}"),
        )),
    }
}

/// Coerces a raw value to an option's declared type.
///
/// # Errors
///
/// Returns [`CommandError::InvalidOption`] when the value does not parse.
pub fn coerce(name: &str, kind: &OptionType, raw: &str) -> Result<OptionValue> {
    let invalid = |reason: String| CommandError::invalid_option(name, reason);

    match kind {
        OptionType::String | OptionType::Other(_) => Ok(OptionValue::String(raw.to_string())),
        OptionType::Boolean => parse_bool(name, Some(raw)).map(OptionValue::Bool),
        OptionType::Number => raw
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(OptionValue::Number)
            .ok_or_else(|| invalid(format!("expected a number, got {raw:?}"))),
        OptionType::Url => Url::parse(raw)
            .map(OptionValue::Url)
            .map_err(|e| invalid(format!("expected a URL, got {raw:?}: {e}"))),
        OptionType::Path => resolve_path(raw)
            .map(OptionValue::Path)
            .map_err(|e| invalid(format!("cannot resolve path {raw:?}: {e}"))),
        OptionType::Stream if raw == "-" => Ok(OptionValue::Stream(StreamSource::Stdin)),
        OptionType::Stream => resolve_path(raw)
            .map(|path| OptionValue::Stream(StreamSource::File(path)))
            .map_err(|e| invalid(format!("cannot resolve path {raw:?}: {e}"))),
        OptionType::Date => parse_date(raw)
            .map(OptionValue::Date)
            .ok_or_else(|| invalid(format!("expected an RFC 3339 date or YYYY-MM-DD, got {raw:?}"))),
        OptionType::OneOf(members) => {
            if members.iter().any(|member| member == raw) {
                Ok(OptionValue::String(raw.to_string()))
            } else {
                Err(invalid(format!(
                    "expected one of: {}, got {raw:?}",
                    members.join(", ")
                )))
            }
        }
    }
}

/// Expands a leading `~` and makes the path absolute.
fn resolve_path(raw: &str) -> std::io::Result<PathBuf> {
    let expanded = match raw.strip_prefix("~") {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => match dirs::home_dir() {
            Some(home) => home.join(rest.trim_start_matches('/')),
            None => PathBuf::from(raw),
        },
        _ => PathBuf::from(raw),
    };
    std::path::absolute(expanded)
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|date| date.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn repo() -> CommandDescriptor {
        CommandDescriptor::new("repo")
            .option("browser", OptionType::Boolean)
            .option("clone", OptionType::Boolean)
            .option("delete", OptionType::String)
            .option("list", OptionType::Boolean)
            .option(
                "type",
                OptionType::OneOf(
                    ["all", "member", "owner", "public", "private"]
                        .map(String::from)
                        .to_vec(),
                ),
            )
            .option("user", OptionType::String)
            .shorthand("B", ["--browser"])
            .shorthand("c", ["--clone"])
            .shorthand("D", ["--delete"])
            .shorthand("l", ["--list"])
            .shorthand("t", ["--type"])
            .shorthand("u", ["--user"])
            .shorthand("o", ["--type", "owner"])
            .payload(|_, options| options.set_flag("browser", true))
    }

    #[test]
    fn shorthand_expands_to_long_flag() {
        let options = OptionExpander::expand(&repo(), &args(&["-l", "-u", "octocat"])).unwrap();
        assert!(options.flag("list"));
        assert_eq!(options.string("user"), Some("octocat"));
    }

    #[test]
    fn shorthand_with_multiple_tokens() {
        let options = OptionExpander::expand(&repo(), &args(&["-o"])).unwrap();
        assert_eq!(options.string("type"), Some("owner"));
    }

    #[test]
    fn bundled_short_flags() {
        let options = OptionExpander::expand(&repo(), &args(&["-lc"])).unwrap();
        assert!(options.flag("list"));
        assert!(options.flag("clone"));
    }

    #[test]
    fn unknown_short_flag_is_rejected() {
        let result = OptionExpander::expand(&repo(), &args(&["-z"]));
        assert!(matches!(result, Err(CommandError::InvalidOption { .. })));
    }

    #[test]
    fn inline_values() {
        let options =
            OptionExpander::expand(&repo(), &args(&["--user=octocat", "--list=false"])).unwrap();
        assert_eq!(options.string("user"), Some("octocat"));
        assert!(!options.flag("list"));
        assert!(options.is_set("list"));
    }

    #[test]
    fn negated_boolean() {
        let options = OptionExpander::expand(&repo(), &args(&["--no-clone"])).unwrap();
        assert_eq!(options.get("clone"), Some(&OptionValue::Bool(false)));
    }

    #[test]
    fn boolean_consumes_explicit_literal_only() {
        let options = OptionExpander::expand(&repo(), &args(&["--list", "false"])).unwrap();
        assert!(!options.flag("list"));

        let options = OptionExpander::expand(&repo(), &args(&["--list", "gh"])).unwrap();
        assert!(options.flag("list"));
        assert_eq!(options.positional(), ["gh"]);
    }

    #[test]
    fn enumerated_value_must_be_member() {
        let options = OptionExpander::expand(&repo(), &args(&["-t", "owner"])).unwrap();
        assert_eq!(options.string("type"), Some("owner"));

        let result = OptionExpander::expand(&repo(), &args(&["--type", "forks"]));
        match result {
            Err(CommandError::InvalidOption { option, reason }) => {
                assert_eq!(option, "type");
                assert!(reason.contains("all, member, owner, public, private"));
            }
            other => panic!("expected InvalidOption, got {other:?}"),
        }
    }

    #[test]
    fn missing_value_is_rejected() {
        let result = OptionExpander::expand(&repo(), &args(&["--delete"]));
        assert!(matches!(result, Err(CommandError::InvalidOption { .. })));

        let result = OptionExpander::expand(&repo(), &args(&["--delete", "--list"]));
        assert!(matches!(result, Err(CommandError::InvalidOption { .. })));
    }

    #[test]
    fn unknown_long_flag_is_rejected() {
        let result = OptionExpander::expand(&repo(), &args(&["--frobnicate"]));
        match result {
            Err(CommandError::InvalidOption { option, .. }) => assert_eq!(option, "frobnicate"),
            other => panic!("expected InvalidOption, got {other:?}"),
        }
    }

    #[test]
    fn payload_runs_only_with_positional() {
        let options = OptionExpander::expand(&repo(), &args(&["gh"])).unwrap();
        assert!(options.flag("browser"));
        assert_eq!(options.positional(), ["gh"]);

        let options = OptionExpander::expand(&repo(), &args(&["-l"])).unwrap();
        assert!(!options.flag("browser"));
    }

    #[test]
    fn double_dash_ends_flags() {
        let options = OptionExpander::expand(&repo(), &args(&["--", "-l", "--list"])).unwrap();
        assert!(!options.flag("list"));
        assert_eq!(options.positional(), ["-l", "--list"]);
    }

    #[test]
    fn coerce_number_url_date_stream() {
        assert_eq!(
            coerce("n", &OptionType::Number, "-2.5").unwrap(),
            OptionValue::Number(-2.5)
        );
        assert!(coerce("n", &OptionType::Number, "many").is_err());

        let url = coerce("u", &OptionType::Url, "https://github.com/octocat").unwrap();
        assert!(matches!(url, OptionValue::Url(u) if u.host_str() == Some("github.com")));
        assert!(coerce("u", &OptionType::Url, "not a url").is_err());

        let date = coerce("d", &OptionType::Date, "2024-02-29").unwrap();
        assert!(matches!(date, OptionValue::Date(d) if d.to_rfc3339() == "2024-02-29T00:00:00+00:00"));
        assert!(coerce("d", &OptionType::Date, "2024-02-30").is_err());

        assert_eq!(
            coerce("s", &OptionType::Stream, "-").unwrap(),
            OptionValue::Stream(StreamSource::Stdin)
        );
    }

    #[test]
    fn coerce_path_is_absolute() {
        let value = coerce("p", &OptionType::Path, "some/file.txt").unwrap();
        match value {
            OptionValue::Path(path) => {
                assert!(path.is_absolute());
                assert!(path.ends_with("some/file.txt"));
            }
            other => panic!("expected a path, got {other:?}"),
        }
    }

    #[test]
    fn negative_number_is_not_a_short_flag() {
        let descriptor = CommandDescriptor::new("calc").option("offset", OptionType::Number);
        let options = OptionExpander::expand(&descriptor, &args(&["--offset", "-3"])).unwrap();
        assert_eq!(options.number("offset"), Some(-3.0));
    }

    #[test]
    fn inject_defaults_fills_user_and_type() {
        let descriptor = repo();
        let mut options = ResolvedOptions::new();
        OptionExpander::inject_defaults(&descriptor, &mut options, Some("octocat"));

        assert_eq!(options.logged_user(), Some("octocat"));
        assert_eq!(options.string("user"), Some("octocat"));
        assert_eq!(options.string("type"), Some("all"));
    }

    #[test]
    fn inject_defaults_keeps_explicit_values() {
        let descriptor = repo();
        let mut options =
            OptionExpander::expand(&descriptor, &args(&["-u", "hubot", "-t", "owner"])).unwrap();
        OptionExpander::inject_defaults(&descriptor, &mut options, Some("octocat"));

        assert_eq!(options.string("user"), Some("hubot"));
        assert_eq!(options.string("type"), Some("owner"));
    }

    #[test]
    fn inject_defaults_skips_undeclared_options() {
        let descriptor = CommandDescriptor::new("hello").option("world", OptionType::Boolean);
        let mut options = ResolvedOptions::new();
        OptionExpander::inject_defaults(&descriptor, &mut options, Some("octocat"));

        assert!(!options.is_set("user"));
        assert!(!options.is_set("type"));
        assert_eq!(options.logged_user(), Some("octocat"));
    }

    proptest! {
        #[test]
        fn every_declared_shorthand_sets_its_flag(picks in proptest::collection::vec(0usize..4, 1..8)) {
            let letters = ["B", "c", "l", "D"];
            let mut raw = Vec::new();
            for pick in &picks {
                raw.push(format!("-{}", letters[*pick]));
                if letters[*pick] == "D" {
                    raw.push("old-repo".to_string());
                }
            }

            let options = OptionExpander::expand(&repo(), &raw).unwrap();
            for pick in &picks {
                match letters[*pick] {
                    "B" => prop_assert!(options.flag("browser")),
                    "c" => prop_assert!(options.flag("clone")),
                    "l" => prop_assert!(options.flag("list")),
                    _ => prop_assert_eq!(options.string("delete"), Some("old-repo")),
                }
            }
            prop_assert!(options.positional().is_empty());
        }
    }
}
