//! Configuration file reading and writing.
//!
//! Every config layer is a JSON object on disk. Files are parsed with
//! `serde_json5`, which accepts plain JSON and tolerates comments and
//! trailing commas in hand-edited files.
//!
//! The user file may hold a GitHub token, so it is always written with
//! owner-only permissions (`0600` on Unix) and pretty-printed with four
//! spaces of indentation.

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{ConfigError, Result};

/// A JSON object as read from a config layer.
pub type ConfigMap = Map<String, Value>;

/// Parses the text of a config file into a JSON object.
///
/// `path` is only used to label errors.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] for malformed JSON and
/// [`ConfigError::NotAnObject`] when the top-level value is not an object.
pub fn parse_config(content: &str, path: &Path) -> Result<ConfigMap> {
    let value: Value = serde_json5::from_str(content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ConfigError::NotAnObject {
            path: path.to_path_buf(),
        }),
    }
}

/// Reads and parses a configuration file.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read (including when it does not exist)
/// - The file content is not a JSON object
///
/// # Examples
///
/// ```no_run
/// use gh_config::persistence::read_config_file;
///
/// # fn main() -> gh_config::Result<()> {
/// let config = read_config_file(".gh.json")?;
/// println!("{} top-level keys", config.len());
/// # Ok(())
/// # }
/// ```
pub fn read_config_file(path: impl AsRef<Path>) -> Result<ConfigMap> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_config(&content, path)
}

/// Reads a configuration file that is allowed to be absent.
///
/// Returns `Ok(None)` when the file does not exist. Every other failure,
/// including malformed JSON, is an error.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn read_optional_config_file(path: impl AsRef<Path>) -> Result<Option<ConfigMap>> {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(content) => parse_config(&content, path).map(Some),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Serializes a value as JSON indented with four spaces.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(buf)
}

/// Writes a configuration to a file with owner-only permissions.
///
/// Parent directories are created when missing. An existing file is
/// truncated and its permissions are reset to `0600`.
///
/// # Errors
///
/// Returns an error if:
/// - The parent directory cannot be created
/// - The file cannot be written
/// - The configuration cannot be serialized
pub fn write_config_file<T: Serialize + ?Sized>(path: impl AsRef<Path>, config: &T) -> Result<()> {
    let content = to_pretty_json(config)?;
    write_private_file(path.as_ref(), &content)
}

/// Writes raw bytes to a file with owner-only permissions.
///
/// Used to bootstrap the user file as a verbatim copy of the packaged
/// default. Parent directories are created when missing.
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created or the file
/// cannot be written.
pub fn write_private_file(path: &Path, content: &[u8]) -> Result<()> {
    let write_err = |e| ConfigError::WriteFile {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty() && !p.exists())
    {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path).map_err(write_err)?;
    file.write_all(content).map_err(write_err)?;

    // `mode` only applies on creation; tighten files that already existed.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .map_err(write_err)?;
    }

    Ok(())
}
