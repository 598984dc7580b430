//! Multi-format parse/write dispatch.
//!
//! Configuration files may be YAML, JSON, TOML, or INI. Reading a file with
//! no reliable extension tries each format in turn and only fails when none
//! of them yields a mapping. Writing dispatches on an explicit format hint
//! or the file extension, defaulting to YAML.
//!
//! Workspace manifests are special-cased: `pyproject.toml` and `Cargo.toml`
//! carry project configuration in a named TOML section, `setup.cfg` in
//! prefixed INI sections.

use std::path::Path;

use ini::Ini;
use serde_json::Value;
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::merge::deep_merge;

/// The common mapping type every format parses into.
pub type Mapping = serde_json::Map<String, Value>;

/// Extensions recognized as configuration files, in candidate order.
pub const CONF_EXTENSIONS: &[&str] = &["yml", "yaml", "json", "toml", "conf", "cfg", "ini"];

/// Manifest files that may embed a project section.
pub const MANIFEST_NAMES: &[&str] = &["pyproject.toml", "Cargo.toml", "setup.cfg"];

/// A concrete configuration format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
    Ini,
}

impl ConfigFormat {
    /// Guess the format from a file extension. Unknown extensions fall back
    /// to YAML, matching the read-side fallback chain's first step.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => ConfigFormat::Json,
            Some("toml") => ConfigFormat::Toml,
            Some("conf" | "cfg" | "ini") => ConfigFormat::Ini,
            _ => ConfigFormat::Yaml,
        }
    }
}

/// Behavior when the target of a write already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Refuse to touch an existing file.
    #[default]
    Fail,
    /// Deep-merge the new data over the existing content.
    Update,
    /// Replace the file.
    Overwrite,
}

fn require_mapping(value: Value, path: &Path) -> Result<Mapping> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ConfigError::NotAMapping {
            path: path.to_path_buf(),
        }),
    }
}

/// Parse a YAML file into a mapping.
pub fn parse_yaml(path: &Path) -> Result<Mapping> {
    let text = std::fs::read_to_string(path)?;
    let value: Value = serde_yaml::from_str(&text)?;
    require_mapping(value, path)
}

/// Parse a JSON file into a mapping.
pub fn parse_json(path: &Path) -> Result<Mapping> {
    let text = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&text)?;
    require_mapping(value, path)
}

/// Parse a TOML file into a mapping.
///
/// With `section`, return that dotted-path subtable (`tool.myproj`), or an
/// empty mapping when the manifest simply has no such section.
pub fn parse_toml(path: &Path, section: Option<&str>) -> Result<Mapping> {
    let text = std::fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&text)?;
    let mut value = serde_json::to_value(value)?;

    if let Some(section) = section {
        for key in section.split('.') {
            match value.get_mut(key) {
                Some(inner) => value = inner.take(),
                None => return Ok(Mapping::new()),
            }
        }
        if value.is_null() {
            return Ok(Mapping::new());
        }
    }
    require_mapping(value, path)
}

/// Parse an INI file into a mapping of section name to key/value strings.
///
/// With `section`, keep only sections named `<section>.<rest>`, keyed by
/// `<rest>`.
pub fn parse_ini(path: &Path, section: Option<&str>) -> Result<Mapping> {
    // Unwrap the loader's error so I/O failures stay I/O failures and the
    // read paths can keep treating them as "unavailable".
    let conf = Ini::load_from_file(path).map_err(|err| match err {
        ini::Error::Io(err) => ConfigError::from(err),
        ini::Error::Parse(err) => ConfigError::from(err),
    })?;
    let mut out = Mapping::new();

    for (name, properties) in conf.iter() {
        let mut entries = Mapping::new();
        for (key, value) in properties.iter() {
            entries.insert(key.to_string(), Value::String(value.to_string()));
        }
        match (name, section) {
            (Some(name), Some(section)) => {
                if let Some(rest) = name.strip_prefix(section).and_then(|n| n.strip_prefix('.')) {
                    out.insert(rest.to_string(), Value::Object(entries));
                }
            }
            (Some(name), None) => {
                out.insert(name.to_string(), Value::Object(entries));
            }
            // Sectionless keys only make sense without a section filter.
            (None, None) => out.extend(entries),
            (None, Some(_)) => {}
        }
    }
    Ok(out)
}

/// Parse a configuration file of unknown or manifest format.
///
/// Manifests dispatch straight to their embedded project section. Anything
/// else runs the fallback chain YAML, JSON, TOML, INI; if every format is
/// rejected the file is reported as bad configuration.
pub fn parse_file(path: &Path, project: Option<&str>) -> Result<Mapping> {
    match path.file_name().and_then(|n| n.to_str()) {
        Some("setup.cfg") => return parse_ini(path, project),
        Some("pyproject.toml") => {
            let section = project.map(|p| format!("tool.{p}"));
            return parse_toml(path, section.as_deref());
        }
        Some("Cargo.toml") => {
            let section = project.map(|p| format!("package.metadata.{p}"));
            return parse_toml(path, section.as_deref());
        }
        _ => {}
    }

    match parse_yaml(path) {
        Ok(map) => return Ok(map),
        Err(err @ ConfigError::Io(_)) => return Err(err),
        Err(err) => debug!(path = %path.display(), %err, "not yaml"),
    }
    match parse_json(path) {
        Ok(map) => return Ok(map),
        Err(err @ ConfigError::Io(_)) => return Err(err),
        Err(err) => debug!(path = %path.display(), %err, "not json"),
    }
    match parse_toml(path, None) {
        Ok(map) => return Ok(map),
        Err(err @ ConfigError::Io(_)) => return Err(err),
        Err(err) => debug!(path = %path.display(), %err, "not toml"),
    }
    match parse_ini(path, None) {
        Ok(map) => return Ok(map),
        Err(err @ ConfigError::Io(_)) => return Err(err),
        Err(err) => debug!(path = %path.display(), %err, "not ini"),
    }

    Err(ConfigError::BadConfig {
        path: path.to_path_buf(),
    })
}

/// Resolve existing content per the write mode and create parent dirs.
///
/// Returns `None` when the target exists and the mode is [`WriteMode::Fail`].
fn prepare_write(
    data: &Mapping,
    path: &Path,
    mode: WriteMode,
    parse: impl Fn(&Path) -> Result<Mapping>,
) -> Result<Option<Mapping>> {
    let mut out = data.clone();
    if path.is_file() {
        match mode {
            WriteMode::Fail => return Ok(None),
            WriteMode::Update => {
                let old = parse(path)?;
                out = match deep_merge(Value::Object(old), Value::Object(out)) {
                    Value::Object(map) => map,
                    _ => data.clone(),
                };
            }
            WriteMode::Overwrite => {}
        }
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(Some(out))
}

/// Write a mapping as YAML. Returns false when refusing per `mode`.
pub fn write_yaml(data: &Mapping, path: &Path, mode: WriteMode) -> Result<bool> {
    let Some(out) = prepare_write(data, path, mode, parse_yaml)? else {
        return Ok(false);
    };
    std::fs::write(path, serde_yaml::to_string(&Value::Object(out))?)?;
    Ok(true)
}

/// Write a mapping as JSON. Returns false when refusing per `mode`.
pub fn write_json(data: &Mapping, path: &Path, mode: WriteMode) -> Result<bool> {
    let Some(out) = prepare_write(data, path, mode, parse_json)? else {
        return Ok(false);
    };
    let mut text = serde_json::to_string_pretty(&Value::Object(out))?;
    text.push('\n');
    std::fs::write(path, text)?;
    Ok(true)
}

/// Write a mapping as TOML. Returns false when refusing per `mode`.
pub fn write_toml(data: &Mapping, path: &Path, mode: WriteMode) -> Result<bool> {
    let Some(out) = prepare_write(data, path, mode, |p| parse_toml(p, None))? else {
        return Ok(false);
    };
    std::fs::write(path, toml::to_string_pretty(&out)?)?;
    Ok(true)
}

/// Write a mapping as INI. Returns false when refusing per `mode`.
///
/// Mapping-valued entries become sections; everything else lands in the
/// sectionless prelude, stringified.
pub fn write_ini(data: &Mapping, path: &Path, mode: WriteMode) -> Result<bool> {
    let Some(out) = prepare_write(data, path, mode, |p| parse_ini(p, None))? else {
        return Ok(false);
    };

    let mut conf = Ini::new();
    for (key, value) in &out {
        match value {
            Value::Object(entries) => {
                for (k, v) in entries {
                    conf.set_to(Some(key.clone()), k.clone(), scalar_to_string(v));
                }
            }
            other => {
                conf.set_to(None::<String>, key.clone(), scalar_to_string(other));
            }
        }
    }
    conf.write_to_file(path)?;
    Ok(true)
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Write a mapping, dispatching on `format` or the file extension.
pub fn write_file(
    data: &Mapping,
    path: &Path,
    format: Option<ConfigFormat>,
    mode: WriteMode,
) -> Result<bool> {
    match format.unwrap_or_else(|| ConfigFormat::from_path(path)) {
        ConfigFormat::Yaml => write_yaml(data, path, mode),
        ConfigFormat::Json => write_json(data, path, mode),
        ConfigFormat::Toml => write_toml(data, path, mode),
        ConfigFormat::Ini => write_ini(data, path, mode),
    }
}
