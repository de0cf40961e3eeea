//! Task definitions from files and command-line flags.
//!
//! A config file (YAML or TOML, picked by extension) is read into a JSON
//! document, flags are written over it, and the result is deserialized into
//! a [`QueryTask`] or [`PollingTrigger`]. Field names follow the file
//! format: `fetchType`, `connectionTimeout` and so on.

use std::path::Path;

use anyhow::{bail, Context};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use surreal_query_connection::AuthLevel;
use surreal_query_task::{Parameters, QueryTask, Variables};
use surreal_query_trigger::PollingTrigger;

use crate::{ConnectionOpts, QueryOpts, WatchOpts};

/// Default trigger id when neither the file nor `--id` names one.
pub const DEFAULT_TRIGGER_ID: &str = "surreal-query";

/// Read a YAML or TOML file into a JSON object.
pub fn load_document(path: &Path) -> anyhow::Result<Map<String, Value>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {path:?}"))?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase);

    let document: Value = match extension.as_deref() {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML config {path:?}"))?,
        Some("toml") => toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config {path:?}"))?,
        _ => bail!("Unsupported config file {path:?}: expected a .yaml, .yml or .toml extension"),
    };

    match document {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        _ => bail!("Config file {path:?} must contain a mapping at the top level"),
    }
}

/// Build the one-shot task from an optional file plus flag overrides.
pub fn query_task(opts: &QueryOpts) -> anyhow::Result<QueryTask> {
    let document = query_document(opts)?;
    deserialize(document).context("Invalid query task definition")
}

/// Build the polling trigger from an optional file plus flag overrides.
pub fn polling_trigger(opts: &WatchOpts) -> anyhow::Result<PollingTrigger> {
    let mut document = query_document(&opts.query)?;

    if let Some(id) = &opts.id {
        document.insert("id".to_string(), Value::String(id.clone()));
    }
    document
        .entry("id")
        .or_insert_with(|| Value::String(DEFAULT_TRIGGER_ID.to_string()));

    if let Some(interval) = &opts.interval {
        document.insert("interval".to_string(), Value::String(interval.clone()));
    }

    deserialize(document).context("Invalid trigger definition")
}

/// Template variables from `--var NAME=VALUE` flags.
pub fn variables(vars: &[String]) -> anyhow::Result<Variables> {
    vars.iter()
        .map(|var| -> anyhow::Result<(String, String)> {
            let (name, value) = split_assignment(var, "--var")?;
            Ok((name.to_string(), value.to_string()))
        })
        .collect()
}

/// Query parameters from `--param NAME=VALUE` flags.
///
/// Values that parse as a JSON scalar (`42`, `true`, `null`, `"quoted"`)
/// keep that type; anything else is bound as a plain string.
pub fn parameters(params: &[String]) -> anyhow::Result<Parameters> {
    params
        .iter()
        .map(|param| -> anyhow::Result<(String, Value)> {
            let (name, raw) = split_assignment(param, "--param")?;
            let value = match serde_json::from_str::<Value>(raw) {
                Ok(value) if !value.is_array() && !value.is_object() => value,
                _ => Value::String(raw.to_string()),
            };
            Ok((name.to_string(), value))
        })
        .collect()
}

fn query_document(opts: &QueryOpts) -> anyhow::Result<Map<String, Value>> {
    let mut document = match &opts.config {
        Some(path) => load_document(path)?,
        None => Map::new(),
    };

    apply_connection_overrides(&mut document, &opts.connection);

    if let Some(query) = &opts.query {
        set_field(&mut document, "query", Value::String(query.clone()));
    }
    if let Some(fetch_type) = opts.fetch_type {
        set_field(&mut document, "fetchType", Value::String(fetch_type.to_string()));
    }

    if !opts.params.is_empty() {
        let overrides = parameters(&opts.params)?;
        let entry = document
            .entry("parameters")
            .or_insert_with(|| Value::Object(Map::new()));
        match entry {
            Value::Object(existing) => existing.extend(overrides),
            _ => bail!("'parameters' in the config file must be a mapping"),
        }
    }

    Ok(document)
}

fn apply_connection_overrides(document: &mut Map<String, Value>, opts: &ConnectionOpts) {
    let mut set = |key: &str, value: Value| set_field(document, key, value);

    if let Some(host) = &opts.host {
        set("host", Value::String(host.clone()));
    }
    if let Some(port) = opts.port {
        set("port", Value::from(port));
    }
    if opts.use_tls {
        set("useTls", Value::Bool(true));
    }
    if let Some(endpoint) = &opts.endpoint {
        set("endpoint", Value::String(endpoint.clone()));
    }
    if let Some(username) = &opts.username {
        set("username", Value::String(username.clone()));
    }
    if let Some(password) = &opts.password {
        set("password", Value::String(password.clone()));
    }
    if let Some(auth_level) = opts.auth_level {
        let level = match auth_level {
            AuthLevel::Root => "root",
            AuthLevel::Namespace => "namespace",
            AuthLevel::Database => "database",
        };
        set("authLevel", Value::String(level.to_string()));
    }
    if let Some(namespace) = &opts.namespace {
        set("namespace", Value::String(namespace.clone()));
    }
    if let Some(database) = &opts.database {
        set("database", Value::String(database.clone()));
    }
    if let Some(timeout) = &opts.connection_timeout {
        set("connectionTimeout", Value::String(timeout.clone()));
    }
}

/// Overwrite a field, dropping its snake_case spelling so the new value wins
/// over either form.
fn set_field(document: &mut Map<String, Value>, key: &str, value: Value) {
    document.remove(&to_snake_case(key));
    document.insert(key.to_string(), value);
}

fn to_snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 2);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn split_assignment<'a>(input: &'a str, flag: &str) -> anyhow::Result<(&'a str, &'a str)> {
    match input.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim(), value)),
        _ => bail!("Invalid {flag} '{input}': expected NAME=VALUE"),
    }
}

fn deserialize<T: DeserializeOwned>(document: Map<String, Value>) -> anyhow::Result<T> {
    Ok(serde_json::from_value(Value::Object(document))?)
}
