//! Templating seam.
//!
//! The host engine renders templated properties before they are used.
//! [`Passthrough`] leaves values untouched, [`Variables`] substitutes
//! `{{ name }}` placeholders from a fixed map.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::Parameters;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("Undefined template variable '{0}'")]
    UndefinedVariable(String),

    #[error("Unterminated template expression in '{0}'")]
    Unterminated(String),
}

/// Renders templated strings.
pub trait Render: Send + Sync {
    fn render(&self, input: &str) -> Result<String, RenderError>;

    /// Render every string value of a parameter map. Keys and non-string
    /// values are left as they are.
    fn render_map(&self, parameters: &Parameters) -> Result<Parameters, RenderError> {
        parameters
            .iter()
            .map(|(name, value)| -> Result<(String, serde_json::Value), RenderError> {
                let rendered = match value {
                    serde_json::Value::String(s) => serde_json::Value::String(self.render(s)?),
                    other => other.clone(),
                };
                Ok((name.clone(), rendered))
            })
            .collect()
    }
}

/// Renderer that returns its input unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl Render for Passthrough {
    fn render(&self, input: &str) -> Result<String, RenderError> {
        Ok(input.to_string())
    }
}

/// Renderer substituting `{{ name }}` placeholders.
#[derive(Debug, Clone, Default)]
pub struct Variables {
    values: BTreeMap<String, String>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }
}

impl FromIterator<(String, String)> for Variables {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl Render for Variables {
    fn render(&self, input: &str) -> Result<String, RenderError> {
        let mut output = String::with_capacity(input.len());
        let mut rest = input;

        while let Some(start) = rest.find("{{") {
            output.push_str(&rest[..start]);
            let after_open = &rest[start + 2..];
            let end = after_open
                .find("}}")
                .ok_or_else(|| RenderError::Unterminated(input.to_string()))?;

            let name = after_open[..end].trim();
            let value = self
                .values
                .get(name)
                .ok_or_else(|| RenderError::UndefinedVariable(name.to_string()))?;
            output.push_str(value);

            rest = &after_open[end + 2..];
        }

        output.push_str(rest);
        Ok(output)
    }
}
