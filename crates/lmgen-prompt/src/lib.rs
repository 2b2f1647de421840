//! Prompt templates for lmgen
//!
//! A template is plain text with `{{ variable }}` placeholders. Construction
//! discovers the declared variable set; rendering binds every declared
//! variable from caller-supplied values and construction-time presets
//! (caller wins) and substitutes them. Rendering is strict: a declared
//! variable with no binding is an error, because an under-specified prompt is
//! a caller bug, not a model failure.

use lmgen_utils::error::PromptError;
use lmgen_utils::types::PromptKwargs;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::{BTreeSet, HashMap};

/// Matches `{{ name }}` placeholders; names are identifier-like.
static VARIABLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").unwrap());

/// Default system-prompt template used when a Generator is built without an
/// explicit template. Both variables are required at render time.
pub const DEFAULT_SYSTEM_TEMPLATE: &str = "\
<SYS>
{{task_desc_str}}
</SYS>
User: {{input_str}}
You:";

/// A prompt template plus its preset variable values.
///
/// Immutable after construction. Cheap to clone; rendering never mutates.
#[derive(Debug, Clone)]
pub struct Prompt {
    template: String,
    variables: BTreeSet<String>,
    preset: PromptKwargs,
}

impl Prompt {
    /// Create a prompt from a template string and optional preset values.
    ///
    /// Preset values fill variables at render time unless the caller supplies
    /// the same variable. Preset keys that no placeholder declares are
    /// silently ignored.
    ///
    /// # Errors
    ///
    /// Returns `PromptError::EmptyTemplate` when the template is blank.
    pub fn new(
        template: impl Into<String>,
        preset: Option<PromptKwargs>,
    ) -> Result<Self, PromptError> {
        let template = template.into();
        if template.trim().is_empty() {
            return Err(PromptError::EmptyTemplate);
        }

        let variables = VARIABLE_RE
            .captures_iter(&template)
            .map(|caps| caps[1].to_string())
            .collect();

        Ok(Self {
            template,
            variables,
            preset: preset.unwrap_or_default(),
        })
    }

    /// The set of variable names this template declares.
    #[must_use]
    pub fn prompt_variables(&self) -> &BTreeSet<String> {
        &self.variables
    }

    /// The raw template text.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Preset value for a variable, if one was configured.
    #[must_use]
    pub fn preset_value(&self, name: &str) -> Option<&serde_json::Value> {
        self.preset.get(name)
    }

    /// Render the template with the given variables.
    ///
    /// Caller-supplied values take precedence over presets. String values
    /// substitute verbatim; other JSON values substitute as compact JSON.
    ///
    /// # Errors
    ///
    /// Returns `PromptError::MissingVariable` when a declared variable has
    /// neither a caller value nor a preset.
    pub fn render(&self, vars: &PromptKwargs) -> Result<String, PromptError> {
        let mut bound: HashMap<&str, String> = HashMap::with_capacity(self.variables.len());
        for name in &self.variables {
            let value = vars
                .get(name)
                .or_else(|| self.preset.get(name))
                .ok_or_else(|| PromptError::MissingVariable { name: name.clone() })?;
            bound.insert(name.as_str(), render_value(value));
        }

        let rendered = VARIABLE_RE.replace_all(&self.template, |caps: &Captures<'_>| {
            // Every captured name is in `bound`; discovery and substitution
            // use the same regex.
            bound.get(&caps[1]).cloned().unwrap_or_default()
        });

        Ok(rendered.into_owned())
    }
}

/// Textualize a JSON value for substitution into a prompt.
fn render_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
