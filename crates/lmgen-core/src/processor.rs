//! Output post-processing stages.
//!
//! Processors run after the client has parsed the completion and transform
//! the parsed value step by step. A chain stops at the first failing stage
//! and reports the last value that was produced successfully, so callers can
//! still inspect partial results.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use lmgen_utils::ProcessorError;

/// One post-processing stage over a parsed completion.
pub trait OutputProcessor: Send + Sync {
    /// Short name used in logs and chain failure messages.
    fn name(&self) -> &str;

    fn process(&self, input: Value) -> Result<Value, ProcessorError>;
}

/// Failure of a [`ProcessorChain`], carrying the last successful value.
#[derive(Debug)]
pub struct ChainFailure {
    /// Name of the stage that failed.
    pub stage: String,
    /// Output of the last stage that succeeded (the chain input if the first
    /// stage failed).
    pub partial: Value,
    pub error: ProcessorError,
}

impl std::fmt::Display for ChainFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "processor '{}' failed: {}", self.stage, self.error)
    }
}

/// An ordered pipeline of processors applied left to right.
pub struct ProcessorChain {
    stages: Vec<Box<dyn OutputProcessor>>,
}

impl ProcessorChain {
    #[must_use]
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    #[must_use]
    pub fn with(mut self, stage: impl OutputProcessor + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run every stage in order. On the first failure, returns the failing
    /// stage's name, the error, and the most recent successful value.
    pub fn run(&self, input: Value) -> Result<Value, ChainFailure> {
        let mut current = input;
        for stage in &self.stages {
            match stage.process(current.clone()) {
                Ok(next) => current = next,
                Err(error) => {
                    return Err(ChainFailure {
                        stage: stage.name().to_string(),
                        partial: current,
                        error,
                    });
                }
            }
        }
        Ok(current)
    }
}

impl Default for ProcessorChain {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ProcessorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.stages.iter().map(|s| s.name()).collect();
        f.debug_struct("ProcessorChain").field("stages", &names).finish()
    }
}

/// Strips leading and trailing whitespace from string values; passes other
/// value kinds through untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct TrimWhitespace;

impl OutputProcessor for TrimWhitespace {
    fn name(&self) -> &str {
        "trim_whitespace"
    }

    fn process(&self, input: Value) -> Result<Value, ProcessorError> {
        match input {
            Value::String(s) => Ok(Value::String(s.trim().to_string())),
            other => Ok(other),
        }
    }
}

static CODE_FENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(?:[A-Za-z0-9_+-]*)\r?\n(.*?)```").unwrap()
});

/// Extracts the body of the first triple-backtick code fence in a string.
///
/// Fails when the input is not a string or contains no fence, since a
/// downstream stage usually depends on the extracted body.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExtractCodeFence;

impl OutputProcessor for ExtractCodeFence {
    fn name(&self) -> &str {
        "extract_code_fence"
    }

    fn process(&self, input: Value) -> Result<Value, ProcessorError> {
        let Value::String(text) = input else {
            return Err(ProcessorError::Failed(
                "expected a string input for code fence extraction".to_string(),
            ));
        };
        match CODE_FENCE_RE.captures(&text) {
            Some(caps) => Ok(Value::String(caps[1].trim_end().to_string())),
            None => Err(ProcessorError::Failed(
                "no fenced code block found in input".to_string(),
            )),
        }
    }
}

/// Parses a string value as JSON, yielding the parsed value.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonParse;

impl OutputProcessor for JsonParse {
    fn name(&self) -> &str {
        "json_parse"
    }

    fn process(&self, input: Value) -> Result<Value, ProcessorError> {
        let Value::String(text) = input else {
            return Err(ProcessorError::Failed(
                "expected a string input for JSON parsing".to_string(),
            ));
        };
        let parsed = serde_json::from_str(&text)?;
        Ok(parsed)
    }
}
