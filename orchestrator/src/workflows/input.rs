//! Typed workflow inputs
//!
//! Text workflows take a JSON string. Structured workflows take a JSON object
//! whose missing fields fall back to defaults; `null` means all defaults.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::workflow::WorkflowError;

pub fn text_input(input: Value) -> Result<String, WorkflowError> {
    match input {
        Value::String(text) if !text.trim().is_empty() => Ok(text),
        Value::String(_) => Err(WorkflowError::InvalidInput(
            "expected a non-empty string".to_string(),
        )),
        other => Err(WorkflowError::InvalidInput(format!(
            "expected a string, got {}",
            json_type(&other)
        ))),
    }
}

pub fn structured_input<T: DeserializeOwned + Default>(input: Value) -> Result<T, WorkflowError> {
    match input {
        Value::Null => Ok(T::default()),
        Value::Object(_) => {
            serde_json::from_value(input).map_err(|e| WorkflowError::InvalidInput(e.to_string()))
        }
        other => Err(WorkflowError::InvalidInput(format!(
            "expected an object, got {}",
            json_type(&other)
        ))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Input of `code-development`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DevelopmentRequest {
    pub task: String,
    pub language: String,
    pub requirements: String,
}

impl Default for DevelopmentRequest {
    fn default() -> Self {
        Self {
            task: "Code development task".to_string(),
            language: "python".to_string(),
            requirements: "Standard best practices".to_string(),
        }
    }
}

/// Input of `project-orchestration`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProjectRequest {
    pub description: String,
    #[serde(rename = "type")]
    pub project_type: String,
    pub priority: String,
}

impl Default for ProjectRequest {
    fn default() -> Self {
        Self {
            description: "Complex project".to_string(),
            project_type: "general".to_string(),
            priority: "medium".to_string(),
        }
    }
}

/// Input of `code-operation`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CodeRequest {
    pub operation: String,
    pub target: String,
    pub prompt: String,
}

impl Default for CodeRequest {
    fn default() -> Self {
        Self {
            operation: "analyze".to_string(),
            target: ".".to_string(),
            prompt: "Analyze and improve this code".to_string(),
        }
    }
}
