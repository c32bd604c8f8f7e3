use serde_json::{json, Value};

use super::helpers::{extract_json_from_response, safe_json_parse};
use super::prompts::{self, NOTHING_TO_VISUALIZE};
use super::{Assistant, VISUALIZATION};
use crate::error::{Error, Result};

/// Turn the model's answer into a chart object, the fixed empty chart, or an error.
pub fn interpret_visualization(response: &str) -> Result<Value> {
    match extract_json_from_response(response) {
        Some(json_str) => match safe_json_parse(json_str) {
            Some(chart) => Ok(Value::Object(chart)),
            None => {
                tracing::warn!("Failed to parse extracted JSON: {:?}", json_str);
                Err(Error::InvalidModelOutput("Could not parse extracted JSON from LLM response."))
            }
        },
        None if response.trim() == NOTHING_TO_VISUALIZE => Ok(json!({
            "description": response,
            "type": "none",
            "data": [],
        })),
        None => Err(Error::InvalidModelOutput("Could not find JSON in LLM response.")),
    }
}

impl Assistant {
    /// `prompt` is accepted for API compatibility; the chart brief is fixed.
    pub async fn visualize(&self, session_id: &str, _prompt: Option<&str>) -> Result<Value> {
        let response = self
            .generate(&VISUALIZATION, session_id, prompts::visualization)
            .await?;
        tracing::debug!("LLM raw visualization response: {:?}", response);
        interpret_visualization(&response)
    }
}
