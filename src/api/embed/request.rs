// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! EmbedRequest type for POST /embed
//!
//! The body is checked against an explicit schema before any inference runs,
//! so a violation is reported with the exact field that failed.

use crate::api::ApiError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Request body for POST /embed
///
/// # Example
/// ```json
/// {
///   "texts": ["Hello world", "Another text"]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedRequest {
    /// Text strings to embed; may be empty, elements may be empty strings
    pub texts: Vec<String>,
}

/// JSON type name used in validation messages
fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl EmbedRequest {
    pub fn new<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            texts: texts.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses a raw request body
    ///
    /// # Errors
    /// - `InvalidRequest` when the body is not JSON
    /// - `ValidationError` when the JSON does not match the schema
    pub fn from_slice(body: &[u8]) -> Result<Self, ApiError> {
        let value: Value = serde_json::from_slice(body).map_err(|e| {
            ApiError::InvalidRequest(format!("request body is not valid JSON: {}", e))
        })?;
        Self::from_value(value)
    }

    /// Checks a parsed JSON value against the schema
    ///
    /// # Schema
    /// 1. **body**: must be an object
    /// 2. **texts**: required, must be an array
    /// 3. **texts[i]**: must be a string
    ///
    /// Unknown fields are ignored.
    pub fn from_value(value: Value) -> Result<Self, ApiError> {
        let mut fields: Map<String, Value> = match value {
            Value::Object(fields) => fields,
            other => {
                return Err(ApiError::validation(
                    "body",
                    format!("expected a JSON object, got {}", json_type(&other)),
                ))
            }
        };

        let items = match fields.remove("texts") {
            None => return Err(ApiError::validation("texts", "field required")),
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(ApiError::validation(
                    "texts",
                    format!("expected an array of strings, got {}", json_type(&other)),
                ))
            }
        };

        let mut texts = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            match item {
                Value::String(text) => texts.push(text),
                other => {
                    return Err(ApiError::validation(
                        format!("texts[{}]", index),
                        format!("expected a string, got {}", json_type(&other)),
                    ))
                }
            }
        }

        Ok(Self { texts })
    }

    /// Applies the optional batch size cap
    pub fn validate(&self, max_batch_size: Option<usize>) -> Result<(), ApiError> {
        if let Some(limit) = max_batch_size {
            if self.texts.len() > limit {
                return Err(ApiError::validation(
                    "texts",
                    format!(
                        "texts array cannot contain more than {} items (got {})",
                        limit,
                        self.texts.len()
                    ),
                ));
            }
        }
        Ok(())
    }
}
