//! JSON Schema checks for request bodies.

use std::fmt;

use jsonschema::JSONSchema;
use serde_json::Value;

use crate::errors::ApiError;

/// A compiled request-body schema.
pub struct BodySchema {
    compiled: JSONSchema,
}

impl BodySchema {
    /// Compile `schema`; the error is the compiler's message.
    pub fn compile(schema: &Value) -> Result<Self, String> {
        let compiled = JSONSchema::compile(schema).map_err(|e| e.to_string())?;
        Ok(Self { compiled })
    }

    /// Check `instance`, reporting the first violation.
    pub fn validate(&self, instance: &Value) -> Result<(), ApiError> {
        match self.compiled.validate(instance) {
            Ok(()) => Ok(()),
            Err(mut errors) => {
                let message = errors
                    .next()
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "Invalid request body".to_string());
                Err(ApiError::Validation(message))
            }
        }
    }
}

impl fmt::Debug for BodySchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodySchema").finish_non_exhaustive()
    }
}
