use std::collections::HashSet;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::model::Instruction;

/// Why an instruction payload was not admitted. Neither case is fatal; the message is dropped.
#[derive(Debug, Error)]
pub enum AdmitError {
    /// The payload does not decode into an [`Instruction`].
    #[error("Malformed instruction: {0}")]
    Malformed(#[from] serde_json::Error),

    /// An instruction with this token was already admitted by this registry.
    #[error("Instruction {etag} was already handled")]
    Duplicate {
        #[allow(missing_docs)]
        etag: String,
    },
}

/// Deduplicates instructions by their idempotency token and keeps the history of admitted ones.
///
/// A token that was admitted once stays handled for the lifetime of the registry, which gives
/// at-most-once execution per distinct instruction even when the surface re-sends its state
/// after a reload. Nothing is ever evicted: memory grows with the number of distinct
/// instructions a bridge sees, which is small for a single surface session.
///
/// The history is an audit trail. Execution always works on the instruction returned by
/// [`InstructionRegistry::admit`], never on the history.
#[derive(Debug, Default)]
pub struct InstructionRegistry {
    handled: HashSet<String>,
    history: Vec<Instruction>,
}

impl InstructionRegistry {
    #[allow(missing_docs)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `payload` and admit it unless its token was seen before.
    ///
    /// Rejections leave the registry untouched.
    pub fn admit(&mut self, payload: &Value) -> Result<Instruction, AdmitError> {
        let instruction = Instruction::deserialize(payload)?;

        if self.handled.contains(instruction.etag()) {
            return Err(AdmitError::Duplicate {
                etag: instruction.etag().to_string(),
            });
        }

        self.handled.insert(instruction.etag().to_string());
        self.history.push(instruction.clone());
        Ok(instruction)
    }

    /// Whether an instruction with `etag` was admitted.
    pub fn is_handled(&self, etag: &str) -> bool {
        self.handled.contains(etag)
    }

    /// Admitted instructions, oldest first.
    pub fn history(&self) -> &[Instruction] {
        &self.history
    }

    /// Number of admitted instructions.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}
