//! Execution steps.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TraceError};
use crate::payload::Visualization;

/// Shown in place of missing step text.
pub const FALLBACK_TEXT: &str = "N/A";

/// A step as emitted by the trace generator. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(default)]
    pub line: Option<i64>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub visualization: Visualization,
}

/// One point-in-time snapshot of the traced program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub index: usize,
    /// 1-based source line, if the step maps to one.
    pub line: Option<u32>,
    pub code: Option<String>,
    pub description: Option<String>,
    pub visualization: Visualization,
}

impl Step {
    pub fn new(index: usize, line: Option<u32>, visualization: Visualization) -> Self {
        Self {
            index,
            line,
            code: None,
            description: None,
            visualization,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Build the step at `position` from a generator record.
    ///
    /// A missing index takes the position; a conflicting one is rejected.
    /// Line `0` and negative lines mean "no line".
    pub fn from_record(position: usize, record: StepRecord) -> Result<Self> {
        if let Some(found) = record.index {
            if found != position {
                return Err(TraceError::IndexMismatch {
                    expected: position,
                    found,
                });
            }
        }

        Ok(Self {
            index: position,
            line: record
                .line
                .filter(|line| *line > 0)
                .and_then(|line| u32::try_from(line).ok()),
            code: record.code,
            description: record.description,
            visualization: record.visualization,
        })
    }

    /// Build a whole trace from generator records.
    pub fn from_records(records: Vec<StepRecord>) -> Result<Vec<Self>> {
        records
            .into_iter()
            .enumerate()
            .map(|(position, record)| Self::from_record(position, record))
            .collect()
    }

    pub fn code_or_fallback(&self) -> &str {
        self.code.as_deref().unwrap_or(FALLBACK_TEXT)
    }

    pub fn description_or_fallback(&self) -> &str {
        self.description
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or(FALLBACK_TEXT)
    }
}
