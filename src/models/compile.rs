//! Compile backend models and editor diagnostics

use serde::{Deserialize, Serialize};

/// Submission body for `POST /compilations`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileRequest {
    pub script: String,
    pub board: String,
}

/// Job reference returned by the compile backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRef {
    /// Followable status link, absolute or relative to the backend base URL
    pub link: String,
}

/// One poll of the job status resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CompileStatus {
    Success {
        hex: String,
    },
    CompileError {
        line_number: u32,
        error: String,
    },
    #[serde(other)]
    InProgress,
}

/// Positional compile diagnostic (1-based line)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileDiagnostic {
    pub line_number: u32,
    pub error: String,
}

/// Terminal outcome of a compile job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileResult {
    /// Flashable artifact (Intel HEX text)
    Artifact(String),
    Failed(CompileDiagnostic),
}

impl CompileStatus {
    /// `None` while the job is still running
    pub fn into_result(self) -> Option<CompileResult> {
        match self {
            CompileStatus::Success { hex } => Some(CompileResult::Artifact(hex)),
            CompileStatus::CompileError { line_number, error } => {
                Some(CompileResult::Failed(CompileDiagnostic { line_number, error }))
            }
            CompileStatus::InProgress => None,
        }
    }
}

/// Gutter annotation for the editor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub row: u32,
    pub column: u32,
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

/// Highlighted line range for the editor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub start_row: u32,
    pub start_col: u32,
    pub end_row: u32,
    pub end_col: u32,
    pub class_name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl CompileDiagnostic {
    /// Editor rows are 0-based
    pub fn row(&self) -> u32 {
        self.line_number.saturating_sub(1)
    }

    pub fn annotation(&self) -> Annotation {
        Annotation {
            row: self.row(),
            column: 0,
            kind: "error".to_string(),
            text: self.error.clone(),
        }
    }

    pub fn marker(&self) -> Marker {
        Marker {
            start_row: self.row(),
            start_col: 0,
            end_row: self.row() + 1,
            end_col: 0,
            class_name: "error-marker".to_string(),
            kind: "background".to_string(),
        }
    }
}
