//! Errors raised while turning VM source into assembly.

use crate::ast::Segment;

/// A translation failure. Every variant is fatal to the whole unit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranslateError {
    /// The line matches neither an operator nor a push/pop form.
    #[error("line {line}: unrecognized instruction `{text}`")]
    UnrecognizedInstruction { line: usize, text: String },

    /// A push/pop names a segment outside the known set.
    #[error("line {line}: invalid memory segment `{segment}`")]
    InvalidSegment { line: usize, segment: String },

    #[error("line {line}: cannot pop into the constant segment")]
    PopConstant { line: usize },

    #[error("line {line}: index {index} is out of range for the {segment} segment")]
    IndexOutOfRange {
        line: usize,
        segment: Segment,
        index: String,
    },

    /// An A-instruction only carries 15 bits. The value is kept as written
    /// since it may not fit any machine integer.
    #[error("line {line}: constant {value} does not fit in 15 bits")]
    ConstantOutOfRange { line: usize, value: String },

    #[error("no instructions to translate")]
    EmptyInput,
}

impl TranslateError {
    /// Source line the failure was detected on, if it belongs to one.
    pub fn line(&self) -> Option<usize> {
        match self {
            TranslateError::UnrecognizedInstruction { line, .. }
            | TranslateError::InvalidSegment { line, .. }
            | TranslateError::PopConstant { line }
            | TranslateError::IndexOutOfRange { line, .. }
            | TranslateError::ConstantOutOfRange { line, .. } => Some(*line),
            TranslateError::EmptyInput => None,
        }
    }
}
