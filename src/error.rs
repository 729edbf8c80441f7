use thiserror::Error;

/// Every way a .bvh document can fail to parse. Line numbers are 1-based and refer to the source text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BvhError {
    #[error("line {line}: expected `{expected}`, found `{found}`")]
    MissingKeyword {
        line: usize,
        expected: &'static str,
        found: String,
    },

    #[error("line {line}: malformed node declaration `{found}`")]
    MalformedDeclaration { line: usize, found: String },

    #[error("line {line}: expected `{{` after node declaration, found `{found}`")]
    MissingBrace { line: usize, found: String },

    #[error("line {line}: OFFSET expects 3 values, found {count}")]
    OffsetArity { line: usize, count: usize },

    #[error("line {line}: invalid OFFSET value `{token}`")]
    InvalidOffsetValue { line: usize, token: String },

    #[error("line {line}: expected CHANNELS definition, found `{found}`")]
    MissingChannels { line: usize, found: String },

    #[error("line {line}: CHANNELS declares {declared} channels but lists {found}")]
    ChannelCountMismatch {
        line: usize,
        declared: usize,
        found: usize,
    },

    #[error("line {line}: invalid channel count `{token}`")]
    InvalidChannelCount { line: usize, token: String },

    #[error("line {line}: invalid channel type `{token}`")]
    InvalidChannel { line: usize, token: String },

    #[error("line {line}: failed to read number of frames from `{found}`")]
    InvalidFrameCount { line: usize, found: String },

    #[error("line {line}: failed to read frame time from `{found}`")]
    InvalidFrameTime { line: usize, found: String },

    #[error("line {line}: invalid channel value `{token}`")]
    InvalidChannelValue { line: usize, token: String },

    #[error("line {line}: frame has {found} values, expected {expected}")]
    FrameValueCount {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String },
}

impl BvhError {
    /// Source line the error was raised on, if the input had not run out.
    pub fn line(&self) -> Option<usize> {
        match self {
            BvhError::MissingKeyword { line, .. }
            | BvhError::MalformedDeclaration { line, .. }
            | BvhError::MissingBrace { line, .. }
            | BvhError::OffsetArity { line, .. }
            | BvhError::InvalidOffsetValue { line, .. }
            | BvhError::MissingChannels { line, .. }
            | BvhError::ChannelCountMismatch { line, .. }
            | BvhError::InvalidChannelCount { line, .. }
            | BvhError::InvalidChannel { line, .. }
            | BvhError::InvalidFrameCount { line, .. }
            | BvhError::InvalidFrameTime { line, .. }
            | BvhError::InvalidChannelValue { line, .. }
            | BvhError::FrameValueCount { line, .. } => Some(*line),
            BvhError::UnexpectedEof { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, BvhError>;
