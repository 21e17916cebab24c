use thiserror::Error;

/// Errors surfaced by the `sales` binary.
///
/// Only `MissingColumns` can come out of the analysis pipeline itself; the
/// other variants belong to the surfaces around it (arguments, file access,
/// terminal).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("The CSV file does not contain the required columns (missing: {}).", .missing.join(", "))]
    MissingColumns { missing: Vec<&'static str> },

    #[error("{0}")]
    Usage(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Terminal(String),
}

impl AppError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn terminal(message: impl Into<String>) -> Self {
        Self::Terminal(message.into())
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Usage(_) | AppError::Io { .. } => 2,
            AppError::MissingColumns { .. } => 3,
            AppError::Terminal(_) => 4,
        }
    }
}
