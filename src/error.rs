use miette::Diagnostic;
use thiserror::Error;

/// Main error type for texkit operations
#[derive(Error, Diagnostic, Debug)]
pub enum TexError {
    #[error("IO error: {0}")]
    #[diagnostic(code(texkit::io))]
    IoError(#[from] std::io::Error),

    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(texkit::io))]
    Io {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Parse error: {message}")]
    #[diagnostic(code(texkit::parse))]
    Parse {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// A packing mode or sampler setting is unusable. Fatal for that mode only.
    #[error("Config error: {message}")]
    #[diagnostic(code(texkit::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// A texture set (or sampled image) cannot satisfy a mode. Fatal for that set only.
    #[error("Validation error in '{subject}': {message}")]
    #[diagnostic(code(texkit::validate))]
    Validation {
        subject: String,
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Unsupported format in '{subject}': {message}")]
    #[diagnostic(code(texkit::format))]
    UnsupportedFormat {
        subject: String,
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Build error: {message}")]
    #[diagnostic(code(texkit::build))]
    Build {
        message: String,
        #[help]
        help: Option<String>,
    },
}

impl TexError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        TexError::Config {
            message: message.into(),
            help: None,
        }
    }

    pub(crate) fn validation(subject: impl Into<String>, message: impl Into<String>) -> Self {
        TexError::Validation {
            subject: subject.into(),
            message: message.into(),
            help: None,
        }
    }

    /// Machine-readable code matching the `#[diagnostic(code(..))]` attribute.
    pub fn diagnostic_code(&self) -> &'static str {
        match self {
            TexError::IoError(_) | TexError::Io { .. } => "texkit::io",
            TexError::Parse { .. } => "texkit::parse",
            TexError::Config { .. } => "texkit::config",
            TexError::Validation { .. } => "texkit::validate",
            TexError::UnsupportedFormat { .. } => "texkit::format",
            TexError::Build { .. } => "texkit::build",
        }
    }

    /// Help text, if the error carries any.
    pub fn help_text(&self) -> Option<&str> {
        match self {
            TexError::Parse { help, .. }
            | TexError::Config { help, .. }
            | TexError::Validation { help, .. }
            | TexError::UnsupportedFormat { help, .. }
            | TexError::Build { help, .. } => help.as_deref(),
            TexError::IoError(_) | TexError::Io { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TexError>;
