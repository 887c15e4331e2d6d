//! Error types for arco-persona
//!
//! The classification and assembly core is total and never returns these.
//! Errors only exist at the edges:
//! - Configuration files and environment
//! - Quiz and variant data files
//! - Cookie jar storage (swallowed by `PersonaStore`)
//! - CLI input

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for persona operations
pub type Result<T> = std::result::Result<T, Error>;

/// Numeric error codes for machine parsing and documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    // Configuration errors (1xx)
    ConfigNotFound = 100,
    ConfigParseError = 101,
    ConfigValidation = 102,

    // IO errors (2xx)
    IoRead = 200,
    IoWrite = 201,

    // Storage errors (3xx)
    StorageUnavailable = 300,
    StorageFailed = 301,
    StorageCorrupted = 302,

    // Content data errors (4xx)
    QuizInvalid = 400,
    VariantsInvalid = 401,
    UnknownPersona = 402,
    UnknownPageType = 403,
    ContentMalformed = 404,
}

impl ErrorCode {
    /// Get the string code (e.g., "E100")
    pub fn as_str(&self) -> String {
        format!("E{}", *self as u16)
    }

    /// Get the exit code for CLI (maps to 1-125 range)
    pub fn exit_code(&self) -> i32 {
        match *self as u16 {
            100..=199 => 10, // Config errors
            200..=299 => 20, // IO errors
            300..=399 => 30, // Storage errors
            400..=499 => 40, // Content data errors
            _ => 1,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type
#[derive(Error, Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration parse error
    #[error("Failed to parse configuration: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<toml::de::Error>,
    },

    /// Configuration validation error
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String, field: Option<String> },

    /// Generic configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    // ─────────────────────────────────────────────────────────────
    // IO Errors
    // ─────────────────────────────────────────────────────────────

    /// File read error
    #[error("Failed to read file: {path}")]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File write error
    #[error("Failed to write file: {path}")]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // Storage Errors
    // ─────────────────────────────────────────────────────────────

    /// Cookie storage cannot be reached at all
    #[error("Persona storage unavailable: {message}")]
    StorageUnavailable { message: String },

    /// A backend operation failed
    #[error("Storage backend '{backend}' failed: {message}")]
    Storage { backend: &'static str, message: String },

    /// Stored cookie jar could not be decoded
    #[error("Cookie jar {path} is corrupted: {message}")]
    StorageCorrupted { path: PathBuf, message: String },

    // ─────────────────────────────────────────────────────────────
    // Content Data Errors
    // ─────────────────────────────────────────────────────────────

    /// Quiz / scoring matrix data is unusable
    #[error("Invalid quiz data: {message}")]
    QuizInvalid { message: String },

    /// Variant tables are unusable
    #[error("Invalid variant table '{table}': {message}")]
    VariantsInvalid { table: String, message: String },

    /// A persona slug that is not part of the taxonomy
    #[error("Unknown persona '{slug}'")]
    UnknownPersona { slug: String },

    /// A page type that is not part of the page enumeration
    #[error("Unknown page type '{name}'")]
    UnknownPageType { name: String },

    /// Base content is not a JSON object
    #[error("Malformed page content: {message}")]
    ContentMalformed { message: String },
}

impl Error {
    // ─────────────────────────────────────────────────────────────
    // Error Classification
    // ─────────────────────────────────────────────────────────────

    /// Get the numeric error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::ConfigNotFound { .. } => ErrorCode::ConfigNotFound,
            Error::ConfigParse { .. } => ErrorCode::ConfigParseError,
            Error::ConfigValidation { .. } => ErrorCode::ConfigValidation,
            Error::Config(_) => ErrorCode::ConfigValidation,

            Error::IoRead { .. } => ErrorCode::IoRead,
            Error::IoWrite { .. } => ErrorCode::IoWrite,
            Error::Toml(_) => ErrorCode::ConfigParseError,
            Error::Json(_) => ErrorCode::ContentMalformed,

            Error::StorageUnavailable { .. } => ErrorCode::StorageUnavailable,
            Error::Storage { .. } => ErrorCode::StorageFailed,
            Error::StorageCorrupted { .. } => ErrorCode::StorageCorrupted,

            Error::QuizInvalid { .. } => ErrorCode::QuizInvalid,
            Error::VariantsInvalid { .. } => ErrorCode::VariantsInvalid,
            Error::UnknownPersona { .. } => ErrorCode::UnknownPersona,
            Error::UnknownPageType { .. } => ErrorCode::UnknownPageType,
            Error::ContentMalformed { .. } => ErrorCode::ContentMalformed,
        }
    }

    /// Whether this is a storage-layer failure.
    ///
    /// `PersonaStore` degrades to "unknown visitor" on these instead of
    /// propagating them.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            Error::StorageUnavailable { .. }
                | Error::Storage { .. }
                | Error::StorageCorrupted { .. }
        )
    }

    /// Get the exit code for CLI
    pub fn exit_code(&self) -> i32 {
        self.code().exit_code()
    }

    // ─────────────────────────────────────────────────────────────
    // User-Friendly Messages
    // ─────────────────────────────────────────────────────────────

    /// Get a user-friendly suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Error::ConfigNotFound { .. } => Some(
                "Run 'arco-persona config init' to create a default configuration file."
            ),
            Error::ConfigParse { .. } => Some(
                "Check your configuration file syntax. \
                 Run 'arco-persona config validate' to see details."
            ),
            Error::ConfigValidation { .. } | Error::Config(_) => Some(
                "Review the configuration file and fix the invalid values."
            ),
            Error::StorageUnavailable { .. } | Error::Storage { .. } => Some(
                "Check that the cookie jar path in [storage] is writable."
            ),
            Error::StorageCorrupted { .. } => Some(
                "Delete the cookie jar file or run 'arco-persona persona clear'."
            ),
            Error::QuizInvalid { .. } => Some(
                "Every quiz question needs at least one option with six scores."
            ),
            Error::VariantsInvalid { .. } => Some(
                "Every variant table needs a 'default' entry and only known persona keys."
            ),
            Error::UnknownPersona { .. } => Some(
                "Valid personas: morning-minimalist, upgrader, craft-barista, \
                 traveller, non-barista, office-manager."
            ),
            Error::UnknownPageType { .. } => Some(
                "Valid page types: homepage, product-detail, guide, article, \
                 experience, tool, bundle."
            ),
            Error::ContentMalformed { .. } | Error::Json(_) => Some(
                "Base content must be a JSON object."
            ),
            _ => None,
        }
    }

    /// Format the error for terminal display with colors
    pub fn format_for_terminal(&self) -> String {
        let code = self.code();
        let suggestion = self.suggestion();

        let mut output = format!(
            "\x1b[31mError [{}]\x1b[0m: {}\n",
            code.as_str(),
            self
        );

        if let Some(hint) = suggestion {
            output.push_str(&format!("\n\x1b[33mHint\x1b[0m: {}\n", hint));
        }

        output
    }

    /// Format the error for logging (no colors)
    pub fn format_for_log(&self) -> String {
        format!("[{}] {}", self.code().as_str(), self)
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Error::ConfigNotFound { path: path.into() }
    }

    /// Create a config validation error with field name
    pub fn config_field_invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ConfigValidation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a storage backend error
    pub fn storage(backend: &'static str, message: impl Into<String>) -> Self {
        Error::Storage {
            backend,
            message: message.into(),
        }
    }

    /// Create a quiz data error
    pub fn quiz_invalid(message: impl Into<String>) -> Self {
        Error::QuizInvalid {
            message: message.into(),
        }
    }

    /// Create a variant table error
    pub fn variants_invalid(table: impl Into<String>, message: impl Into<String>) -> Self {
        Error::VariantsInvalid {
            table: table.into(),
            message: message.into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
