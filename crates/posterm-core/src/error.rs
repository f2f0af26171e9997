use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read catalog file {path}: {source}")]
    CatalogFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog file: {0}")]
    CatalogFileParse(#[from] serde_yaml::Error),

    #[error("catalog validation failed: {0}")]
    Validation(String),
}

/// Errors raised by [`crate::OrderSession`] commands.
///
/// None of these are fatal: the terminal treats each one as "the tap did
/// nothing" and keeps running.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("cannot check out an empty cart")]
    EmptyCart,

    #[error("a payment is already in progress")]
    PaymentInProgress,

    #[error("cannot {action} while payment is {from}")]
    InvalidTransition {
        from: &'static str,
        action: &'static str,
    },
}
