use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Unknown database connection: {0}")]
    UnknownConnection(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Command execution failed: {program}: {reason}")]
    Command { program: String, reason: String },
}

impl AppError {
    /// Errors caused by what the user typed or configured, as opposed to
    /// failures of the environment.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            AppError::Config(_)
                | AppError::UrlParse(_)
                | AppError::UnknownConnection(_)
                | AppError::InvalidInput(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
