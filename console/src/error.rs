use admin_client::config::ConfigError;
use admin_client::error::ApiError;
use admin_client::mutations::MutationError;
use admin_client::validation::FieldErrors;

#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("invalid input: {0}")]
    Validation(#[from] FieldErrors),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0} not found in the current page")]
    NotOnPage(String),
}

impl From<MutationError> for ConsoleError {
    fn from(err: MutationError) -> Self {
        match err {
            MutationError::Validation(fields) => ConsoleError::Validation(fields),
            MutationError::Api(api) => ConsoleError::Api(api),
        }
    }
}
