use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("No catalog registered for service '{0}'")]
    UnknownService(String),

    /// Lets hosts `?` a failed `CoreConfigBuilder::build` into this type
    #[error("Configuration error: {0}")]
    Config(#[from] core_runtime::Error),

    #[error("Library error: {0}")]
    Library(#[from] core_library::LibraryError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
