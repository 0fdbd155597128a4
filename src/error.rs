use thiserror::Error;

/// Errors surfaced by the CLI entry points
#[derive(Debug, Error)]
pub enum Error {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("request failed: {0}")]
    Http(#[from] Box<ureq::Error>),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid settings file: {0}")]
    Settings(#[from] toml::de::Error),

    #[error("could not start server on {addr}: {reason}")]
    Server { addr: String, reason: String },
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        Error::Http(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
