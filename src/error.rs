use thiserror::Error;

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("detector error: {0}")]
    Detector(#[source] BoxedError),

    #[error("identity tracker error: {0}")]
    Identity(#[source] BoxedError),

    #[error("class {0:?} missing from detection class map")]
    UnknownClass(String),

    #[error("cache io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn detector<E: Into<BoxedError>>(err: E) -> Self {
        Self::Detector(err.into())
    }

    pub fn identity<E: Into<BoxedError>>(err: E) -> Self {
        Self::Identity(err.into())
    }
}
