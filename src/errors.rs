use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("BAD_STATUS: API responded with status {0}")]
    BadStatus(u16),
    #[error("TRANSPORT: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value.to_string())
    }
}

#[derive(Debug, Error)]
#[error("STORE_FAILURE: {0}")]
pub struct StoreError(pub String);

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self(value.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("NO_DATA_LOADED: load data from the store before charting or exporting")]
    NoDataLoaded,
    #[error("INTERNAL: {0}")]
    Internal(String),
}

impl From<csv::Error> for AppError {
    fn from(value: csv::Error) -> Self {
        Self::Internal(value.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
