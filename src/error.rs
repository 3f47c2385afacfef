use thiserror::Error;

#[derive(Error, Debug)]
pub enum CafeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing column in header: {0}")]
    MissingColumn(String),

    #[error("Chart error: {0}")]
    Chart(String),
}

pub type Result<T> = std::result::Result<T, CafeError>;
