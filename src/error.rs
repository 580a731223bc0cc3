use thiserror::Error;

use crate::taxonomy::FilterKey;

#[derive(Error, Debug)]
pub enum BaselineError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP Client Error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error(
        "EIA_API_KEY is not set.\n\n\
         Create a .env file in the project root containing:\n\n    \
         EIA_API_KEY=YOUR_REAL_KEY_HERE\n\n\
         or set it in your shell environment:\n\n    \
         export EIA_API_KEY=YOUR_REAL_KEY_HERE\n\n\
         You can request a free key from https://www.eia.gov/opendata/register.php"
    )]
    MissingCredential,

    #[error(
        "Could not find microsegments file at {path}.\n\
         Run from the project root or point SCOUT_MSEG_PATH at the file."
    )]
    MissingInput { path: String },

    #[error("EIA data exists but the aggregate is empty for {key} (series {series_id})")]
    TaxonomyGap { key: FilterKey, series_id: String },
}

impl BaselineError {
    /// Process exit status for this failure: 2 for startup problems, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::MissingCredential | Self::MissingInput { .. } => 2,
            Self::Io(_) | Self::Json(_) | Self::Http(_) | Self::TaxonomyGap { .. } => 1,
        }
    }
}

pub type BlResult<T> = Result<T, BaselineError>;
