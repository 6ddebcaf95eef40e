use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed ledger file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("invalid {column} value in stored trade: {value}")]
    Decode { column: &'static str, value: String },
    #[error("stored trade {id} ({pair}) violates price ordering")]
    InvalidLevels { id: Uuid, pair: String },
    #[error("stored trade {id} ({pair}) has status {status} but pnl {pnl:?}")]
    InconsistentOutcome {
        id: Uuid,
        pair: String,
        status: String,
        pnl: Option<f64>,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
