use sea_orm::DbErr;
use thiserror::Error;

/// Errors raised while preparing a test context.
#[derive(Error, Debug)]
pub enum TestError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error("Failed to prepare session store: {0}")]
    Session(String),
}
