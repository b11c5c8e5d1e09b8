use thiserror::Error;

/// Internal issues with the codebase indicating unexpected behavior & possible bugs
#[derive(Error, Debug)]
pub enum InternalError {
    /// Date arithmetic left chrono's representable range.
    #[error("Date out of range while computing {0}")]
    DateOutOfRange(&'static str),
}
