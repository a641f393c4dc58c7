use thiserror::Error;

/// Errors surfaced by the stats client and aggregator.
///
/// "No statistics found" is deliberately not here: it is represented as an
/// empty [`crate::stats::StatRecord`] and rendered as an absent row.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StatsError {
    /// The configured stats URL is not an http(s) URL. Raised when the
    /// client is constructed, before any fetch is attempted.
    #[error("invalid stats URL {0:?}: only http and https schemes are supported")]
    InvalidUrl(String),

    /// The HTTP client could not be initialized.
    #[error("failed to initialize HTTP client: {0}")]
    ClientInit(String),

    /// The fetch itself failed (connection refused, non-2xx status, ...).
    /// Distinct from "user not found", which yields an empty record.
    #[error("failed to fetch stats for {user}: {message}")]
    Transport { user: String, message: String },

    /// A populated record is missing a configured column, or a numeric cell
    /// failed to parse. Indicates the profile page format changed upstream;
    /// never silently defaulted.
    #[error("stats for {user}: column {column:?} is missing or not a number")]
    DataIntegrity { user: String, column: String },
}
