//! Errors raised while loading or validating Roster settings.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file or `ROSTER_*` variable could not be read into
    /// `RosterConfig`.
    #[error("failed to load roster configuration: {0}")]
    Figment(#[from] figment::Error),

    /// A setting parsed but is outside its allowed range.
    #[error("invalid setting '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}
