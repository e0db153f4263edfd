//! Error type shared by the packing core and the oracles.

use thiserror::Error;

/// Failures that abort a packing run.
///
/// Degenerate geometry and an exhausted radius search are not errors; they
/// surface as empty candidate sets and `None` respectively.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The oracle has no territory with this id.
    #[error("territory `{territory}` not found")]
    TerritoryNotFound {
        /// Requested territory id
        territory: String,
    },

    /// The oracle could not record a batch of circles.
    #[error("failed to persist circles for `{territory}`: {reason}")]
    Persistence {
        /// Territory the batch belonged to
        territory: String,
        /// Oracle-specific description
        reason: String,
    },

    /// A territory polygon was rejected at registration.
    #[error("invalid territory: {reason}")]
    InvalidTerritory {
        /// What was wrong with the geometry
        reason: String,
    },

    /// Configuration text could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl Error {
    pub(crate) fn not_found(territory: &str) -> Self {
        Self::TerritoryNotFound {
            territory: territory.to_owned(),
        }
    }

    pub(crate) fn persistence(territory: &str, reason: impl Into<String>) -> Self {
        Self::Persistence {
            territory: territory.to_owned(),
            reason: reason.into(),
        }
    }
}

/// Result alias with [`Error`] as the default error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;
