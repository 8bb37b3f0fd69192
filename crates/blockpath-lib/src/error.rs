use thiserror::Error;

use crate::geometry::Domain;

/// Convenient result alias for the blockpath library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when a request combines positions from different domains.
    #[error("start and target positions belong to different domains ({start} vs {target})")]
    DomainMismatch { start: Domain, target: Domain },

    /// Raised when a request carries a NaN or infinite coordinate.
    #[error("{which} position has a non-finite {axis} coordinate ({value})")]
    NonFiniteCoordinate {
        which: &'static str,
        axis: char,
        value: f64,
    },

    /// Raised when a search worker panicked; the search surfaces as a failed
    /// result instead of propagating the panic to the caller.
    #[error("search worker panicked: {detail}")]
    WorkerPanic { detail: String },
}
