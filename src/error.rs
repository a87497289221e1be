//! Result and Error types for the decay data pipeline

/// Type alias for `Result<T, nndc_decay::Error>`
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `nndc-decay` crate
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Underlying file I/O error
    #[error("failure in file I/O")]
    Io(#[from] std::io::Error),

    /// Failure during GET request to the NNDC decay search
    #[error("request to NNDC failed")]
    Unavailable(#[from] minreq::Error),

    /// Failure to serialise/deserialise the persisted store
    #[error("failed serde JSON operation")]
    Json(#[from] serde_json::Error),

    /// Identifier could not be canonicalised to a nuclide
    #[error("\"{0}\" is not a valid nuclide")]
    InvalidNuclide(String),

    /// More than one decay dataset on a single page
    #[error("multiple decay datasets found for \"{nuclide}\", only one is supported")]
    MultipleDatasets { nuclide: String },

    /// Store conflict, recoverable with `force_update`
    #[error("\"{nuclide}\" is already in the database (use force_update to overwrite)")]
    AlreadyExists { nuclide: String },

    /// Cache miss with no fetch policy to fall back on
    #[error("\"{nuclide}\" not found in the database")]
    NotFound { nuclide: String },

    /// Generic error type for parser failures
    #[error("parser failed: {0}")]
    Parse(String),
}
