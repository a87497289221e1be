//! Fetch, parse, and cache decay radiation data from the NNDC NuDat archive
//!
//! The NuDat decay search serves loosely structured pages of tables and free
//! text. This crate turns one of those pages into typed numeric records with
//! explicit nominal-value/uncertainty pairs, keeps them in a persistent
//! per-isotope store, and derives aggregate energy quantities for consumers
//! such as energy-deposition calculators.
//!
//! ## Pipeline
//!
//! A request for an isotope runs through four stages:
//!
//! 1. **Segmentation** - the fetched page is split into heading-delimited
//!    blocks, one per section of the decay dataset ([segment]).
//! 2. **Parsing** - each channel table (electrons, beta+, beta-, gamma and
//!    X-ray) is sanitised into [ChannelRecord]s, with the shared
//!    value/uncertainty notation handled by [decompose].
//! 3. **Assembly** - the blocks are dispatched by heading, channel tables
//!    concatenated, metadata extracted, and energies converted to erg
//!    ([assemble]).
//! 4. **Storage** - the [DecayDatabase] keeps the records and metadata in
//!    two aligned tables keyed by canonical nuclide string, written together
//!    atomically.
//!
//! ## Quickstart
//!
//! ```rust, no_run
//! use nndc_decay::{DecayDatabase, DecayRadiation, FetchPolicy, HttpFetcher, RadType};
//!
//! // the data directory is explicit configuration
//! let mut db = DecayDatabase::open("/path/to/data").unwrap();
//!
//! // fetch and cache a nuclide (conflict unless force_update is set)
//! db.store("co60", false, &HttpFetcher).unwrap();
//!
//! // aggregate views with derived per-decay totals
//! let decay_radiation =
//!     DecayRadiation::load(&mut db, &["co60"], FetchPolicy::Fail, &HttpFetcher).unwrap();
//! let co60 = &decay_radiation["Co-60"];
//!
//! println!(
//!     "gamma: {} erg/decay, leptons: {} erg/decay",
//!     co60.total_energy_per_decay(RadType::Gamma),
//!     co60.total_lepton_energy_per_decay()
//! );
//! ```
//!
//! ## Stable isotopes
//!
//! An isotope whose page has no decay data is stored as an empty dataset.
//! That is a verified "no decay radiation" answer and is deliberately
//! distinct from an isotope that was never fetched, which is a cache miss
//! handled by [FetchPolicy].

// Modules
mod aggregate;
mod assemble;
mod error;
mod fetch;
mod html;
mod nuclide;
mod parsers;
mod record;
mod segment;
mod store;

// Re-exports of anything important with in-lined documentation for simplicity
#[doc(inline)]
pub use error::{Error, Result};

#[doc(inline)]
pub use nuclide::{IsomerState, Nuclide};

#[doc(inline)]
pub use fetch::{decay_radiation_url, Fetch, HttpFetcher};

#[doc(inline)]
pub use segment::{segment, RawDataset};

#[doc(inline)]
pub use parsers::{decompose, is_channel_heading, parse_channel_block, Separator};

#[doc(inline)]
pub use assemble::assemble;

#[doc(inline)]
pub use record::{ChannelRecord, IsotopeDataset, Metadata, MetadataValue, RadType, KEV_TO_ERG};

#[doc(inline)]
pub use store::{DecayDatabase, FetchPolicy};

#[doc(inline)]
pub use aggregate::{AggregatedNuclide, DecayRadiation};

// standard library
use std::collections::BTreeMap;
use std::path::Path;

/// Fetch and store decay radiation for one isotope
///
/// Convenience wrapper opening the database under `data_dir` for a single
/// store operation. Keep a [DecayDatabase] around instead when updating many
/// isotopes.
pub fn store_decay_radiation<P: AsRef<Path>>(
    data_dir: P,
    isotope: &str,
    force_update: bool,
) -> Result<()> {
    let mut db = DecayDatabase::open(data_dir)?;
    db.store(isotope, force_update, &HttpFetcher)
}

/// Stored channel records for one isotope
///
/// Fails with [Error::NotFound] when the isotope was never stored; an empty
/// dataset means the isotope is verified stable.
pub fn get_decay_radiation<P: AsRef<Path>>(data_dir: P, isotope: &str) -> Result<IsotopeDataset> {
    DecayDatabase::open(data_dir)?.get(isotope).cloned()
}

/// The full channel and metadata tables, as stored
pub fn get_decay_radiation_database<P: AsRef<Path>>(
    data_dir: P,
) -> Result<(BTreeMap<String, IsotopeDataset>, BTreeMap<String, Metadata>)> {
    let db = DecayDatabase::open(data_dir)?;
    let (records, metadata) = db.get_all();
    Ok((records.clone(), metadata.clone()))
}
