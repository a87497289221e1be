//! Persistent keyed store for per-isotope decay radiation data

// standard library
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

// internal modules
use crate::assemble::assemble;
use crate::error::{Error, Result};
use crate::fetch::{decay_radiation_url, Fetch};
use crate::nuclide::Nuclide;
use crate::record::{IsotopeDataset, Metadata};
use crate::segment::segment;

// external crates
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// File name of the persisted store inside the data directory
const STORE_FILE: &str = "decay_radiation.json";

/// What to do when a requested isotope is not in the store
///
/// Replaces the interactive "download now? \[Y/n\]" prompt with an explicit
/// caller decision, so the library never blocks on stdin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPolicy {
    /// Fail the lookup with [Error::NotFound]
    Fail,
    /// Fetch, store, and return the fresh data
    Fetch,
}

/// The two aligned tables, always written out together
#[derive(Serialize, Deserialize, Debug, Default)]
struct StoreData {
    decay_radiation: BTreeMap<String, IsotopeDataset>,
    metadata: BTreeMap<String, Metadata>,
}

/// On-disk cache of per-isotope decay radiation datasets
///
/// The store holds two aligned tables keyed by the canonical nuclide string:
/// the channel records themselves and the per-isotope metadata. Any key
/// present in one table is present in the other. Writes replace both entries
/// for a key and persist them together through a temp-file swap, so a
/// completed store operation never leaves the tables disagreeing.
///
/// The data directory is explicit configuration, passed once at
/// construction:
///
/// ```rust, no_run
/// # use nndc_decay::{DecayDatabase, HttpFetcher};
/// let mut db = DecayDatabase::open("/path/to/data").unwrap();
/// db.store("co60", false, &HttpFetcher).unwrap();
/// let co60 = db.get("co60").unwrap();
/// ```
#[derive(Debug)]
pub struct DecayDatabase {
    path: PathBuf,
    data: StoreData,
}

impl DecayDatabase {
    /// Open or initialise the database under a data directory
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let path = data_dir.as_ref().join(STORE_FILE);
        let data = if path.is_file() {
            serde_json::from_reader(BufReader::new(File::open(&path)?))?
        } else {
            StoreData::default()
        };
        Ok(Self { path, data })
    }

    /// Fetch and store decay radiation data for one isotope
    ///
    /// Fails with [Error::AlreadyExists] when the isotope is already stored
    /// and `force_update` is false, leaving the stored data untouched. With
    /// `force_update` the old rows are replaced in both tables before the
    /// new ones are persisted.
    ///
    /// An isotope whose page has no decay data at all is stored as an empty
    /// dataset, recording that it was checked and found stable.
    pub fn store(&mut self, isotope: &str, force_update: bool, fetcher: &dyn Fetch) -> Result<()> {
        let nuclide: Nuclide = isotope.parse()?;
        let key = nuclide.key();

        if self.data.decay_radiation.contains_key(&key) && !force_update {
            return Err(Error::AlreadyExists { nuclide: key });
        }

        let markup = fetcher.fetch(&decay_radiation_url(&nuclide))?;
        let raw = segment(&markup);
        let (dataset, metadata) = assemble(&raw, &key)?;

        if dataset.is_stable() {
            info!("{key} is stable, storing an empty dataset");
        }

        // replace the key in both tables, then persist them together
        self.data.decay_radiation.remove(&key);
        self.data.metadata.remove(&key);
        self.data.decay_radiation.insert(key.clone(), dataset);
        self.data.metadata.insert(key, metadata);
        self.save()
    }

    /// Update every isotope in a list, skipping the ones that fail
    ///
    /// One unavailable isotope must not abort a larger update run, so
    /// per-isotope failures are logged and the batch continues.
    pub fn store_many(&mut self, isotopes: &[&str], force_update: bool, fetcher: &dyn Fetch) {
        for isotope in isotopes {
            info!("Working on isotope {isotope}");
            if let Err(e) = self.store(isotope, force_update, fetcher) {
                warn!("Skipping {isotope}: {e}");
            }
        }
    }

    /// Stored channel records for one isotope
    ///
    /// Fails with [Error::NotFound] when the isotope has never been stored.
    /// A stored-but-empty dataset is returned as such: it means the isotope
    /// was fetched and verified stable, which is not a cache miss.
    pub fn get(&self, isotope: &str) -> Result<&IsotopeDataset> {
        let key = isotope.parse::<Nuclide>()?.key();
        self.data
            .decay_radiation
            .get(&key)
            .ok_or(Error::NotFound { nuclide: key })
    }

    /// Stored channel records, with an explicit cache-miss policy
    pub fn get_or_fetch(
        &mut self,
        isotope: &str,
        policy: FetchPolicy,
        fetcher: &dyn Fetch,
    ) -> Result<&IsotopeDataset> {
        let key = isotope.parse::<Nuclide>()?.key();
        if !self.data.decay_radiation.contains_key(&key) {
            match policy {
                FetchPolicy::Fail => return Err(Error::NotFound { nuclide: key }),
                FetchPolicy::Fetch => self.store(isotope, false, fetcher)?,
            }
        }
        Ok(&self.data.decay_radiation[&key])
    }

    /// Stored metadata record for one isotope
    pub fn metadata(&self, isotope: &str) -> Result<&Metadata> {
        let key = isotope.parse::<Nuclide>()?.key();
        self.data
            .metadata
            .get(&key)
            .ok_or(Error::NotFound { nuclide: key })
    }

    /// Both tables in full, as stored, with no filtering
    pub fn get_all(
        &self,
    ) -> (
        &BTreeMap<String, IsotopeDataset>,
        &BTreeMap<String, Metadata>,
    ) {
        (&self.data.decay_radiation, &self.data.metadata)
    }

    /// Write the store to a temporary file and swap it into place
    fn save(&self) -> Result<()> {
        let tmp = self.path.with_extension("json.tmp");
        let mut writer = BufWriter::new(File::create(&tmp)?);
        serde_json::to_writer_pretty(&mut writer, &self.data)?;
        writer
            .into_inner()
            .map_err(std::io::IntoInnerError::into_error)?
            .sync_all()?;
        std::fs::rename(&tmp, &self.path)?;
        info!(
            "Wrote {} isotopes to {}",
            self.data.decay_radiation.len(),
            self.path.display()
        );
        Ok(())
    }
}
