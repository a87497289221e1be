//! Derived energy quantities across decay channels

// standard library
use std::collections::BTreeMap;
use std::ops::Index;

// internal modules
use crate::error::{Error, Result};
use crate::fetch::Fetch;
use crate::nuclide::Nuclide;
use crate::record::{ChannelRecord, RadType};
use crate::store::{DecayDatabase, FetchPolicy};

/// Channel records for one isotope plus derived per-decay totals
///
/// Recomputed on every load from whatever the store holds, never persisted.
#[derive(Debug, Clone, Default)]
pub struct AggregatedNuclide {
    /// All channel rows loaded from the store
    pub records: Vec<ChannelRecord>,
    totals: BTreeMap<RadType, f64>,
}

impl AggregatedNuclide {
    /// Aggregate a set of channel records into per-channel totals
    pub fn new(records: Vec<ChannelRecord>) -> Self {
        let mut totals = BTreeMap::new();
        for record in &records {
            *totals.entry(record.rad_type).or_insert(0.0) += record.energy_per_decay();
        }
        Self { records, totals }
    }

    /// Total energy released per decay through one channel (erg)
    ///
    /// A channel with no rows contributes zero.
    pub fn total_energy_per_decay(&self, rad_type: RadType) -> f64 {
        self.totals.get(&rad_type).copied().unwrap_or(0.0)
    }

    /// Total energy per decay carried by leptons (erg)
    ///
    /// The sum over the electron, beta+ and beta- channels, with missing
    /// channels counting as zero.
    pub fn total_lepton_energy_per_decay(&self) -> f64 {
        RadType::ALL
            .iter()
            .filter(|t| t.is_lepton())
            .map(|t| self.total_energy_per_decay(*t))
            .sum()
    }

    /// True when the isotope has no decay radiation at all
    pub fn is_stable(&self) -> bool {
        self.records.is_empty()
    }
}

/// Query facade over aggregated decay data for a set of isotopes
///
/// Canonicalises each requested identifier, loads its records through the
/// store, and computes the derived totals up front:
///
/// ```rust, no_run
/// # use nndc_decay::{DecayDatabase, DecayRadiation, FetchPolicy, HttpFetcher, RadType};
/// let mut db = DecayDatabase::open("/path/to/data").unwrap();
/// let decay_radiation = DecayRadiation::load(
///     &mut db,
///     &["co60", "ni56"],
///     FetchPolicy::Fetch,
///     &HttpFetcher,
/// )
/// .unwrap();
///
/// // index by any accepted spelling
/// let co60 = &decay_radiation["Co-60"];
/// println!("{}", co60.total_lepton_energy_per_decay());
/// ```
#[derive(Debug, Default)]
pub struct DecayRadiation {
    data: BTreeMap<String, AggregatedNuclide>,
}

impl DecayRadiation {
    /// Load and aggregate a list of isotopes from the database
    ///
    /// The cache-miss policy decides whether unknown isotopes are fetched on
    /// demand or fail the load.
    pub fn load(
        db: &mut DecayDatabase,
        isotopes: &[&str],
        policy: FetchPolicy,
        fetcher: &dyn Fetch,
    ) -> Result<Self> {
        let mut data = BTreeMap::new();
        for isotope in isotopes {
            let key = isotope.parse::<Nuclide>()?.key();
            let dataset = db.get_or_fetch(isotope, policy, fetcher)?;
            data.insert(key, AggregatedNuclide::new(dataset.records.clone()));
        }
        Ok(Self { data })
    }

    /// Look up a loaded isotope by any accepted identifier spelling
    pub fn get(&self, identifier: &str) -> Result<&AggregatedNuclide> {
        let key = identifier.parse::<Nuclide>()?.key();
        self.data
            .get(&key)
            .ok_or(Error::NotFound { nuclide: key })
    }

    /// Canonical keys of every loaded isotope
    pub fn nuclides(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }
}

impl Index<&str> for DecayRadiation {
    type Output = AggregatedNuclide;

    /// Panicking sugar for [DecayRadiation::get]
    fn index(&self, identifier: &str) -> &Self::Output {
        self.get(identifier)
            .unwrap_or_else(|e| panic!("lookup failed: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(rad_type: RadType, energy: f64, intensity: f64) -> ChannelRecord {
        ChannelRecord {
            rad_type,
            energy,
            energy_unc: None,
            intensity,
            intensity_unc: None,
            end_point_energy: None,
            end_point_energy_unc: None,
            heading: "test".to_string(),
        }
    }

    #[test]
    fn single_electron_row_totals() {
        let view = AggregatedNuclide::new(vec![record(RadType::Electron, 1.0e-13, 0.5)]);

        assert_eq!(view.total_energy_per_decay(RadType::Electron), 5.0e-14);
        assert_eq!(view.total_lepton_energy_per_decay(), 5.0e-14);
        // channels without rows contribute zero
        assert_eq!(view.total_energy_per_decay(RadType::Gamma), 0.0);
    }

    #[test]
    fn gamma_rows_do_not_count_as_leptons() {
        let view = AggregatedNuclide::new(vec![
            record(RadType::Gamma, 2.0e-6, 1.0),
            record(RadType::BetaMinus, 1.0e-7, 0.9),
        ]);

        assert!((view.total_energy_per_decay(RadType::Gamma) - 2.0e-6).abs() < 1e-18);
        assert!((view.total_lepton_energy_per_decay() - 9.0e-8).abs() < 1e-18);
    }

    #[test]
    fn totals_sum_over_rows() {
        let view = AggregatedNuclide::new(vec![
            record(RadType::BetaMinus, 1.0e-7, 0.5),
            record(RadType::BetaMinus, 2.0e-7, 0.25),
        ]);
        assert!((view.total_energy_per_decay(RadType::BetaMinus) - 1.0e-7).abs() < 1e-20);
    }

    #[test]
    fn stable_view_is_all_zeros() {
        let view = AggregatedNuclide::new(Vec::new());
        assert!(view.is_stable());
        assert_eq!(view.total_lepton_energy_per_decay(), 0.0);
    }
}
