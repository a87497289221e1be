//! Typed records for decay radiation data

use serde::{Deserialize, Serialize};

/// Energy conversion factor, erg per keV
pub const KEV_TO_ERG: f64 = 1.602176634e-9;

/// Type of decay radiation channel
///
/// The decay search pages tabulate the following emission channels:
///
/// - Auger and conversion electrons
/// - Beta+ (including electron capture)
/// - Beta-
/// - Gamma rays
/// - X-rays
///
/// Gamma and X-ray emissions share a single table on the page and are split
/// apart by the row type tag during parsing.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RadType {
    /// Auger and conversion electrons
    Electron,
    /// Beta+ or electron capture
    BetaPlus,
    /// Beta-
    BetaMinus,
    /// Gamma decay
    Gamma,
    /// X-ray
    Xray,
}

impl RadType {
    /// Every channel variant, in a stable order
    pub const ALL: [RadType; 5] = [
        RadType::Electron,
        RadType::BetaPlus,
        RadType::BetaMinus,
        RadType::Gamma,
        RadType::Xray,
    ];

    /// Channel label used in derived quantity names
    ///
    /// ```rust
    /// # use nndc_decay::RadType;
    /// assert_eq!(RadType::Electron.label(), "electrons");
    /// assert_eq!(RadType::BetaPlus.label(), "beta_plus");
    /// assert_eq!(RadType::Xray.label(), "x_rays");
    /// ```
    pub fn label(&self) -> &'static str {
        match self {
            RadType::Electron => "electrons",
            RadType::BetaPlus => "beta_plus",
            RadType::BetaMinus => "beta_minus",
            RadType::Gamma => "gamma_rays",
            RadType::Xray => "x_rays",
        }
    }

    /// Whether the channel deposits its energy through leptons
    pub fn is_lepton(&self) -> bool {
        matches!(
            self,
            RadType::Electron | RadType::BetaPlus | RadType::BetaMinus
        )
    }
}

impl std::fmt::Display for RadType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One row of a radiation channel table
///
/// Mandatory numeric fields are always present; rows that failed to produce
/// them are dropped during parsing rather than stored half-empty. The
/// uncertainties remain [Option] because the source tables frequently omit
/// them.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChannelRecord {
    /// Emission channel this row belongs to
    pub rad_type: RadType,
    /// Radiation energy (erg)
    pub energy: f64,
    /// Uncertainty in radiation energy (erg)
    pub energy_unc: Option<f64>,
    /// Fraction of parent decays producing this emission
    pub intensity: f64,
    /// Uncertainty in intensity
    pub intensity_unc: Option<f64>,
    /// Beta spectrum end-point energy (erg)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_point_energy: Option<f64>,
    /// Uncertainty in end-point energy (erg)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_point_energy_unc: Option<f64>,
    /// Heading of the source table the row was parsed from
    pub heading: String,
}

impl ChannelRecord {
    /// Energy deposited in this channel per parent decay (erg)
    pub fn energy_per_decay(&self) -> f64 {
        self.energy * self.intensity
    }

    /// Convert all energy fields from keV to erg
    ///
    /// Parsing keeps the source units; this is applied exactly once when a
    /// dataset is assembled, uniformly for every channel.
    pub(crate) fn convert_kev_to_erg(&mut self) {
        self.energy *= KEV_TO_ERG;
        self.energy_unc = self.energy_unc.map(|u| u * KEV_TO_ERG);
        self.end_point_energy = self.end_point_energy.map(|v| v * KEV_TO_ERG);
        self.end_point_energy_unc = self.end_point_energy_unc.map(|u| u * KEV_TO_ERG);
    }
}

impl std::fmt::Display for ChannelRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{:<11} {:.4e} erg, intensity {:.4e}",
            self.rad_type, self.energy, self.intensity
        )
    }
}

/// All channel records for one isotope plus fetch provenance
///
/// An empty record list is meaningful: it marks an isotope that was fetched
/// and verified to have no decay radiation, i.e. a stable isotope.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct IsotopeDataset {
    /// Concatenated rows from every channel table
    pub records: Vec<ChannelRecord>,
    /// UTC timestamp of the fetch that produced these records
    pub downloaded_at: String,
}

impl IsotopeDataset {
    /// True when the isotope was verified to have no decay radiation
    pub fn is_stable(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows belonging to a single emission channel
    pub fn channel(&self, rad_type: RadType) -> impl Iterator<Item = &ChannelRecord> {
        self.records.iter().filter(move |r| r.rad_type == rad_type)
    }
}

/// Per-isotope scalar facts from the citation block
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    /// Author list of the evaluation
    pub authors: Option<String>,
    /// Citation text for the evaluation
    pub citation: Option<String>,
    /// Scalar decay properties, e.g. parent half-life and Q-value
    pub values: Vec<MetadataValue>,
}

impl Metadata {
    /// Look up a scalar decay property by its field name
    pub fn value(&self, name: &str) -> Option<&MetadataValue> {
        self.values.iter().find(|v| v.name == name)
    }
}

/// One scalar fact with its uncertainty and unit tag
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MetadataValue {
    /// Field name derived from the source column label
    pub name: String,
    /// Nominal value
    pub value: f64,
    /// One-sigma uncertainty, when reported
    pub uncertainty: Option<f64>,
    /// Unit tag stripped from the source column label
    pub unit: Option<String>,
}
