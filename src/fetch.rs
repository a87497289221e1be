//! Document retrieval from the NNDC decay search

// internal modules
use crate::error::Result;
use crate::nuclide::Nuclide;

// external crates
use log::info;

/// Base of the URL used to query the NuDat decay search
const DECAY_SEARCH_URL: &str = "https://www.nndc.bnl.gov/nudat2/decaysearchdirect.jsp";

/// Build the decay radiation query URL for a nuclide
///
/// ```rust
/// # use nndc_decay::{decay_radiation_url, Nuclide};
/// let co60: Nuclide = "co60".parse().unwrap();
/// assert_eq!(
///     decay_radiation_url(&co60),
///     "https://www.nndc.bnl.gov/nudat2/decaysearchdirect.jsp?nuc=CO60&unc=nds"
/// );
/// ```
pub fn decay_radiation_url(nuclide: &Nuclide) -> String {
    format!("{DECAY_SEARCH_URL}?nuc={}&unc=nds", nuclide.key())
}

/// Anything able to return raw markup for a URL
///
/// The pipeline only ever needs "markup for this URL", so tests and offline
/// workflows can substitute their own source of pages.
pub trait Fetch {
    /// Retrieve the raw markup behind a URL
    fn fetch(&self, url: &str) -> Result<String>;
}

/// Fetcher backed by a blocking HTTPS GET request
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpFetcher;

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        info!("Downloading data from {url}");
        let response = minreq::get(url).send()?;
        Ok(response.as_str()?.to_string())
    }
}
