//! Assembles segmented blocks into one dataset per isotope

// internal modules
use crate::error::{Error, Result};
use crate::html;
use crate::parsers::{self, decompose, Separator};
use crate::record::{ChannelRecord, IsotopeDataset, Metadata, MetadataValue};
use crate::segment::RawDataset;

// external crates
use log::{debug, warn};

/// Assemble segmented blocks into channel records and metadata
///
/// Headings are dispatched by kind: `Dataset #N` marks the dataset boundary,
/// channel headings parse into [ChannelRecord]s, `Authors` and `Citation`
/// feed the [Metadata], and anything else is logged and skipped. A second
/// dataset boundary is a hard error since the store schema assumes one
/// dataset per isotope.
///
/// A page with no channel headings at all assembles into an empty dataset,
/// which downstream layers treat as "stable isotope, verified no decay
/// radiation".
pub fn assemble(raw: &RawDataset, nuclide_key: &str) -> Result<(IsotopeDataset, Metadata)> {
    let mut records: Vec<ChannelRecord> = Vec::new();
    let mut metadata = Metadata::default();
    let mut dataset_open = false;

    for (heading, block) in &raw.blocks {
        if heading.starts_with("Dataset") {
            if dataset_open {
                return Err(Error::MultipleDatasets {
                    nuclide: nuclide_key.to_string(),
                });
            }
            dataset_open = true;
        } else if let Some(rows) = parsers::parse_channel_block(heading, block) {
            records.extend(rows);
        } else if heading.starts_with("Authors") {
            metadata.authors = Some(block_text(block));
        } else if heading.starts_with("Citation") {
            metadata.citation = Some(citation_text(block));
            metadata.values = decay_properties(block);
        } else {
            warn!("Heading \"{heading}\" not known and not parsed");
        }
    }

    if records.is_empty() {
        debug!("{nuclide_key} has no decay radiation tables");
    }

    // single keV -> erg conversion, uniform across every channel
    for record in &mut records {
        record.convert_kev_to_erg();
    }

    Ok((
        IsotopeDataset {
            records,
            downloaded_at: raw.downloaded_at.clone(),
        },
        metadata,
    ))
}

/// Free text of a block with its heading marker removed
fn block_text(block: &str) -> String {
    match html::next_tag_block(block, "u", 0) {
        Some((_, end)) => html::strip_tags(&block[end..]),
        None => html::strip_tags(block),
    }
}

/// Citation text runs from the heading up to the embedded properties table
fn citation_text(block: &str) -> String {
    let start = match html::next_tag_block(block, "u", 0) {
        Some((_, end)) => end,
        None => 0,
    };
    let rest = &block[start..];
    let cut = html::find_ci(rest, "<table", 0).unwrap_or(rest.len());
    html::strip_tags(&rest[..cut])
}

/// Scalar decay properties from the citation block's embedded table
///
/// Rows are `label | value` pairs such as `Parent half-life (s)`. The unit
/// suffix is stripped from the label and kept as a tag, and the value cell
/// goes through the usual value/uncertainty decomposition. Unparsable rows
/// are skipped, never fatal.
fn decay_properties(block: &str) -> Vec<MetadataValue> {
    let mut values = Vec::new();
    for row in html::table_rows(block) {
        let [label, raw] = row.as_slice() else {
            continue;
        };
        let (label, raw) = (label.trim(), raw.trim());
        if label.is_empty() || raw.is_empty() {
            continue;
        }
        let (name, unit) = split_unit(label);
        match decompose(raw, Separator::Whitespace) {
            Ok((value, uncertainty)) => values.push(MetadataValue {
                name,
                value,
                uncertainty: uncertainty.is_finite().then_some(uncertainty),
                unit,
            }),
            Err(e) => warn!("Skipping decay property \"{label}\": {e}"),
        }
    }
    values
}

/// Split a trailing `(unit)` suffix off a column label
fn split_unit(label: &str) -> (String, Option<String>) {
    let label = label.trim().trim_end_matches(':').trim();
    if label.ends_with(')') {
        if let Some(open) = label.rfind('(') {
            let unit = label[open + 1..label.len() - 1].trim();
            if !unit.is_empty() {
                return (field_name(&label[..open]), Some(unit.to_string()));
            }
        }
    }
    (field_name(label), None)
}

/// Lowercase snake_case field name from a free-text label
fn field_name(label: &str) -> String {
    let mut name = String::with_capacity(label.len());
    for ch in label.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            name.push(ch.to_ascii_lowercase());
        } else if !name.is_empty() && !name.ends_with('_') {
            name.push('_');
        }
    }
    name.trim_end_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{RadType, KEV_TO_ERG};
    use crate::segment::segment;

    fn raw_page(markup: &str) -> RawDataset {
        segment(markup)
    }

    #[test]
    fn energies_end_up_in_erg() {
        let raw = raw_page(
            "<u>Dataset #1: 60CO B- decay</u>\
             <u>Gamma and X-ray radiation</u>\
             <table>\
             <tr><th>Type</th><th>Energy</th><th>Intensity</th><th>Dose</th></tr>\
             <tr><td>G</td><td>1173.2 0.4</td><td>99.9%0.1</td><td>1.2</td></tr>\
             </table>",
        );
        let (dataset, _) = assemble(&raw, "CO60").unwrap();
        assert_eq!(dataset.records.len(), 1);

        let record = &dataset.records[0];
        assert_eq!(record.rad_type, RadType::Gamma);
        assert!((record.energy - 1173.2 * KEV_TO_ERG).abs() < 1e-18);
        assert!((record.energy_unc.unwrap() - 0.4 * KEV_TO_ERG).abs() < 1e-18);
        // intensity is a unitless fraction, untouched by the conversion
        assert!((record.intensity - 0.999).abs() < 1e-12);
        assert_eq!(dataset.downloaded_at, raw.downloaded_at);
    }

    #[test]
    fn second_dataset_boundary_is_fatal() {
        let raw = raw_page(
            "<u>Dataset #1: 60CO B- decay</u><p>a</p>\
             <u>Dataset #2: 60CO EC decay</u><p>b</p>",
        );
        assert!(matches!(
            assemble(&raw, "CO60"),
            Err(Error::MultipleDatasets { .. })
        ));
    }

    #[test]
    fn page_without_channels_is_stable() {
        let raw = raw_page("<html><body>No datasets were found</body></html>");
        let (dataset, metadata) = assemble(&raw, "FE56").unwrap();
        assert!(dataset.is_stable());
        assert_eq!(metadata, Metadata::default());
    }

    #[test]
    fn authors_and_citation_metadata() {
        let raw = raw_page(
            "<u>Dataset #1: 60CO B- decay</u>\
             <u>Authors</u> E. BROWNE, J. K. TULI\
             <u>Citation</u> Nuclear Data Sheets 114, 1849 (2013)\
             <table>\
             <tr><td>Parent half-life (s)</td><td>166344192 12096</td></tr>\
             <tr><td>Q-value (keV)</td><td>2822.81 21</td></tr>\
             <tr><td>Notes</td><td>none recorded here</td></tr>\
             </table>",
        );
        let (_, metadata) = assemble(&raw, "CO60").unwrap();

        assert_eq!(metadata.authors.clone().unwrap(), "E. BROWNE, J. K. TULI");
        assert_eq!(
            metadata.citation.clone().unwrap(),
            "Nuclear Data Sheets 114, 1849 (2013)"
        );

        let half_life = metadata.value("parent_half_life").unwrap();
        assert_eq!(half_life.value, 166344192.0);
        assert_eq!(half_life.uncertainty, Some(12096.0));
        assert_eq!(half_life.unit.as_deref(), Some("s"));

        let q_value = metadata.value("q_value").unwrap();
        assert!((q_value.value - 2822.81).abs() < 1e-9);
        assert!((q_value.uncertainty.unwrap() - 0.21).abs() < 1e-9);
        assert_eq!(q_value.unit.as_deref(), Some("keV"));

        // the unparsable free-text row is skipped, not fatal
        assert!(metadata.value("notes").is_none());
    }

    #[test]
    fn unknown_headings_are_skipped() {
        let raw = raw_page(
            "<u>Dataset #1</u>\
             <u>Some new section</u><p>future format drift</p>\
             <u>Electrons</u>\
             <table>\
             <tr><th>Type</th><th>Energy</th><th>Intensity</th><th>Dose</th></tr>\
             <tr><td>Auger K</td><td>6.54</td><td>0.014%15</td><td>0.1</td></tr>\
             </table>",
        );
        let (dataset, _) = assemble(&raw, "CO60").unwrap();
        assert_eq!(dataset.records.len(), 1);
        assert_eq!(dataset.records[0].rad_type, RadType::Electron);
    }
}
