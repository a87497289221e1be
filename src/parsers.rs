//! Parsers for the heading-delimited tables of a decay search page
//!
//! Each radiation channel has its own table layout on the page, but all of
//! them share the same numeric notation: a nominal value followed by an
//! optional uncertainty, separated either by whitespace or by a `%` sign.
//! [decompose] handles that notation once and every channel parser builds on
//! it.

// internal modules
use crate::error::{Error, Result};
use crate::html;
use crate::record::{ChannelRecord, RadType};

// external crates
use log::warn;

/// Separator between a nominal value and its trailing uncertainty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    /// `99.9%0.1`, used for intensity columns
    Percent,
    /// `1173.2 0.4`, used for energy columns
    Whitespace,
}

/// Decompose a raw value/uncertainty string into `(nominal, std_dev)`
///
/// The tables report uncertainties in the usual compact evaluation notation,
/// where the uncertainty applies to the last digits of the value unless it
/// carries its own decimal point:
///
/// ```rust
/// # use nndc_decay::{decompose, Separator};
/// // shorthand scaled to the last decimal place
/// assert_eq!(decompose("1173.2 4", Separator::Whitespace).unwrap(), (1173.2, 0.4));
/// // absolute when the uncertainty has a decimal point
/// assert_eq!(decompose("1173.2 0.4", Separator::Whitespace).unwrap(), (1173.2, 0.4));
/// ```
///
/// A missing or empty uncertainty is NaN, never zero, so that "unknown" can
/// not be mistaken for "exact". An exponent on the value scales both parts.
pub fn decompose(raw: &str, separator: Separator) -> Result<(f64, f64)> {
    let raw = raw.trim().to_lowercase();

    let (value, uncertainty) = match separator {
        Separator::Percent => match raw.split_once('%') {
            Some((value, unc)) => (value.trim(), Some(unc.trim())),
            None => (raw.as_str(), None),
        },
        Separator::Whitespace => {
            let parts = raw.split_whitespace().collect::<Vec<_>>();
            match parts.as_slice() {
                [value] => (*value, None),
                [value, unc] => (*value, Some(*unc)),
                _ => {
                    return Err(Error::Parse(format!(
                        "expected one or two parts in \"{raw}\""
                    )))
                }
            }
        }
    };

    match uncertainty {
        None | Some("") => Ok((parse_f64(value)?, f64::NAN)),
        Some(unc) => {
            // reconstruct standard nominal(uncertainty) notation, keeping
            // any exponent marker outside the parentheses
            let notation = match value.find('e') {
                Some(position) => {
                    format!("{}({unc}){}", &value[..position], &value[position..])
                }
                None => format!("{value}({unc})"),
            };
            parse_shorthand(&notation)
        }
    }
}

/// Extract nominal value and deviation from `nominal(uncertainty)` notation
///
/// `12.3(4)` is 12.3 +/- 0.4 while `12.3(0.4)` spells the deviation out in
/// full. With an exponent, `1.2(4)e3` is 1200 +/- 400.
fn parse_shorthand(notation: &str) -> Result<(f64, f64)> {
    let Some(open) = notation.find('(') else {
        return Ok((parse_f64(notation)?, f64::NAN));
    };
    let close = notation[open..]
        .find(')')
        .map(|i| i + open)
        .ok_or_else(|| Error::Parse(format!("unbalanced parentheses in \"{notation}\"")))?;

    let mantissa = &notation[..open];
    let uncertainty = notation[open + 1..close].trim();
    let exponent = &notation[close + 1..];

    let nominal = parse_f64(&format!("{mantissa}{exponent}"))?;
    let scale = if exponent.is_empty() {
        1.0
    } else {
        parse_f64(&format!("1{exponent}"))?
    };

    if uncertainty.is_empty() {
        return Ok((nominal, f64::NAN));
    }

    let std_dev = if uncertainty.contains('.') {
        parse_f64(uncertainty)? * scale
    } else {
        // shorthand digits apply to the last decimal place of the mantissa
        let decimals = mantissa.split('.').nth(1).map_or(0, str::len) as i32;
        parse_f64(uncertainty)? * 10f64.powi(-decimals) * scale
    };

    Ok((nominal, std_dev))
}

fn parse_f64(s: &str) -> Result<f64> {
    s.trim()
        .parse::<f64>()
        .map_err(|_| Error::Parse(format!("\"{s}\" is not a number")))
}

/// Table layout for one radiation channel heading
struct ChannelLayout {
    heading: &'static str,
    columns: &'static [&'static str],
    rad_type: RadType,
}

/// Heading-keyed dispatch table for the channel parsers
///
/// The gamma table carries both gamma and X-ray rows, split by the row type
/// tag after sanitization.
const CHANNEL_LAYOUTS: [ChannelLayout; 4] = [
    ChannelLayout {
        heading: "Electrons",
        columns: &["type", "energy", "intensity", "dose"],
        rad_type: RadType::Electron,
    },
    ChannelLayout {
        heading: "Beta+",
        columns: &["energy", "end_point_energy", "intensity", "dose"],
        rad_type: RadType::BetaPlus,
    },
    ChannelLayout {
        heading: "Beta-",
        columns: &["energy", "end_point_energy", "intensity", "dose"],
        rad_type: RadType::BetaMinus,
    },
    ChannelLayout {
        heading: "Gamma and X-ray radiation",
        columns: &["type", "energy", "intensity", "dose"],
        rad_type: RadType::Gamma,
    },
];

fn channel_layout(heading: &str) -> Option<&'static ChannelLayout> {
    CHANNEL_LAYOUTS.iter().find(|l| l.heading == heading)
}

/// Check whether a heading names a known radiation channel table
pub fn is_channel_heading(heading: &str) -> bool {
    channel_layout(heading).is_some()
}

/// Parse the table in a heading's markup block into channel records
///
/// Returns `None` for headings that do not name a channel table. Energies in
/// the returned records are still in keV; the conversion to erg happens once
/// when the full dataset is assembled.
pub fn parse_channel_block(heading: &str, block: &str) -> Option<Vec<ChannelRecord>> {
    let layout = channel_layout(heading)?;
    Some(sanitize(html::table_rows(block), layout, heading))
}

/// Turn raw table rows into typed records, dropping anything incomplete
fn sanitize(rows: Vec<Vec<String>>, layout: &ChannelLayout, heading: &str) -> Vec<ChannelRecord> {
    let mut records = Vec::new();
    // the first row repeats the column labels
    for row in rows.into_iter().skip(1) {
        if row.len() != layout.columns.len() {
            continue;
        }
        match sanitize_row(&row, layout, heading) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => {} // row with missing values, dropped
            Err(e) => warn!("Dropping unparsable row under \"{heading}\": {e}"),
        }
    }
    records
}

fn sanitize_row(
    cells: &[String],
    layout: &ChannelLayout,
    heading: &str,
) -> Result<Option<ChannelRecord>> {
    let mut raw_type = "";
    let mut energy = None;
    let mut end_point_energy = None;
    let mut intensity = None;

    for (column, cell) in layout.columns.iter().zip(cells) {
        let cell = cell.trim();
        // an empty type tag is tolerated, any other missing value drops the row
        if cell.is_empty() {
            match *column {
                "type" => continue,
                _ => return Ok(None),
            }
        }
        match *column {
            "type" => raw_type = cell,
            "energy" => energy = Some(decompose(cell, Separator::Whitespace)?),
            "end_point_energy" => {
                end_point_energy = Some(decompose(cell, Separator::Whitespace)?)
            }
            "intensity" => intensity = Some(decompose(cell, Separator::Percent)?),
            "dose" => {} // not used downstream
            _ => {}
        }
    }

    let (Some((energy, energy_unc)), Some((intensity, intensity_unc))) = (energy, intensity)
    else {
        return Ok(None);
    };

    let rad_type = match layout.rad_type {
        RadType::Gamma => split_gamma_type(raw_type),
        other => other,
    };

    Ok(Some(ChannelRecord {
        rad_type,
        energy,
        energy_unc: finite(energy_unc),
        // percent notation becomes a fraction of decays
        intensity: intensity / 100.0,
        intensity_unc: finite(intensity_unc).map(|u| u / 100.0),
        end_point_energy: end_point_energy.map(|(value, _)| value),
        end_point_energy_unc: end_point_energy.and_then(|(_, unc)| finite(unc)),
        heading: heading.to_string(),
    }))
}

/// X-ray rows are designated by an exact `XR` type token, e.g. `XR ka1`
///
/// The token test is exact on purpose. Something like `XR-a` is not an X-ray
/// designation and stays in the gamma channel.
fn split_gamma_type(raw_type: &str) -> RadType {
    match raw_type.split_whitespace().next() {
        Some("XR") => RadType::Xray,
        _ => RadType::Gamma,
    }
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("99.9%0.1", 99.9, 0.1)]
    #[case("99.88%3", 99.88, 0.03)]
    #[case("0.0130%5", 0.0130, 0.0005)]
    #[case("12.3% 4", 12.3, 0.4)]
    fn percent_decomposition(#[case] raw: &str, #[case] nominal: f64, #[case] std_dev: f64) {
        let (value, unc) = decompose(raw, Separator::Percent).unwrap();
        assert_eq!(value, nominal);
        assert!((unc - std_dev).abs() < 1e-12);
    }

    #[rstest]
    #[case("1173.2 0.4", 1173.2, 0.4)]
    #[case("1173.2 4", 1173.2, 0.4)]
    #[case("95.77 15", 95.77, 0.15)]
    #[case("166344192 12096", 166344192.0, 12096.0)]
    fn whitespace_decomposition(#[case] raw: &str, #[case] nominal: f64, #[case] std_dev: f64) {
        let (value, unc) = decompose(raw, Separator::Whitespace).unwrap();
        assert_eq!(value, nominal);
        assert!((unc - std_dev).abs() < 1e-9);
    }

    #[test]
    fn missing_uncertainty_is_nan() {
        let (value, unc) = decompose("12.3", Separator::Whitespace).unwrap();
        assert_eq!(value, 12.3);
        assert!(unc.is_nan());

        // empty string after the separator is also undefined
        let (value, unc) = decompose("12.3% ", Separator::Percent).unwrap();
        assert_eq!(value, 12.3);
        assert!(unc.is_nan());
    }

    #[test]
    fn exponent_scales_both_parts() {
        let (value, unc) = decompose("1.2e3 4", Separator::Whitespace).unwrap();
        assert!((value - 1200.0).abs() < 1e-9);
        assert!((unc - 400.0).abs() < 1e-9);

        let (value, unc) = decompose("1.2E3 0.4", Separator::Whitespace).unwrap();
        assert!((value - 1200.0).abs() < 1e-9);
        assert!((unc - 400.0).abs() < 1e-9);
    }

    #[test]
    fn too_many_parts_is_an_error() {
        assert!(decompose("5.27 y 8", Separator::Whitespace).is_err());
    }

    #[test]
    fn not_a_number_is_an_error() {
        assert!(decompose("approx 4", Separator::Whitespace).is_err());
    }

    #[rstest]
    #[case("XR ka1", RadType::Xray)]
    #[case("XR l", RadType::Xray)]
    #[case("XR-a", RadType::Gamma)]
    #[case("G", RadType::Gamma)]
    #[case("", RadType::Gamma)]
    fn gamma_xray_split(#[case] raw_type: &str, #[case] expected: RadType) {
        assert_eq!(split_gamma_type(raw_type), expected);
    }

    #[test]
    fn channel_block_sanitization() {
        let block = "<u>Gamma and X-ray radiation</u>\
            <table>\
            <tr><th>Type</th><th>Energy (keV)</th><th>Intensity (%)</th><th>Dose</th></tr>\
            <tr><td>XR-a</td><td>1173.2 0.4</td><td>99.9%0.1</td><td>1.2</td></tr>\
            <tr><td>XR ka1</td><td>6.915</td><td>0.0130%5</td><td>0.001</td></tr>\
            <tr><td>G</td><td></td><td>1.0%</td><td>0.1</td></tr>\
            </table>";

        let records = parse_channel_block("Gamma and X-ray radiation", block).unwrap();

        // the row with a missing energy is dropped
        assert_eq!(records.len(), 2);

        // energies are still keV at this stage
        assert_eq!(records[0].rad_type, RadType::Gamma);
        assert!((records[0].energy - 1173.2).abs() < 1e-9);
        assert!((records[0].energy_unc.unwrap() - 0.4).abs() < 1e-9);
        assert!((records[0].intensity - 0.999).abs() < 1e-12);
        assert!((records[0].intensity_unc.unwrap() - 0.001).abs() < 1e-12);
        assert_eq!(records[0].heading, "Gamma and X-ray radiation");

        assert_eq!(records[1].rad_type, RadType::Xray);
        assert!(records[1].energy_unc.is_none());
    }

    #[test]
    fn beta_block_keeps_end_point_energy() {
        let block = "<table>\
            <tr><th>Energy</th><th>End point</th><th>Intensity</th><th>Dose</th></tr>\
            <tr><td>95.77 15</td><td>317.05 21</td><td>99.88%3</td><td>0.1</td></tr>\
            </table>";

        let records = parse_channel_block("Beta-", block).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].rad_type, RadType::BetaMinus);
        assert!((records[0].end_point_energy.unwrap() - 317.05).abs() < 1e-9);
        assert!((records[0].end_point_energy_unc.unwrap() - 0.21).abs() < 1e-9);
    }

    #[test]
    fn unknown_headings_are_not_channels() {
        assert!(parse_channel_block("Citation", "<table></table>").is_none());
        assert!(!is_channel_heading("Authors"));
        assert!(is_channel_heading("Beta+"));
    }
}
