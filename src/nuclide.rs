//! Nuclide identifiers and their canonical store keys

// internal modules
use crate::error::{Error, Result};

// external crates
use serde::{Deserialize, Serialize};

// nom parser combinators
use nom::branch::alt;
use nom::character::complete::{alpha1, one_of};
use nom::combinator::opt;
use nom::error::{Error as NomError, ErrorKind};
use nom::{Err, IResult};

/// A nuclear species identified by element symbol and mass number
///
/// The `FromStr` trait is implemented and will try to parse a string into a
/// nuclide. Expects `<element><separator><mass><metastable>` where only the
/// separator and metastable tag are optional. e.g.
///
/// - Isotope `Co60`, `co60`, `CO60`
/// - Separated `Co-60`, `co_60`
/// - Metastable `Eu152m1`, `Eu152m2`, or bare `Eu152m` for the first state
///
/// The element must come first because something like "104mn" is ambiguous.
/// i.e. should it be interpreted as Mn-104 or N-104m?
///
/// ```rust
/// # use nndc_decay::{IsomerState, Nuclide};
/// # use std::str::FromStr;
/// let nuclide = Nuclide::from_str("eu-152m2").unwrap();
/// assert_eq!(
///     nuclide,
///     Nuclide {
///         symbol: "Eu".to_string(),
///         mass: 152,
///         state: IsomerState::Excited(2)
///     }
/// );
/// assert_eq!(nuclide.key(), "EU152M2");
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Nuclide {
    /// Element symbol, capitalised
    pub symbol: String,
    /// Mass number (Z+N, total nucleons)
    pub mass: u16,
    /// Excited state status
    pub state: IsomerState,
}

impl Nuclide {
    /// Canonical identifier used for store keys and queries, e.g. "CO60"
    ///
    /// Every store operation is keyed by this string, so it is the only
    /// spelling that ever reaches persistent state.
    pub fn key(&self) -> String {
        self.name().to_uppercase()
    }

    /// Display name with conventional capitalisation, e.g. "Co60"
    pub fn name(&self) -> String {
        format!("{}{}{}", self.symbol, self.mass, self.state)
    }
}

impl std::str::FromStr for Nuclide {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match nuclide_parts(s.trim()) {
            Ok(("", nuclide)) => Ok(nuclide),
            _ => Err(Error::InvalidNuclide(s.to_string())),
        }
    }
}

impl std::fmt::Display for Nuclide {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Variants of excited states
///
/// Excited state isomers use the ENSDF notation, where `m1` is the first
/// excited state, `m2` the second, and so on. A bare trailing `m` is taken
/// as `m1`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum IsomerState {
    #[default]
    Ground,
    Excited(u8),
}

impl std::fmt::Display for IsomerState {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            IsomerState::Ground => Ok(()),
            IsomerState::Excited(e) => write!(f, "m{e}"),
        }
    }
}

fn nuclide_parts(i: &str) -> IResult<&str, Nuclide> {
    let (i, symbol) = element(i)?;
    let (i, _) = opt(separator)(i)?;
    let (i, mass) = nom::character::complete::u16(i)?;
    let (i, state) = opt(metastable)(i)?;

    Ok((
        i,
        Nuclide {
            symbol: capitalise(symbol),
            mass,
            state: state.unwrap_or_default(),
        },
    ))
}

/// Get the element symbol, at most two letters
fn element(i: &str) -> IResult<&str, &str> {
    let (i, symbol) = alpha1(i)?;

    if symbol.len() > 2 {
        Err(Err::Error(NomError::new(i, ErrorKind::Fail)))
    } else {
        Ok((i, symbol))
    }
}

/// List of possible separators people may use
fn separator(i: &str) -> IResult<&str, char> {
    one_of("_-")(i)
}

fn metastable(i: &str) -> IResult<&str, IsomerState> {
    alt((numbered_isomer, bare_isomer))(i)
}

/// Get the isomer from the usual ENSDF formats m1, m2, etc...
fn numbered_isomer(i: &str) -> IResult<&str, IsomerState> {
    let (i, _) = one_of("mM")(i)?;
    let (i, number) = nom::character::complete::u8(i)?;

    if number == 0 {
        Ok((i, IsomerState::Ground))
    } else {
        Ok((i, IsomerState::Excited(number)))
    }
}

/// A trailing `m` with no number is the first excited state
fn bare_isomer(i: &str) -> IResult<&str, IsomerState> {
    let (i, _) = one_of("mM")(i)?;
    Ok((i, IsomerState::Excited(1)))
}

/// Capitalises the first letter, lowercases the rest
fn capitalise(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn common_spellings() {
        for spelling in ["co60", "Co60", "CO60", "co-60", "Co_60"] {
            let nuclide = Nuclide::from_str(spelling).unwrap();
            assert_eq!(nuclide.symbol, "Co");
            assert_eq!(nuclide.mass, 60);
            assert_eq!(nuclide.state, IsomerState::Ground);
            assert_eq!(nuclide.key(), "CO60");
        }
    }

    #[test]
    fn metastable_spellings() {
        assert_eq!(
            Nuclide::from_str("eu152m").unwrap().state,
            IsomerState::Excited(1)
        );
        assert_eq!(
            Nuclide::from_str("eu152m2").unwrap().state,
            IsomerState::Excited(2)
        );
        assert_eq!(
            Nuclide::from_str("eu152m0").unwrap().state,
            IsomerState::Ground
        );
        assert_eq!(Nuclide::from_str("eu152m2").unwrap().key(), "EU152M2");
    }

    #[test]
    fn invalid_spellings() {
        // element alone is not enough to key a dataset
        assert!(Nuclide::from_str("co").is_err());
        // trailing junk is not silently dropped
        assert!(Nuclide::from_str("co60xy").is_err());
        assert!(Nuclide::from_str("cobalt60").is_err());
        assert!(Nuclide::from_str("").is_err());
        assert!(Nuclide::from_str("60co").is_err());
    }
}
