//! Issuer Identification Numbers of the AAMVA member jurisdictions.
use std::{collections::HashMap, io::Cursor};

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jurisdiction {
    /// Full name, e.g. `California`.
    pub jurisdiction: String,

    /// Postal abbreviation, e.g. `CA`.
    pub abbr: String,

    /// ISO 3166-1 alpha-3 country code.
    pub country: String,

    /// Six digit Issuer Identification Number.
    pub iin: String,
}

lazy_static! {
    pub static ref JURISDICTIONS: Vec<Jurisdiction> = {
        let cursor = Cursor::new(include_str!("iin.csv"));
        let mut reader = csv::Reader::from_reader(cursor);
        reader
            .deserialize()
            .map(|record| record.expect("embedded IIN table is well-formed"))
            .collect()
    };
    static ref BY_ABBR: HashMap<&'static str, &'static Jurisdiction> = JURISDICTIONS
        .iter()
        .map(|j| (j.abbr.as_str(), j))
        .collect();
    static ref BY_IIN: HashMap<&'static str, &'static Jurisdiction> = JURISDICTIONS
        .iter()
        .map(|j| (j.iin.as_str(), j))
        .collect();
}

/// Looks up the IIN of a jurisdiction by postal abbreviation
/// (case-insensitive).
pub fn get_iin_by_state(abbr: &str) -> Option<&'static str> {
    BY_ABBR
        .get(abbr.trim().to_ascii_uppercase().as_str())
        .map(|j| j.iin.as_str())
}

pub fn get_state_by_iin(iin: &str) -> Option<&'static Jurisdiction> {
    BY_IIN.get(iin.trim()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_consistent() {
        assert_eq!(BY_ABBR.len(), JURISDICTIONS.len());
        assert_eq!(BY_IIN.len(), JURISDICTIONS.len());

        for j in JURISDICTIONS.iter() {
            assert_eq!(j.iin.len(), 6);
            assert!(j.iin.bytes().all(|b| b.is_ascii_digit()));
            assert_eq!(j.abbr.len(), 2);
        }
    }

    #[test]
    fn lookup_is_symmetric() {
        let iin = get_iin_by_state("CA").unwrap();
        assert_eq!(iin, "636014");
        assert_eq!(get_state_by_iin(iin).unwrap().abbr, "CA");

        for j in JURISDICTIONS.iter() {
            let iin = get_iin_by_state(&j.abbr).unwrap();
            assert_eq!(get_state_by_iin(iin), Some(j));
        }
    }

    #[test]
    fn canadian_provinces() {
        let on = get_state_by_iin("636012").unwrap();
        assert_eq!(on.jurisdiction, "Ontario");
        assert_eq!(on.country, "CAN");
    }

    #[test]
    fn absent_entries() {
        assert_eq!(get_iin_by_state("XX"), None);
        assert_eq!(get_iin_by_state(""), None);
        assert_eq!(get_state_by_iin("999999"), None);
        assert_eq!(get_iin_by_state("ny"), Some("636001"));
    }
}
