#![allow(dead_code)]
use aamva_dlid::aamva::{DlSubfile, JurisdictionSubfile, Subfile};

pub const IIN_CA: &str = "636014";

/// Minimal California driver license.
pub const CALIFORNIA_LICENSE: [(&str, &str); 18] = [
    ("DAQ", "D1234567"),
    ("DCS", "SMITH"),
    ("DAC", "JOHN"),
    ("DBB", "01011990"),
    ("DBD", "01012020"),
    ("DBA", "01012030"),
    ("DBC", "1"),
    ("DAY", "BRO"),
    ("DAU", "070"),
    ("DAG", "123 MAIN ST"),
    ("DAI", "ANYTOWN"),
    ("DAJ", "CA"),
    ("DAK", "12345"),
    ("DCA", "D"),
    ("DCB", ""),
    ("DCD", ""),
    ("DCF", "DOC123"),
    ("DCG", "USA"),
];

pub fn california_license() -> DlSubfile {
    license_with(&CALIFORNIA_LICENSE)
}

pub fn license_with(fields: &[(&str, &str)]) -> DlSubfile {
    let mut dl = DlSubfile::new();
    for (code, value) in fields {
        dl.add_field(code, *value).unwrap();
    }
    dl
}

pub fn california_subfile(fields: &[(&str, &str)]) -> JurisdictionSubfile {
    let mut zc = JurisdictionSubfile::for_jurisdiction("CA").unwrap();
    for (code, value) in fields {
        zc.add_field(code, *value).unwrap();
    }
    zc
}

pub fn california_subfiles() -> Vec<Subfile> {
    let mut dl = california_license();
    dl.add_field("DAD", "QUINCY").unwrap();
    dl.add_field("DAZ", "BLK").unwrap();

    vec![
        dl.into(),
        california_subfile(&[("ZCA", "BLK"), ("ZCB", "CORRECTIVE LENSES")]).into(),
    ]
}
