//! This library encodes, decodes and validates the AAMVA DL/ID compliance
//! string carried by the PDF417 barcode of North American driver licenses
//! and identification cards.
//!
//! [`aamva::dlid`] holds the data element registry, the IIN directory and
//! the codec itself; the functions re-exported here are the entry points
//! most callers need.
pub use chrono::NaiveDate;

pub mod aamva;

pub use aamva::{
    decode_license_data, encode_license_data, get_field_definition, get_iin_by_state,
    get_mandatory_fields, get_state_by_iin, validate_license_data,
};
