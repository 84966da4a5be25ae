mod common;

use aamva_dlid::aamva::dlid::{
    self, format, AamvaVersion, DecodeOptions, DecodingError, EncodeOptions, FieldDelimiting,
    Subfile,
};
use common::*;

/// California license whose last field is the optional hair color.
fn encoded() -> String {
    let mut dl = california_license();
    dl.add_field("DAZ", "BLK").unwrap();
    let out = dlid::encode(&[dl.into()], AamvaVersion::V2020, IIN_CA).unwrap();
    assert!(out.ends_with("\nDAZBLK\r"));
    out
}

#[test]
fn truncated_final_field() {
    let out = encoded();
    let truncated = &out[..out.len() - 3];

    let decoded = dlid::decode(truncated, false).unwrap();
    let dl = decoded.document().unwrap();
    assert_eq!(dl.get_field("DAZ"), None);
    assert_eq!(dl.get_field("DCG"), Some("USA"));
    assert_eq!(dl.len(), CALIFORNIA_LICENSE.len());
    assert_eq!(decoded.warnings.len(), 2);

    let declared = out.len() - 31;
    assert_eq!(
        dlid::decode(truncated, true),
        Err(DecodingError::LengthMismatch {
            subfile_type: "DL".to_owned(),
            declared,
            available: declared - 3
        })
    );
}

#[test]
fn subfile_is_found_despite_a_wrong_offset() {
    let out = encoded();
    assert_eq!(&out[21..27], "DL0031");
    let shifted = out.replacen("DL0031", "DL0035", 1);

    let decoded = dlid::decode(&shifted, false).unwrap();
    assert_eq!(decoded.warnings.len(), 1);
    assert_eq!(decoded.warnings[0].offset, Some(35));
    assert_eq!(
        decoded.document().unwrap().get_field("DAQ"),
        Some("D1234567")
    );

    assert_eq!(
        dlid::decode(&shifted, true),
        Err(DecodingError::SubfileTypeMismatch {
            expected: "DL".to_owned(),
            offset: 35
        })
    );
}

#[test]
fn separators_are_read_from_the_header() {
    let out = encoded().replace('\n', "\x1d");

    let decoded = dlid::decode(&out, false).unwrap();
    assert_eq!(decoded.header.separators.data_element, 0x1d);
    assert_eq!(decoded.document().unwrap().get_field("DAZ"), Some("BLK"));
    assert_eq!(decoded.warnings.len(), 1);

    assert_eq!(
        dlid::decode_with(&out, &DecodeOptions { strict: true }),
        Err(DecodingError::UnexpectedControlCharacter { offset: 1 })
    );
}

#[test]
fn trailing_data() {
    let out = encoded() + "XYZ";

    let decoded = dlid::decode(&out, false).unwrap();
    assert_eq!(decoded.warnings.len(), 1);
    assert!(decoded.warnings[0].message.contains("3 trailing bytes"));

    assert_eq!(
        dlid::decode(&out, true),
        Err(DecodingError::TrailingData {
            subfile_type: "DL".to_owned(),
            count: 3
        })
    );
}

#[test]
fn legacy_file_type() {
    let out = encoded().replacen("ANSI ", "AAMVA", 1);

    let decoded = dlid::decode(&out, false).unwrap();
    assert_eq!(decoded.header.file_type, "AAMVA");
    assert_eq!(decoded.subfiles.len(), 1);

    assert_eq!(dlid::decode(&out, true), Err(DecodingError::InvalidFileType));
}

#[test]
fn conflicting_duplicate_keeps_the_first_value() {
    let out = encoded().replacen("DAZBLK", "DCSJON", 1);

    let decoded = dlid::decode(&out, false).unwrap();
    assert_eq!(decoded.document().unwrap().get_field("DCS"), Some("SMITH"));
    assert_eq!(decoded.warnings.len(), 1);

    assert_eq!(
        dlid::decode(&out, true),
        Err(DecodingError::DuplicateField {
            subfile_type: "DL".to_owned(),
            code: "DCS".to_owned()
        })
    );
}

#[test]
fn unparseable_field_is_skipped() {
    let out = encoded().replacen("DAZBLK", "dazBLK", 1);
    let offset = out.find("dazBLK").unwrap();

    let decoded = dlid::decode(&out, false).unwrap();
    assert_eq!(decoded.warnings[0].offset, Some(offset));
    assert_eq!(decoded.document().unwrap().len(), CALIFORNIA_LICENSE.len());

    assert_eq!(
        dlid::decode(&out, true),
        Err(DecodingError::UnparseableField {
            subfile_type: "DL".to_owned(),
            offset
        })
    );
}

#[test]
fn unknown_codes_are_preserved() {
    let mut dl = california_license();
    dl.add_field("DZZ", "FUTURE").unwrap();
    let out = dlid::encode(&[dl.into()], AamvaVersion::V2020, IIN_CA).unwrap();

    let decoded = dlid::decode(&out, true).unwrap();
    let extensions: Vec<_> = decoded
        .document()
        .unwrap()
        .extensions()
        .map(|(code, value)| (code.to_string(), value))
        .collect();
    assert_eq!(extensions, [("DZZ".to_owned(), "FUTURE")]);
}

#[test]
fn concatenated_layout_is_detected() {
    let mut dl = california_license();
    dl.set_field("DCA", "C").unwrap();
    let subfiles = vec![
        Subfile::from(dl),
        california_subfile(&[("ZCA", "BLK"), ("ZCB", "GLASSES")]).into(),
    ];

    let options = EncodeOptions {
        delimiting: FieldDelimiting::Concatenated,
        ..EncodeOptions::default()
    };
    let out = dlid::encode_with(&subfiles, IIN_CA, &options).unwrap();
    assert!(!out[21..].contains('\n'));
    assert!(out.ends_with("ZCZCABLKZCBGLASSES\r"));

    let decoded = dlid::decode(&out, true).unwrap();
    assert_eq!(decoded.subfiles, subfiles);
}

#[test]
fn decoded_file_serializes() {
    let decoded = dlid::decode(encoded(), true).unwrap();
    let json = serde_json::to_value(&decoded).unwrap();

    assert_eq!(json["header"]["iin"], IIN_CA);
    assert_eq!(json["header"]["aamva_version"], "10");
    assert_eq!(json["header"]["designators"][0]["subfile_type"], "DL");
    assert_eq!(json["subfiles"][0]["fields"]["DAQ"], "D1234567");
    assert_eq!(json["warnings"].as_array().unwrap().len(), 0);
}

#[test]
fn debug_views() {
    let out = encoded();
    let visible = format::visualize_control_characters(&out);
    assert!(visible.starts_with("@<LF><RS><CR>ANSI 636014"));
    assert!(visible.ends_with("<LF>DAZBLK<CR>"));

    let dump = format::hex_dump(out.as_bytes());
    assert!(dump.starts_with("00000000  40 0a 1e 0d 41 4e 53 49"));

    let decoded = dlid::decode(&out, true).unwrap();
    assert!(format::describe_header(&decoded.header).contains("California"));
    assert_eq!(
        format::digest_hex(&decoded.subfiles[0]),
        format::digest_hex(&Subfile::from({
            let mut dl = california_license();
            dl.add_field("DAZ", "BLK").unwrap();
            dl
        }))
    );
}

#[test]
fn decoded_file_is_validated_against_its_header() {
    let out = encoded().replacen("636014", "636001", 1);
    let decoded = dlid::decode(&out, true).unwrap();

    let lenient = decoded.validate(false);
    assert!(lenient.is_valid());
    assert_eq!(lenient.warnings().count(), 1);

    let strict = decoded.validate(true);
    assert!(!strict.is_valid());
    assert_eq!(strict.errors().next().unwrap().code.code(), "IIN_MISMATCH");
}

#[test]
fn bytes_between_subfiles() {
    let out = dlid::encode(&california_subfiles(), AamvaVersion::V2020, IIN_CA).unwrap();
    assert_eq!(&out[31..33], "ZC");
    let zc_offset: usize = out[33..37].parse().unwrap();

    let gapped = format!(
        "{}{:04}{}JUNK!{}",
        &out[..33],
        zc_offset + 5,
        &out[37..zc_offset],
        &out[zc_offset..]
    );

    let decoded = dlid::decode(&gapped, false).unwrap();
    assert_eq!(decoded.warnings.len(), 1);
    assert_eq!(decoded.warnings[0].offset, Some(zc_offset + 5));
    assert_eq!(decoded.subfiles, california_subfiles());

    assert_eq!(
        dlid::decode(&gapped, true),
        Err(DecodingError::MisplacedSubfile {
            subfile_type: "ZC".to_owned(),
            start: zc_offset + 5,
            expected: zc_offset
        })
    );
}

#[test]
fn data_after_an_empty_header() {
    let out = "@\n\x1e\rANSI 636014100000XYZ";

    let decoded = dlid::decode(out, false).unwrap();
    assert!(decoded.subfiles.is_empty());
    assert_eq!(decoded.warnings.len(), 1);
    assert_eq!(decoded.warnings[0].offset, Some(21));

    assert_eq!(
        dlid::decode(out, true),
        Err(DecodingError::TrailingHeaderData { count: 3 })
    );
}
