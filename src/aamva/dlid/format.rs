//! Human-readable views of subfiles and raw compliance strings.
use std::fmt::Write;

use sha2::{Digest, Sha256};

use super::{
    iin::get_state_by_iin,
    pdf_417::{Header, DATA_ELEMENT_SEPARATOR, RECORD_SEPARATOR, SEGMENT_TERMINATOR},
    subfile::Subfile,
};

const HEX_DUMP_WIDTH: usize = 16;

/// Lists the fields of every subfile, one per line.
pub fn format_subfiles(subfiles: &[Subfile]) -> String {
    let mut out = String::new();

    for subfile in subfiles {
        let fields: Vec<_> = subfile.fields().collect();
        let name_width = fields
            .iter()
            .map(|(code, _)| field_name(subfile, code.as_str()).len())
            .max()
            .unwrap_or(0);

        writeln!(out, "{} subfile ({} fields)", subfile.subfile_type(), fields.len()).ok();
        for (code, value) in fields {
            let name = field_name(subfile, code.as_str());
            writeln!(out, "  {code}  {name:<name_width$}  {value}").ok();
        }
    }

    out
}

fn field_name(subfile: &Subfile, code: &str) -> &'static str {
    match subfile {
        Subfile::Dl(_) => super::registry::get_field_definition(code)
            .map(|d| d.name)
            .unwrap_or("(unknown)"),
        Subfile::Jurisdiction(_) => "(jurisdiction)",
    }
}

pub fn describe_header(header: &Header) -> String {
    let mut out = String::new();

    let issuer = get_state_by_iin(&header.iin)
        .map(|j| format!("{}, {}", j.jurisdiction, j.country))
        .unwrap_or_else(|| "unknown issuer".to_owned());

    writeln!(out, "file type:            {:?}", header.file_type).ok();
    writeln!(out, "IIN:                  {} ({issuer})", header.iin).ok();
    writeln!(out, "AAMVA version:        {}", header.aamva_version).ok();
    writeln!(out, "jurisdiction version: {:02}", header.jurisdiction_version).ok();
    writeln!(out, "entries:              {}", header.number_of_entries).ok();
    for d in &header.designators {
        writeln!(out, "  {} at {:04}, {:04} bytes", d.subfile_type, d.offset, d.length).ok();
    }

    out
}

/// Replaces control characters with printable tags, e.g. `<LF>`.
pub fn visualize_control_characters(input: &str) -> String {
    let mut out = String::with_capacity(input.len());

    for c in input.chars() {
        match u8::try_from(c) {
            Ok(DATA_ELEMENT_SEPARATOR) => out.push_str("<LF>"),
            Ok(RECORD_SEPARATOR) => out.push_str("<RS>"),
            Ok(SEGMENT_TERMINATOR) => out.push_str("<CR>"),
            Ok(b) if b.is_ascii_control() => {
                write!(out, "<0x{b:02X}>").ok();
            }
            _ => out.push(c),
        }
    }

    out
}

/// Classic offset / hex / ASCII dump.
pub fn hex_dump(data: &[u8]) -> String {
    let mut out = String::new();

    for (i, chunk) in data.chunks(HEX_DUMP_WIDTH).enumerate() {
        let hex = chunk
            .iter()
            .map(|b| hex::encode([*b]))
            .collect::<Vec<_>>()
            .join(" ");
        let ascii: String = chunk
            .iter()
            .map(|b| if b.is_ascii_graphic() || *b == b' ' { *b as char } else { '.' })
            .collect();

        writeln!(
            out,
            "{:08x}  {hex:<width$}  |{ascii}|",
            i * HEX_DUMP_WIDTH,
            width = HEX_DUMP_WIDTH * 3 - 1
        )
        .ok();
    }

    out
}

/// SHA-256 of the sorted `code value LF` lines of a subfile, independent of
/// field order.
pub fn canonical_digest(subfile: &Subfile) -> [u8; 32] {
    let mut entries: Vec<Vec<u8>> = subfile
        .fields()
        .map(|(code, value)| {
            let mut entry = Vec::with_capacity(3 + value.len() + 1);
            entry.extend(code.as_bytes());
            entry.extend(value.as_bytes());
            entry.push(b'\n');
            entry
        })
        .collect();

    entries.sort_unstable();
    Sha256::digest(entries.concat()).into()
}

pub fn digest_hex(subfile: &Subfile) -> String {
    hex::encode(canonical_digest(subfile))
}
