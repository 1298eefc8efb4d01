//! Dump file codec
//!
//! A dump is plain text: one line per addressable unit in ascending address
//! order, each line the unit's 16 bytes as uppercase space-separated hex
//! pairs, lines joined by single newlines with none after the final line.
//! The codec appends a fixed `.txt` extension to the caller-supplied name.

use std::fs;
use std::path::PathBuf;

use log::info;

use crate::apdu::BLOCK_LEN;
use crate::error::{Error, Result};

/// Format a payload as uppercase space-separated hex pairs
pub fn encode_line(payload: &[u8]) -> String {
    payload
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse one dump line back into a unit payload
pub fn decode_line(line: &str) -> Result<[u8; BLOCK_LEN]> {
    let compact: String = line.split_whitespace().collect();
    let bytes = hex::decode(&compact)
        .map_err(|_| Error::MalformedDump(format!("undecodable hex in line {line:?}")))?;
    bytes.try_into().map_err(|bytes: Vec<u8>| {
        Error::MalformedDump(format!(
            "line holds {} bytes, units are {BLOCK_LEN} bytes",
            bytes.len()
        ))
    })
}

/// The on-disk path for a caller-supplied dump name
pub fn dump_path(name: &str) -> PathBuf {
    PathBuf::from(format!("{name}.txt"))
}

/// Persist dump lines, newline-joined with no trailing newline
pub fn write_dump(name: &str, lines: &[String]) -> Result<PathBuf> {
    let path = dump_path(name);
    fs::write(&path, lines.join("\n"))?;
    info!("wrote {} dump lines to {}", lines.len(), path.display());
    Ok(path)
}

/// Load a dump file and decode it, requiring exactly `expected` lines.
///
/// Validation is complete before the caller issues any write frame: a short,
/// long or undecodable file never touches the card.
pub fn read_dump(name: &str, expected: usize) -> Result<Vec<[u8; BLOCK_LEN]>> {
    let path = dump_path(name);
    let text = fs::read_to_string(&path)?;
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() != expected {
        return Err(Error::MalformedDump(format!(
            "{} holds {} lines, profile expects {expected}",
            path.display(),
            lines.len()
        )));
    }
    lines.iter().map(|line| decode_line(line)).collect()
}
