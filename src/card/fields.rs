//! Declarative field extraction
//!
//! Each card deployment carries an ordered list of rules; a rule names an
//! output field and concatenates spans sliced out of the decoded ASCII
//! representation of one or more units. Extraction is pure reformatting, no
//! plausibility checks.
//!
//! Decoding follows a sanitize-then-slice contract: bytes outside printable
//! ASCII become [`PLACEHOLDER`] before slicing, so fixed offsets are always
//! defined over a full-length string.

use std::collections::{BTreeMap, BTreeSet};

/// Substituted for every byte outside the printable ASCII range
pub const PLACEHOLDER: char = '.';

/// Decode a unit payload to ASCII with unprintable bytes substituted
pub fn sanitize(payload: &[u8]) -> String {
    payload
        .iter()
        .map(|&b| {
            if (0x20..=0x7E).contains(&b) {
                b as char
            } else {
                PLACEHOLDER
            }
        })
        .collect()
}

/// How much of a decoded unit a segment keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span {
    /// Fixed character range, clamped to the decoded length
    Range(usize, usize),
    /// Everything before the first placeholder character
    UntilPlaceholder,
}

impl Span {
    fn apply(self, decoded: &str) -> &str {
        match self {
            Span::Range(start, end) => {
                let end = end.min(decoded.len());
                let start = start.min(end);
                &decoded[start..end]
            }
            Span::UntilPlaceholder => decoded.split(PLACEHOLDER).next().unwrap_or(""),
        }
    }
}

/// One source slice of a field value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// Unit address the span is sliced from
    pub addr: u8,
    pub span: Span,
}

/// One extraction rule: segments concatenated in order under one field name
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub name: &'static str,
    /// Inserted between segment values
    pub separator: &'static str,
    pub segments: &'static [Segment],
}

/// Every unit address referenced by `rules`, each listed once
pub fn referenced_units(rules: &[FieldRule]) -> BTreeSet<u8> {
    rules
        .iter()
        .flat_map(|rule| rule.segments.iter().map(|seg| seg.addr))
        .collect()
}

/// Apply `rules` to the sanitized unit decodings, in rule order.
///
/// Units missing from the map contribute empty segments rather than failing;
/// the session reads every referenced unit up front, so that only happens on
/// unreadable sectors.
pub fn extract(
    rules: &[FieldRule],
    units: &BTreeMap<u8, String>,
) -> Vec<(&'static str, String)> {
    rules
        .iter()
        .map(|rule| {
            let parts: Vec<&str> = rule
                .segments
                .iter()
                .map(|seg| {
                    units
                        .get(&seg.addr)
                        .map(|decoded| seg.span.apply(decoded))
                        .unwrap_or("")
                })
                .collect();
            (rule.name, parts.join(rule.separator))
        })
        .collect()
}

const fn seg(addr: u8, span: Span) -> Segment {
    Segment { addr, span }
}

/// ISIC student card layout (Classic 1K)
pub static ISIC_FIELDS: &[FieldRule] = &[
    FieldRule {
        name: "External type record",
        separator: "",
        segments: &[seg(4, Span::Range(7, 16)), seg(5, Span::Range(0, 8))],
    },
    FieldRule {
        name: "Card number",
        separator: "",
        segments: &[seg(8, Span::Range(15, 16)), seg(9, Span::Range(0, 10))],
    },
    FieldRule {
        name: "Card PAN",
        separator: "",
        segments: &[seg(8, Span::Range(7, 16)), seg(9, Span::Range(0, 10))],
    },
    FieldRule {
        name: "Cert",
        separator: "",
        segments: &[
            seg(22, Span::Range(3, 16)),
            seg(24, Span::Range(0, 16)),
            seg(25, Span::Range(0, 8)),
        ],
    },
    FieldRule {
        name: "ISIC number",
        separator: "",
        segments: &[seg(28, Span::Range(0, 14))],
    },
    FieldRule {
        name: "User and DoB",
        separator: " ",
        segments: &[
            seg(32, Span::UntilPlaceholder),
            seg(33, Span::UntilPlaceholder),
            seg(34, Span::UntilPlaceholder),
        ],
    },
    FieldRule {
        name: "User ID",
        separator: "",
        segments: &[seg(36, Span::Range(0, 11))],
    },
    FieldRule {
        name: "School",
        separator: "",
        segments: &[seg(37, Span::Range(0, 13))],
    },
    FieldRule {
        name: "Expiration date",
        separator: "",
        segments: &[seg(40, Span::Range(0, 10))],
    },
];

/// Tallinn public transport card layout (Classic 1K)
pub static TALLINN_FIELDS: &[FieldRule] = &[
    FieldRule {
        name: "External type record",
        separator: "",
        segments: &[seg(4, Span::Range(7, 16)), seg(5, Span::Range(0, 8))],
    },
    FieldRule {
        name: "Card number",
        separator: "",
        segments: &[seg(8, Span::Range(15, 16)), seg(9, Span::Range(0, 10))],
    },
    FieldRule {
        name: "Card PAN",
        separator: "",
        segments: &[seg(8, Span::Range(7, 16)), seg(9, Span::Range(0, 10))],
    },
    FieldRule {
        name: "Cert",
        separator: "",
        segments: &[
            seg(22, Span::Range(0, 16)),
            seg(24, Span::Range(0, 16)),
            seg(25, Span::Range(0, 5)),
        ],
    },
];

/// Tartu bus card layout (Ultralight C user pages)
pub static TARTU_FIELDS: &[FieldRule] = &[
    FieldRule {
        name: "External type record",
        separator: "",
        segments: &[seg(4, Span::Range(5, 16)), seg(8, Span::Range(0, 6))],
    },
    // The last character of page 16 is trimmed from both fields.
    FieldRule {
        name: "PAN",
        separator: "",
        segments: &[seg(12, Span::Range(11, 16)), seg(16, Span::Range(0, 14))],
    },
    FieldRule {
        name: "Card Number",
        separator: "",
        segments: &[seg(16, Span::Range(3, 14))],
    },
];
