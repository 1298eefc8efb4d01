//! Card profiles and field extraction
//!
//! `profile` maps a session ATR to one of the two supported card profiles and
//! tells their deployments apart; `fields` applies a profile's declarative
//! extraction rules to decoded unit contents.

pub mod fields;
pub mod profile;

pub use fields::{extract, sanitize, FieldRule, Segment, Span};
pub use profile::{CardKind, Profile};
