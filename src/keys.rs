//! Key candidate store
//!
//! The fixed, ordered list of credentials tried during sector unlock.
//! Priority is slice order; the list is never mutated at runtime. The set
//! covers factory defaults, the common NDEF keys and keys observed on
//! Estonian ISIC / transport cards.

use std::fmt;

use crate::apdu::KEY_LEN;

/// A 6-byte MIFARE Classic sector credential
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Key(pub [u8; KEY_LEN]);

impl Key {
    pub fn bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Display for Key {
    /// Uppercase space-separated hex, e.g. `FF FF FF FF FF FF`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{b:02X}")?;
        }
        Ok(())
    }
}

/// Default candidates in priority order
pub const DEFAULT_KEYS: [Key; 24] = [
    // Factory default
    Key([0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]),
    // NDEF keys
    Key([0xD3, 0xF7, 0xD3, 0xF7, 0xD3, 0xF7]),
    Key([0xA0, 0xA1, 0xA2, 0xA3, 0xA4, 0xA5]),
    Key([0x00, 0x00, 0x00, 0x00, 0x00, 0x00]),
    Key([0xB0, 0xB1, 0xB2, 0xB3, 0xB4, 0xB5]),
    Key([0x4D, 0x3A, 0x99, 0xC3, 0x51, 0xDD]),
    Key([0x1A, 0x98, 0x2C, 0x7E, 0x45, 0x9A]),
    Key([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]),
    Key([0x71, 0x4C, 0x5C, 0x88, 0x6E, 0x97]),
    Key([0x58, 0x7E, 0xE5, 0xF9, 0x35, 0x0F]),
    Key([0xA0, 0x47, 0x8C, 0xC3, 0x90, 0x91]),
    Key([0x53, 0x3C, 0xB6, 0xC7, 0x23, 0xF6]),
    Key([0x8F, 0xD0, 0xA4, 0xF2, 0x56, 0xE9]),
    Key([0xA0, 0xB0, 0xC0, 0xD0, 0xE0, 0xF0]),
    Key([0xA1, 0xB1, 0xC1, 0xD1, 0xE1, 0xF1]),
    // ISIC keys
    Key([0x68, 0x7A, 0x02, 0xEC, 0xE0, 0x8C]),
    Key([0xE9, 0xB0, 0x32, 0x80, 0x46, 0xCB]),
    Key([0x57, 0xDA, 0x46, 0xF8, 0x10, 0xEA]),
    Key([0x8C, 0x51, 0x16, 0xAE, 0x70, 0xB6]),
    Key([0xD5, 0x5D, 0x40, 0x1F, 0x9D, 0xF7]),
    Key([0x4C, 0x5B, 0x7F, 0xEF, 0x08, 0xF2]),
    Key([0x7C, 0xE0, 0x86, 0x02, 0xC8, 0x4C]),
    Key([0xD9, 0xE5, 0x76, 0x07, 0xCB, 0x4F]),
    Key([0xDC, 0xFE, 0xCB, 0x8F, 0x7F, 0xDA]),
];
