//! Card profiles and ATR dispatch
//!
//! Exactly two card types are supported, identified by byte-for-byte ATR
//! match. A profile carries everything an operation needs: the addressing
//! range, whether units sit behind sector authentication, which units a
//! clone may write, and the field map of the concrete deployment.

use crate::card::fields::{FieldRule, ISIC_FIELDS, TALLINN_FIELDS, TARTU_FIELDS};
use crate::error::{Error, Result};

/// ATR of a MIFARE Classic 1K behind an ACR-compatible reader
pub const CLASSIC_1K_ATR: [u8; 20] = [
    0x3B, 0x8F, 0x80, 0x01, 0x80, 0x4F, 0x0C, 0xA0, 0x00, 0x00, 0x03, 0x06, 0x03, 0x00, 0x01,
    0x00, 0x00, 0x00, 0x00, 0x6A,
];

/// ATR of a MIFARE Ultralight C behind an ACR-compatible reader
pub const ULTRALIGHT_C_ATR: [u8; 20] = [
    0x3B, 0x8F, 0x80, 0x01, 0x80, 0x4F, 0x0C, 0xA0, 0x00, 0x00, 0x03, 0x06, 0x03, 0x00, 0x3A,
    0x00, 0x00, 0x00, 0x00, 0x51,
];

/// Unit address of the type marker telling Classic 1K deployments apart
const CLASSIC_MARKER_BLOCK: u8 = 8;

/// The two supported card profiles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// 64 blocks in 16 key-protected sectors
    Classic1k,
    /// 9 free-running user data pages, read 16 bytes at a time
    UltralightC,
}

impl Profile {
    /// Exact-match ATR dispatch; anything else is unsupported.
    pub fn from_atr(atr: &[u8]) -> Result<Self> {
        if atr == CLASSIC_1K_ATR {
            Ok(Profile::Classic1k)
        } else if atr == ULTRALIGHT_C_ATR {
            Ok(Profile::UltralightC)
        } else {
            Err(Error::UnsupportedCard)
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Profile::Classic1k => "MIFARE Classic 1K",
            Profile::UltralightC => "MIFARE Ultralight C",
        }
    }

    /// What one addressable unit is called on this card
    pub fn unit_label(self) -> &'static str {
        match self {
            Profile::Classic1k => "Block",
            Profile::UltralightC => "Page",
        }
    }

    /// First addressable unit
    pub fn start(self) -> u8 {
        match self {
            Profile::Classic1k => 0,
            Profile::UltralightC => 4,
        }
    }

    /// Distance between consecutive unit addresses
    pub fn stride(self) -> u8 {
        match self {
            Profile::Classic1k => 1,
            // A 16-byte read covers four 4-byte pages.
            Profile::UltralightC => 4,
        }
    }

    /// Number of addressable units
    pub fn unit_count(self) -> usize {
        match self {
            Profile::Classic1k => 64,
            Profile::UltralightC => 9,
        }
    }

    /// Whether units sit behind sector authentication
    pub fn requires_auth(self) -> bool {
        matches!(self, Profile::Classic1k)
    }

    /// Ascending unit addresses covered by dump, clone and the full scan
    pub fn addresses(self) -> impl Iterator<Item = u8> {
        let start = self.start();
        let stride = self.stride();
        (0..self.unit_count() as u8).map(move |i| start + i * stride)
    }

    /// Whether a clone may write this unit. Classic blocks 0-3 hold the
    /// manufacturer data and sector 0 trailer and stay untouched; the UID is
    /// never written either way.
    pub fn writable(self, addr: u8) -> bool {
        match self {
            Profile::Classic1k => addr >= 4,
            Profile::UltralightC => true,
        }
    }
}

/// Concrete card deployment after sub-variant disambiguation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardKind {
    /// ISIC student identity card on Classic 1K
    Isic,
    /// Tallinn public transport card on Classic 1K
    TallinnTransport,
    /// Tartu bus card on Ultralight C
    TartuBus,
}

impl CardKind {
    pub fn label(self) -> &'static str {
        match self {
            CardKind::Isic => "ISIC card",
            CardKind::TallinnTransport => "Tallinn public transport card",
            CardKind::TartuBus => "Tartu bus card",
        }
    }

    /// Extraction rules for this deployment, in output order
    pub fn field_map(self) -> &'static [FieldRule] {
        match self {
            CardKind::Isic => ISIC_FIELDS,
            CardKind::TallinnTransport => TALLINN_FIELDS,
            CardKind::TartuBus => TARTU_FIELDS,
        }
    }
}

/// Unit address whose decoded contents disambiguate Classic 1K deployments
pub fn classic_marker_block() -> u8 {
    CLASSIC_MARKER_BLOCK
}

/// Tell the two Classic 1K deployments apart from the sanitized decoding of
/// the marker block: `'8'` in the final position marks an ISIC card, `'9'` at
/// offset 15 marks a Tallinn transport card.
pub fn classic_kind(marker: &str) -> Result<CardKind> {
    if marker.ends_with('8') {
        return Ok(CardKind::Isic);
    }
    if marker.as_bytes().get(15) == Some(&b'9') {
        return Ok(CardKind::TallinnTransport);
    }
    Err(Error::UnknownVariant)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_known_fingerprints() {
        assert_eq!(Profile::from_atr(&CLASSIC_1K_ATR).unwrap(), Profile::Classic1k);
        assert_eq!(
            Profile::from_atr(&ULTRALIGHT_C_ATR).unwrap(),
            Profile::UltralightC
        );
    }

    #[test]
    fn test_dispatch_rejects_other_atrs() {
        // A 20-byte value differing in a single byte must not match.
        let mut atr = CLASSIC_1K_ATR;
        atr[19] ^= 0x01;
        assert!(matches!(
            Profile::from_atr(&atr),
            Err(Error::UnsupportedCard)
        ));
        assert!(matches!(Profile::from_atr(&[]), Err(Error::UnsupportedCard)));
    }

    #[test]
    fn test_classic_addressing() {
        let addrs: Vec<u8> = Profile::Classic1k.addresses().collect();
        assert_eq!(addrs.len(), 64);
        assert_eq!(addrs[0], 0);
        assert_eq!(addrs[63], 63);
    }

    #[test]
    fn test_ultralight_addressing() {
        let addrs: Vec<u8> = Profile::UltralightC.addresses().collect();
        assert_eq!(addrs, vec![4, 8, 12, 16, 20, 24, 28, 32, 36]);
    }

    #[test]
    fn test_writable_units() {
        assert!(!Profile::Classic1k.writable(0));
        assert!(!Profile::Classic1k.writable(3));
        assert!(Profile::Classic1k.writable(4));
        assert!(Profile::UltralightC.writable(4));
    }

    #[test]
    fn test_classic_kind_markers() {
        assert_eq!(
            classic_kind("PAN....554940..8").unwrap(),
            CardKind::Isic
        );
        assert_eq!(
            classic_kind("PAN....554940..9").unwrap(),
            CardKind::TallinnTransport
        );
        assert!(matches!(
            classic_kind("PAN....554940..7"),
            Err(Error::UnknownVariant)
        ));
        assert!(matches!(classic_kind(""), Err(Error::UnknownVariant)));
    }
}
