//! Reader command frames and status handling
//!
//! Contactless readers in the ACR family expose MIFARE access through a small
//! set of pseudo-APDUs (CLA `FF`). This module builds those frames bit-exact
//! and strips the trailing two-byte status from responses.
//!
//! # Example
//! ```
//! use kaardiviisard::apdu;
//!
//! let frame = apdu::read_block(0x04);
//! assert_eq!(frame, vec![0xFF, 0xB0, 0x00, 0x04, 0x10]);
//! ```

use crate::error::{Error, Result};

/// Fixed payload size of one addressable unit (block or page)
pub const BLOCK_LEN: usize = 16;

/// Length of a MIFARE Classic sector credential
pub const KEY_LEN: usize = 6;

/// MIFARE Classic key slot selector for the authenticate frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    A,
    B,
}

impl KeyType {
    /// Key type byte as it appears in the authenticate frame
    pub fn code(self) -> u8 {
        match self {
            KeyType::A => 0x60,
            KeyType::B => 0x61,
        }
    }
}

/// Load a credential into the reader's volatile key slot: `FF 82 00 00 06 <key>`
pub fn load_key(key: &[u8; KEY_LEN]) -> Vec<u8> {
    let mut frame = vec![0xFF, 0x82, 0x00, 0x00, 0x06];
    frame.extend_from_slice(key);
    frame
}

/// Authenticate one unit with the loaded credential:
/// `FF 86 00 00 05 01 00 <addr> <keytype> 00`
pub fn authenticate(addr: u8, key_type: KeyType) -> Vec<u8> {
    vec![
        0xFF,
        0x86,
        0x00,
        0x00,
        0x05,
        0x01,
        0x00,
        addr,
        key_type.code(),
        0x00,
    ]
}

/// Read one 16-byte unit: `FF B0 00 <addr> 10`
pub fn read_block(addr: u8) -> Vec<u8> {
    vec![0xFF, 0xB0, 0x00, addr, 0x10]
}

/// Write one 16-byte unit: `FF D6 00 <addr> 10 <payload>`
pub fn write_block(addr: u8, payload: &[u8; BLOCK_LEN]) -> Vec<u8> {
    let mut frame = vec![0xFF, 0xD6, 0x00, addr, 0x10];
    frame.extend_from_slice(payload);
    frame
}

/// Read the card UID: `FF CA 00 00 00`
pub fn read_uid() -> Vec<u8> {
    vec![0xFF, 0xCA, 0x00, 0x00, 0x00]
}

/// Split a raw response into its payload, requiring the success pair `90 00`.
///
/// Any other status pair, or a response too short to carry one, is a
/// transport failure.
pub fn strip_status(raw: &[u8]) -> Result<Vec<u8>> {
    match raw {
        [payload @ .., 0x90, 0x00] => Ok(payload.to_vec()),
        [.., sw1, sw2] => Err(Error::Transport {
            sw1: *sw1,
            sw2: *sw2,
        }),
        _ => Err(Error::Transport {
            sw1: 0x00,
            sw2: 0x00,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_key_frame() {
        let key = [0xFF; 6];
        assert_eq!(
            load_key(&key),
            vec![0xFF, 0x82, 0x00, 0x00, 0x06, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]
        );
    }

    #[test]
    fn test_authenticate_frame_key_types() {
        assert_eq!(
            authenticate(0x08, KeyType::A),
            vec![0xFF, 0x86, 0x00, 0x00, 0x05, 0x01, 0x00, 0x08, 0x60, 0x00]
        );
        assert_eq!(
            authenticate(0x08, KeyType::B),
            vec![0xFF, 0x86, 0x00, 0x00, 0x05, 0x01, 0x00, 0x08, 0x61, 0x00]
        );
    }

    #[test]
    fn test_write_frame_carries_payload() {
        let payload = [0xAB; BLOCK_LEN];
        let frame = write_block(0x24, &payload);
        assert_eq!(&frame[..5], &[0xFF, 0xD6, 0x00, 0x24, 0x10]);
        assert_eq!(&frame[5..], &payload);
    }

    #[test]
    fn test_read_uid_frame() {
        assert_eq!(read_uid(), vec![0xFF, 0xCA, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_strip_status_success() {
        let raw = [0xDE, 0xAD, 0x90, 0x00];
        assert_eq!(strip_status(&raw).unwrap(), vec![0xDE, 0xAD]);
    }

    #[test]
    fn test_strip_status_empty_payload() {
        assert_eq!(strip_status(&[0x90, 0x00]).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_strip_status_failure() {
        let err = strip_status(&[0x63, 0x00]).unwrap_err();
        assert!(matches!(err, Error::Transport { sw1: 0x63, sw2: 0x00 }));
    }

    #[test]
    fn test_strip_status_truncated() {
        assert!(matches!(
            strip_status(&[0x90]),
            Err(Error::Transport { sw1: 0x00, sw2: 0x00 })
        ));
    }
}
