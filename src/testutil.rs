//! In-memory simulated card used by the unit tests
//!
//! Behaves like a Classic 1K or Ultralight C behind an ACR-compatible
//! reader: it parses the same command frames the real transport sends and
//! enforces the load-then-authenticate-then-read ordering. Every frame is
//! logged so tests can count attempts.

use std::collections::{BTreeMap, BTreeSet};

use crate::apdu::{BLOCK_LEN, KEY_LEN};
use crate::auth::BLOCKS_PER_SECTOR;
use crate::card::profile::{CLASSIC_1K_ATR, ULTRALIGHT_C_ATR};
use crate::error::{Error, Result};
use crate::keys::Key;
use crate::transport::Transport;

/// Status pair a real reader returns on a failed MIFARE operation
const SW_FAILED: (u8, u8) = (0x63, 0x00);

pub struct SimCard {
    atr: Vec<u8>,
    uid: Vec<u8>,
    blocks: BTreeMap<u8, [u8; BLOCK_LEN]>,
    /// Accepted key A per sector; empty map means no authentication at all
    keys_a: BTreeMap<u8, Key>,
    /// Accepted key B per sector
    keys_b: BTreeMap<u8, Key>,
    auth_required: bool,
    loaded: Option<[u8; KEY_LEN]>,
    authed: BTreeSet<u8>,
    /// Every frame received, oldest first
    pub log: Vec<Vec<u8>>,
}

impl SimCard {
    /// A card with the given ATR and nothing else; only useful for dispatch
    /// tests.
    pub fn with_atr(atr: Vec<u8>) -> Self {
        Self {
            atr,
            uid: vec![0x04, 0xA2, 0x2F, 0x31],
            blocks: BTreeMap::new(),
            keys_a: BTreeMap::new(),
            keys_b: BTreeMap::new(),
            auth_required: false,
            loaded: None,
            authed: BTreeSet::new(),
            log: Vec::new(),
        }
    }

    /// Classic 1K with 64 zeroed blocks, every sector accepting `key` as
    /// key A.
    pub fn classic_with_key(key: Key) -> Self {
        let mut card = Self::with_atr(CLASSIC_1K_ATR.to_vec());
        card.auth_required = true;
        for addr in 0..64u8 {
            card.blocks.insert(addr, [0u8; BLOCK_LEN]);
        }
        for sector in 0..16u8 {
            card.keys_a.insert(sector, key);
        }
        card
    }

    /// Classic 1K whose sectors accept `key` as key B only
    pub fn classic_with_key_b(key: Key) -> Self {
        let mut card = Self::classic_with_key(Key([0xEE; KEY_LEN]));
        card.keys_a.clear();
        for sector in 0..16u8 {
            card.keys_b.insert(sector, key);
        }
        card
    }

    /// Ultralight C with the nine zeroed user-data reads and no
    /// authentication
    pub fn ultralight() -> Self {
        let mut card = Self::with_atr(ULTRALIGHT_C_ATR.to_vec());
        for i in 0..9u8 {
            card.blocks.insert(4 + i * 4, [0u8; BLOCK_LEN]);
        }
        card
    }

    pub fn set_block(&mut self, addr: u8, payload: [u8; BLOCK_LEN]) {
        self.blocks.insert(addr, payload);
    }

    pub fn block(&self, addr: u8) -> [u8; BLOCK_LEN] {
        self.blocks[&addr]
    }

    /// Make `sector` reject every credential
    pub fn lock_sector(&mut self, sector: u8) {
        self.keys_a.remove(&sector);
        self.keys_b.remove(&sector);
    }

    /// Authenticate frames received so far
    pub fn auth_attempts(&self) -> usize {
        self.log.iter().filter(|f| f.starts_with(&[0xFF, 0x86])).count()
    }

    /// Write frames received so far
    pub fn writes(&self) -> usize {
        self.log.iter().filter(|f| f.starts_with(&[0xFF, 0xD6])).count()
    }

    fn fail() -> Error {
        Error::Transport {
            sw1: SW_FAILED.0,
            sw2: SW_FAILED.1,
        }
    }

    fn handle(&mut self, frame: &[u8]) -> Result<Vec<u8>> {
        match frame {
            // Load credential
            [0xFF, 0x82, 0x00, 0x00, 0x06, key @ ..] if key.len() == KEY_LEN => {
                let mut loaded = [0u8; KEY_LEN];
                loaded.copy_from_slice(key);
                self.loaded = Some(loaded);
                Ok(Vec::new())
            }
            // Authenticate unit
            [0xFF, 0x86, 0x00, 0x00, 0x05, 0x01, 0x00, addr, key_type, 0x00] => {
                if !self.auth_required {
                    return Err(Self::fail());
                }
                let sector = addr / BLOCKS_PER_SECTOR;
                let expected = match key_type {
                    0x60 => self.keys_a.get(&sector),
                    0x61 => self.keys_b.get(&sector),
                    _ => None,
                };
                match (expected, self.loaded) {
                    (Some(key), Some(loaded)) if *key.bytes() == loaded => {
                        self.authed.insert(sector);
                        Ok(Vec::new())
                    }
                    _ => Err(Self::fail()),
                }
            }
            // Read unit
            [0xFF, 0xB0, 0x00, addr, 0x10] => {
                if self.auth_required && !self.authed.contains(&(addr / BLOCKS_PER_SECTOR)) {
                    return Err(Self::fail());
                }
                self.blocks
                    .get(addr)
                    .map(|payload| payload.to_vec())
                    .ok_or_else(Self::fail)
            }
            // Write unit
            [0xFF, 0xD6, 0x00, addr, 0x10, payload @ ..] if payload.len() == BLOCK_LEN => {
                if self.auth_required && !self.authed.contains(&(addr / BLOCKS_PER_SECTOR)) {
                    return Err(Self::fail());
                }
                if !self.blocks.contains_key(addr) {
                    return Err(Self::fail());
                }
                let mut stored = [0u8; BLOCK_LEN];
                stored.copy_from_slice(payload);
                self.blocks.insert(*addr, stored);
                Ok(Vec::new())
            }
            // Card UID
            [0xFF, 0xCA, 0x00, 0x00, 0x00] => Ok(self.uid.clone()),
            _ => Err(Self::fail()),
        }
    }
}

impl Transport for SimCard {
    fn exchange(&mut self, frame: &[u8]) -> Result<Vec<u8>> {
        self.log.push(frame.to_vec());
        self.handle(frame)
    }

    fn atr(&self) -> &[u8] {
        &self.atr
    }
}
