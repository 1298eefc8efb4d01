//! Sector authentication
//!
//! Drives the key search for MIFARE Classic sectors: candidates from the
//! store are tried in priority order, the first success is recorded against
//! the owning sector, exhaustion is sticky. The record lives on this value
//! for the session; nothing is global.

use std::collections::BTreeMap;

use log::{debug, info, warn};

use crate::apdu::{self, KeyType};
use crate::error::{Error, Result};
use crate::keys::{Key, DEFAULT_KEYS};
use crate::transport::Transport;

/// Classic 1K groups four blocks behind one pair of sector keys
pub const BLOCKS_PER_SECTOR: u8 = 4;

/// Outcome of the key search for one sector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectorState {
    /// No search has run for this sector yet
    Unauthenticated,
    /// This candidate unlocked the sector; reused for the whole session
    Authenticated(Key),
    /// Every candidate was tried and rejected
    Exhausted,
}

/// Per-session key search driver and authentication record
pub struct Authenticator<'a> {
    candidates: &'a [Key],
    states: BTreeMap<u8, SectorState>,
}

impl Default for Authenticator<'static> {
    fn default() -> Self {
        Self::with_candidates(&DEFAULT_KEYS)
    }
}

impl Authenticator<'static> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<'a> Authenticator<'a> {
    pub fn with_candidates(candidates: &'a [Key]) -> Self {
        Self {
            candidates,
            states: BTreeMap::new(),
        }
    }

    /// Search state of `sector`
    pub fn state(&self, sector: u8) -> SectorState {
        self.states
            .get(&sector)
            .copied()
            .unwrap_or(SectorState::Unauthenticated)
    }

    /// Sector-to-key record accumulated so far this session, in sector order.
    pub fn keys_used(&self) -> impl Iterator<Item = (u8, Key)> + '_ {
        self.states.iter().filter_map(|(&sector, state)| match state {
            SectorState::Authenticated(key) => Some((sector, *key)),
            _ => None,
        })
    }

    /// Make sure the sector owning `block` is unlocked, running the candidate
    /// search on first use.
    ///
    /// Each candidate is loaded into the reader, then one authenticate frame
    /// is issued per entry of `key_types` (reads pass key type A; writes pass
    /// A then B so trailer-protected blocks accept the write). The first
    /// success ends the search and its candidate is recorded for the sector,
    /// never to be overwritten this session. A card-level failure advances to
    /// the next candidate; reader-level failures propagate.
    pub fn ensure<T: Transport>(
        &mut self,
        transport: &mut T,
        block: u8,
        key_types: &[KeyType],
    ) -> Result<Key> {
        let sector = block / BLOCKS_PER_SECTOR;
        match self.state(sector) {
            SectorState::Authenticated(key) => return Ok(key),
            SectorState::Exhausted => return Err(Error::AuthenticationExhausted { sector }),
            SectorState::Unauthenticated => {}
        }

        for (rank, key) in self.candidates.iter().enumerate() {
            match transport.exchange(&apdu::load_key(key.bytes())) {
                Ok(_) => {}
                Err(Error::Transport { .. }) => {
                    debug!("sector {sector}: reader rejected candidate {rank} at load");
                    continue;
                }
                Err(e) => return Err(e),
            }

            for &key_type in key_types {
                match transport.exchange(&apdu::authenticate(block, key_type)) {
                    Ok(_) => {
                        info!("sector {sector} unlocked with candidate {rank} ({key})");
                        self.states.insert(sector, SectorState::Authenticated(*key));
                        return Ok(*key);
                    }
                    Err(Error::Transport { .. }) => {
                        debug!("sector {sector}: candidate {rank} rejected (type {key_type:?})");
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        warn!("sector {sector}: all {} candidates rejected", self.candidates.len());
        self.states.insert(sector, SectorState::Exhausted);
        Err(Error::AuthenticationExhausted { sector })
    }
}
