//! Card session: the single entry point for read, dump and clone
//!
//! One transport, one dispatched profile, one authenticator; every operation
//! the tool exposes runs through here instead of re-driving the reader from
//! scratch. Strictly synchronous, one operation at a time.

use std::collections::BTreeMap;
use std::path::PathBuf;

use log::{debug, info, warn};

use crate::apdu::{self, KeyType, BLOCK_LEN};
use crate::auth::Authenticator;
use crate::card::fields;
use crate::card::profile::{self, CardKind, Profile};
use crate::dump;
use crate::error::{Error, Result};
use crate::keys::Key;
use crate::transport::Transport;

/// What to do with the card on the reader
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Scan every unit and extract the card report
    Read,
    /// Persist every unit to `<name>.txt`
    Dump(String),
    /// Replay `<name>.txt` onto the card
    Clone(String),
}

/// One scanned unit: its address and payload, `None` once the owning
/// sector's key search is exhausted
pub type ScanRow = (u8, Option<[u8; BLOCK_LEN]>);

/// Result of running one [`Operation`]
#[derive(Debug)]
pub enum Outcome {
    Read {
        rows: Vec<ScanRow>,
        uid: Option<Vec<u8>>,
        /// Deployment and extracted fields, or why extraction stopped
        fields: std::result::Result<(CardKind, Vec<(&'static str, String)>), Error>,
        keys_used: Vec<(u8, Key)>,
    },
    /// Path of the created dump file
    Dumped(PathBuf),
    /// Number of units written
    Cloned(usize),
}

/// An open session against one card
pub struct CardSession<T: Transport> {
    transport: T,
    profile: Profile,
    auth: Authenticator<'static>,
}

impl<T: Transport> CardSession<T> {
    /// Dispatch the card behind `transport` to a supported profile.
    pub fn open(transport: T) -> Result<Self> {
        let profile = Profile::from_atr(transport.atr())?;
        info!("card dispatched as {}", profile.name());
        Ok(Self {
            transport,
            profile,
            auth: Authenticator::new(),
        })
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    pub fn atr(&self) -> &[u8] {
        self.transport.atr()
    }

    /// Card UID via the reader's get-data frame
    pub fn uid(&mut self) -> Result<Vec<u8>> {
        self.transport.exchange(&apdu::read_uid())
    }

    /// Sector-to-key record accumulated this session, in sector order
    pub fn keys_used(&self) -> Vec<(u8, Key)> {
        self.auth.keys_used().collect()
    }

    /// Read one unit, unlocking its sector first when the profile demands it.
    pub fn read_unit(&mut self, addr: u8) -> Result<[u8; BLOCK_LEN]> {
        if self.profile.requires_auth() {
            self.auth.ensure(&mut self.transport, addr, &[KeyType::A])?;
        }
        let payload = self.transport.exchange(&apdu::read_block(addr))?;
        let got = payload.len();
        payload
            .try_into()
            .map_err(|_| Error::PayloadLength {
                expected: BLOCK_LEN,
                got,
            })
    }

    /// Write one unit. For authenticated profiles the sector is unlocked with
    /// the dual key-type search (A, then B per candidate) so trailer-protected
    /// blocks accept the write.
    pub fn write_unit(&mut self, addr: u8, payload: &[u8; BLOCK_LEN]) -> Result<()> {
        if self.profile.requires_auth() {
            self.auth
                .ensure(&mut self.transport, addr, &[KeyType::A, KeyType::B])?;
        }
        self.transport.exchange(&apdu::write_block(addr, payload))?;
        Ok(())
    }

    /// Read every addressable unit in ascending order. Sectors whose key
    /// search exhausts produce `None` rows instead of aborting the scan; any
    /// other failure aborts.
    pub fn scan(&mut self) -> Result<Vec<ScanRow>> {
        let mut rows = Vec::with_capacity(self.profile.unit_count());
        for addr in self.profile.addresses() {
            match self.read_unit(addr) {
                Ok(payload) => rows.push((addr, Some(payload))),
                Err(Error::AuthenticationExhausted { sector }) => {
                    warn!("sector {sector} stays locked, skipping unit {addr}");
                    rows.push((addr, None));
                }
                Err(e) => return Err(e),
            }
        }
        Ok(rows)
    }

    /// Disambiguate the concrete deployment behind the dispatched profile.
    pub fn kind(&mut self) -> Result<CardKind> {
        match self.profile {
            Profile::UltralightC => Ok(CardKind::TartuBus),
            Profile::Classic1k => {
                let marker = self.read_unit(profile::classic_marker_block())?;
                profile::classic_kind(&fields::sanitize(&marker))
            }
        }
    }

    /// Run the deployment's field map: read each referenced unit once, then
    /// extract `(name, value)` pairs in rule order.
    pub fn extract_fields(&mut self, kind: CardKind) -> Result<Vec<(&'static str, String)>> {
        let rules = kind.field_map();
        let mut units = BTreeMap::new();
        for addr in fields::referenced_units(rules) {
            let payload = self.read_unit(addr)?;
            units.insert(addr, fields::sanitize(&payload));
        }
        Ok(fields::extract(rules, &units))
    }

    /// Dump every unit to `<name>.txt`.
    ///
    /// Any unreadable unit aborts the dump before the file is written, so a
    /// persisted dump always lines up positionally with the profile's address
    /// range and stays safe to clone.
    pub fn dump(&mut self, name: &str) -> Result<PathBuf> {
        let mut lines = Vec::with_capacity(self.profile.unit_count());
        for addr in self.profile.addresses() {
            let payload = self.read_unit(addr)?;
            lines.push(dump::encode_line(&payload));
        }
        dump::write_dump(name, &lines)
    }

    /// Replay `<name>.txt` onto the card.
    ///
    /// The file must decode to exactly the profile's unit count before any
    /// write frame is issued. Non-writable units are skipped; the UID is
    /// never written. Not atomic: a failure partway leaves a mixed card.
    pub fn clone_from(&mut self, name: &str) -> Result<usize> {
        let payloads = dump::read_dump(name, self.profile.unit_count())?;
        let mut written = 0;
        for (addr, payload) in self.profile.addresses().zip(payloads.iter()) {
            if !self.profile.writable(addr) {
                debug!("unit {addr} is not writable, skipped");
                continue;
            }
            self.write_unit(addr, payload)?;
            written += 1;
        }
        info!("clone wrote {written} units");
        Ok(written)
    }

    /// Execute one tagged operation.
    pub fn run(&mut self, operation: &Operation) -> Result<Outcome> {
        match operation {
            Operation::Read => {
                let rows = self.scan()?;
                let uid = self.uid().ok();
                let fields = match self.kind() {
                    Ok(kind) => Ok((kind, self.extract_fields(kind)?)),
                    // Raw units above were already scanned; an unknown layout
                    // only stops the field report.
                    Err(e @ (Error::UnknownVariant | Error::UnsupportedCard)) => Err(e),
                    Err(e) => return Err(e),
                };
                Ok(Outcome::Read {
                    rows,
                    uid,
                    fields,
                    keys_used: self.keys_used(),
                })
            }
            Operation::Dump(name) => Ok(Outcome::Dumped(self.dump(name)?)),
            Operation::Clone(name) => Ok(Outcome::Cloned(self.clone_from(name)?)),
        }
    }
}
