//! Reader transport
//!
//! One blocking `exchange` per command frame, plus the session ATR captured
//! at connect time. The real backend rides the PC/SC daemon; tests swap in a
//! simulated card.

use std::ffi::CStr;

use log::{debug, info};
use pcsc::{Attribute, Card, Context, Protocols, Scope, ShareMode, MAX_BUFFER_SIZE};

use crate::apdu;
use crate::error::Result;

/// Synchronous command/response channel to one card
pub trait Transport {
    /// Send one command frame. Returns the payload when the card answers with
    /// the success pair `90 00`, otherwise `Error::Transport`.
    fn exchange(&mut self, frame: &[u8]) -> Result<Vec<u8>>;

    /// The session's ATR fingerprint, immutable for the session lifetime.
    fn atr(&self) -> &[u8];
}

/// PC/SC-backed transport over the first available reader
pub struct PcscTransport {
    card: Card,
    atr: Vec<u8>,
}

impl PcscTransport {
    /// Connect to the first reader the PC/SC daemon reports and capture the
    /// inserted card's ATR.
    pub fn connect() -> Result<Self> {
        let ctx = Context::establish(Scope::User)?;

        let mut readers_buf = [0u8; 2048];
        let mut readers = ctx.list_readers(&mut readers_buf)?;
        let reader: &CStr = readers.next().ok_or(pcsc::Error::ReaderUnavailable)?;
        info!("connecting to reader {}", reader.to_string_lossy());

        let card = ctx.connect(reader, ShareMode::Shared, Protocols::ANY)?;

        let mut atr_buf = [0u8; pcsc::MAX_ATR_SIZE];
        let atr = card.get_attribute(Attribute::AtrString, &mut atr_buf)?.to_vec();
        debug!("session ATR: {:02X?}", atr);

        Ok(Self { card, atr })
    }
}

impl Transport for PcscTransport {
    fn exchange(&mut self, frame: &[u8]) -> Result<Vec<u8>> {
        debug!("> {:02X?}", frame);
        let mut rx_buf = [0u8; MAX_BUFFER_SIZE];
        let raw = self.card.transmit(frame, &mut rx_buf)?;
        debug!("< {:02X?}", raw);
        apdu::strip_status(raw)
    }

    fn atr(&self) -> &[u8] {
        &self.atr
    }
}
