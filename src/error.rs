//! Crate-wide error type
//!
//! Every failure a card operation can hit maps to exactly one variant, so
//! callers can tell a locked sector apart from a broken dump file or an
//! unplugged reader.

use thiserror::Error;

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by card operations
#[derive(Debug, Error)]
pub enum Error {
    /// The card answered a command frame with a non-success status pair.
    #[error("card returned status {sw1:02X} {sw2:02X}")]
    Transport { sw1: u8, sw2: u8 },

    /// The reader returned a payload of the wrong size for the frame.
    #[error("expected a {expected}-byte payload, reader returned {got}")]
    PayloadLength { expected: usize, got: usize },

    /// Every key candidate was tried against the sector and none unlocked it.
    #[error("no key candidate unlocked sector {sector}")]
    AuthenticationExhausted { sector: u8 },

    /// The session ATR matches none of the known card profiles.
    #[error("card ATR matches no supported profile")]
    UnsupportedCard,

    /// The profile matched but the card's type marker is not a known variant.
    #[error("card profile matched but its type marker is unknown")]
    UnknownVariant,

    /// A dump file could not be replayed onto the card.
    #[error("malformed dump file: {0}")]
    MalformedDump(String),

    /// Reader connection or transmit failure below the card protocol.
    #[error("PC/SC failure: {0}")]
    Pcsc(#[from] pcsc::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
