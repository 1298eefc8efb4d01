//! kaardiviisard - MIFARE key recovery, extraction and cloning over PC/SC
//!
//! Talks to contactless memory cards through an ACR-compatible reader:
//! brute-forces MIFARE Classic sector keys from a fixed candidate list,
//! extracts the known Estonian card layouts (ISIC, Tallinn and Tartu
//! transport cards), and dumps or clones raw card contents through a
//! line-oriented dump file.
//!
//! The crate is strictly synchronous: one reader, one card, one operation at
//! a time. [`session::CardSession`] is the single entry point; the
//! [`transport::Transport`] trait is the seam between the PC/SC backend and
//! the test simulator.

pub mod apdu;
pub mod auth;
pub mod card;
pub mod dump;
pub mod error;
pub mod keys;
pub mod session;
pub mod transport;

pub use error::{Error, Result};
pub use session::{CardSession, Operation, Outcome};
pub use transport::{PcscTransport, Transport};

#[cfg(test)]
pub(crate) mod testutil;
