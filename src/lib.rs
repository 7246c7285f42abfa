//! Structured access to GnuPG keys, parsed from `gpg --with-colons` listings.
//!
//! This crate runs `gpg` and rebuilds keys, subkeys, user IDs, user
//! attributes and certifications from its colon-delimited output. It never
//! touches key material itself and never modifies the keyring.
//!
//! # Example
//!
//! ```no_run
//! use gnupg_keyset::Keyring;
//!
//! #[tokio::main]
//! async fn main() -> gnupg_keyset::Result<()> {
//!     let keyring = Keyring::new();
//!
//!     let key = keyring.key("0xE6AA90171392B174").await?;
//!     for uid in &key.identities {
//!         println!("{} <{}>", uid.name, uid.email);
//!         for sig in keyring.identity_signatures(uid).await? {
//!             println!("    signed by {} ({})", sig.name, sig.signing_key_id);
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Requirements
//!
//! - `gpg` available on `PATH` (or set [`GpgOptions::program`])
//! - Read access to the keyring files
//!
//! Every lookup spawns its own `gpg` process. Building a key with many
//! identities, or listing many signatures, runs gpg many times.

mod error;
mod gpg;
mod identity;
mod key;
mod keyring;
mod keyset;
mod listing;
mod parse;
mod runner;
mod signature;
mod types;
mod validation;

pub use error::{Error, Result};
pub use gpg::{Gpg, GpgOptions, Verbosity};
pub use keyring::Keyring;
pub use listing::{Listing, ListingSource};
pub use parse::{Record, field, fields, parse_timestamp, parse_user_string};
pub use runner::{DEFAULT_TIMEOUT_MS, ProcessOutput, ProcessRunner};
pub use types::{
    Algorithm, Identity, Key, Keyset, RecordKind, Signature, TrustLevel, UserString,
};
pub use validation::validate_keyid;
