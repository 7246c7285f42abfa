use tracing::debug;

use crate::error::{Error, Result};
use crate::keyring::Keyring;
use crate::listing::{Listing, ListingSource};
use crate::parse::Record;
use crate::types::{Algorithm, Key, RecordKind, TrustLevel};
use crate::validation::validate_keyid;

/// A key record plus the identity hashes listed under it.
#[derive(Debug)]
struct KeyScan {
    key: Key,
    identity_hashes: Vec<String>,
    attribute_hashes: Vec<String>,
}

/// Whether a `pub`/`sub` record is the key `keyid` (already uppercase).
fn is_key(record: &Record<'_>, keyid: &str) -> bool {
    record.key_id().to_uppercase().contains(keyid)
}

/// Decodes the key's own fields from its `pub` or `sub` record.
///
/// The fingerprint and identities come from later records and are left empty.
fn key_from_record(record: &Record<'_>) -> Key {
    let kind = record.kind();
    let owner_trust = if kind == RecordKind::PrimaryKey {
        TrustLevel::from_field(record.field(8))
    } else {
        TrustLevel::Unknown
    };

    Key {
        kind,
        trust: TrustLevel::from_field(record.field(1)),
        bits: record.field(2).parse().unwrap_or(0),
        algorithm: Algorithm::from_field(record.field(3)),
        id: record.key_id().to_string(),
        creation_date: record.field(5).to_string(),
        expiration_date: record.field(6).to_string(),
        owner_trust,
        fingerprint: String::new(),
        identities: Vec::new(),
        attributes: Vec::new(),
    }
}

/// Walks the listing, entering "our key" at a matching `pub`/`sub` record
/// and leaving it at the next one.
fn scan_key(listing: &Listing, keyid: &str) -> Option<KeyScan> {
    let mut scan: Option<KeyScan> = None;
    let mut inside = false;

    for record in listing.records() {
        match record.kind() {
            kind if kind.is_key_boundary() => {
                inside = is_key(&record, keyid);
                if inside && scan.is_none() {
                    scan = Some(KeyScan {
                        key: key_from_record(&record),
                        identity_hashes: Vec::new(),
                        attribute_hashes: Vec::new(),
                    });
                }
            }
            RecordKind::UserIdentity if inside => {
                if let Some(scan) = scan.as_mut() {
                    scan.identity_hashes.push(record.hash().to_string());
                }
            }
            RecordKind::UserAttribute if inside => {
                if let Some(scan) = scan.as_mut() {
                    scan.attribute_hashes.push(record.hash().to_string());
                }
            }
            RecordKind::Unknown if !record.tag().is_empty() => {
                debug!(record_type = record.tag(), "skipping unknown GPG record type");
            }
            _ => {}
        }
    }

    scan
}

/// Field 10 of the first `fpr` record after the key `keyid`.
fn find_fingerprint<'a>(listing: &'a Listing, keyid: &str) -> Option<&'a str> {
    let mut inside = false;
    for record in listing.records() {
        match record.kind() {
            kind if kind.is_key_boundary() => inside = is_key(&record, keyid),
            RecordKind::Fingerprint if inside => return Some(record.field(9)),
            _ => {}
        }
    }
    None
}

impl<S: ListingSource> Keyring<S> {
    /// Builds a primary key or subkey, with its identities and attributes.
    ///
    /// `keyid` is an 8 or 16 digit hex key ID, optionally prefixed with `0x`.
    /// The fingerprint and each identity are resolved by separate lookups.
    pub async fn key(&self, keyid: &str) -> Result<Key> {
        let id = validate_keyid(keyid)?;
        let listing = self.listing(&id).await?;

        let Some(scan) = scan_key(&listing, &id) else {
            return Err(Error::NotFound {
                keyid: id,
                record: "pub or sub",
                stderr: listing.diagnostics().to_string(),
            });
        };
        debug!(
            keyid = %scan.key.id,
            identities = scan.identity_hashes.len(),
            attributes = scan.attribute_hashes.len(),
            "found key record"
        );

        let mut key = scan.key;
        key.fingerprint = self.fingerprint(&key.id).await?;
        for hash in &scan.identity_hashes {
            let identity = self
                .identity(&key.id, hash, RecordKind::UserIdentity)
                .await?;
            key.identities.push(identity);
        }
        for hash in &scan.attribute_hashes {
            let attribute = self
                .identity(&key.id, hash, RecordKind::UserAttribute)
                .await?;
            key.attributes.push(attribute);
        }

        Ok(key)
    }

    /// Looks up the full fingerprint of a key.
    pub async fn fingerprint(&self, keyid: &str) -> Result<String> {
        let id = validate_keyid(keyid)?;
        let listing = self.listing(&id).await?;

        match find_fingerprint(&listing, &id) {
            Some(fingerprint) => Ok(fingerprint.to_string()),
            None => Err(Error::NotFound {
                keyid: id,
                record: "fpr",
                stderr: listing.diagnostics().to_string(),
            }),
        }
    }
}
