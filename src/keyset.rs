use tracing::debug;

use crate::error::Result;
use crate::keyring::Keyring;
use crate::listing::{Listing, ListingSource};
use crate::types::{Keyset, RecordKind};
use crate::validation::validate_keyid;

/// Key IDs of the first primary key in the listing and the subkeys that
/// follow it, in order.
fn keyset_ids(listing: &Listing) -> (Option<String>, Vec<String>) {
    let mut primary: Option<String> = None;
    let mut subkeys = Vec::new();

    for record in listing.records() {
        match record.kind() {
            RecordKind::PrimaryKey if primary.is_none() => {
                primary = Some(record.key_id().to_string());
            }
            RecordKind::PrimaryKey => {
                debug!(keyid = record.key_id(), "listing holds another keyset, stopping");
                break;
            }
            RecordKind::Subkey if primary.is_some() => {
                subkeys.push(record.key_id().to_string());
            }
            RecordKind::Subkey => {
                debug!(keyid = record.key_id(), "skipping subkey before any primary key");
            }
            _ => {}
        }
    }

    (primary, subkeys)
}

impl<S: ListingSource> Keyring<S> {
    /// Builds the primary key named by `keyid` together with all its subkeys.
    ///
    /// A listing without any key records yields an empty [`Keyset`].
    pub async fn keyset(&self, keyid: &str) -> Result<Keyset> {
        let id = validate_keyid(keyid)?;
        let listing = self.listing(&id).await?;
        let (primary, subkey_ids) = keyset_ids(&listing);

        let mut keyset = Keyset::default();
        if let Some(primary) = primary {
            keyset.primary_key = Some(self.key(&primary).await?);
        }
        for subkey in &subkey_ids {
            keyset.subkeys.push(self.key(subkey).await?);
        }

        Ok(keyset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::key::tests::SAMPLE_LISTING;
    use crate::listing::testing::CannedListing;

    #[test]
    fn test_keyset_ids_in_order() {
        let (primary, subkeys) = keyset_ids(&Listing::new(SAMPLE_LISTING));
        assert_eq!(primary.as_deref(), Some("E6AA90171392B174"));
        assert_eq!(subkeys, ["BB45ABF7A71D5481", "0C6E1F5E32D1A3B7"]);
    }

    #[test]
    fn test_keyset_ids_ignore_following_keyset() {
        let listing = Listing::new(
            "pub:u:1024:17:E6AA90171392B174:1138786427:::u:::scaESCA:\n\
             sub:u:4096:1:BB45ABF7A71D5481:1203325654::::::e:\n\
             pub:f:4096:1:786C63F330D7CB92:1568815794:::-:::scSC:\n\
             sub:f:4096:1:B31FB30B04D73EB0:1409337986::::::s:",
        );
        let (primary, subkeys) = keyset_ids(&listing);
        assert_eq!(primary.as_deref(), Some("E6AA90171392B174"));
        assert_eq!(subkeys, ["BB45ABF7A71D5481"]);
    }

    #[test]
    fn test_keyset_ids_skip_leading_subkey() {
        let listing = Listing::new(
            "sub:u:4096:1:BB45ABF7A71D5481:1203325654::::::e:\n\
             pub:u:1024:17:E6AA90171392B174:1138786427:::u:::scaESCA:",
        );
        let (primary, subkeys) = keyset_ids(&listing);
        assert_eq!(primary.as_deref(), Some("E6AA90171392B174"));
        assert!(subkeys.is_empty());

        let (primary, subkeys) = keyset_ids(&Listing::new(
            "sub:u:4096:1:BB45ABF7A71D5481:1203325654::::::e:",
        ));
        assert!(primary.is_none());
        assert!(subkeys.is_empty());
    }

    #[tokio::test]
    async fn test_build_keyset() {
        let keyring = Keyring::with_source(CannedListing::new(SAMPLE_LISTING));
        let keyset = keyring.keyset("0x1392B174").await.unwrap();

        let primary = keyset.primary_key.as_ref().unwrap();
        assert!(primary.is_primary());
        assert_eq!(primary.fingerprint, "2BABC6254E66E7B8450AC3E1E6AA90171392B174");
        assert_eq!(primary.identities.len(), 2);

        let ids: Vec<_> = keyset.subkeys.iter().map(|k| k.id.as_str()).collect();
        assert_eq!(ids, ["BB45ABF7A71D5481", "0C6E1F5E32D1A3B7"]);
        assert!(keyset.subkeys.iter().all(|k| k.kind == RecordKind::Subkey));

        // each key is built from lookups scoped to its own ID
        let scopes = keyring.source().scopes();
        assert_eq!(scopes[0], "1392B174");
        assert_eq!(scopes[1..6], ["E6AA90171392B174"; 5]);
        assert_eq!(scopes[6..8], ["BB45ABF7A71D5481"; 2]);
        assert_eq!(scopes[8..], ["0C6E1F5E32D1A3B7"; 2]);
    }

    #[tokio::test]
    async fn test_empty_listing_gives_empty_keyset() {
        let keyring = Keyring::with_source(CannedListing::new("tru::1:1223678701:0:3:1:5\n"));
        let keyset = keyring.keyset("DEADBEEF").await.unwrap();
        assert!(keyset.primary_key.is_none());
        assert!(keyset.subkeys.is_empty());
    }

    #[tokio::test]
    async fn test_keyset_rejects_bad_keyid() {
        let keyring = Keyring::with_source(CannedListing::new(SAMPLE_LISTING));
        let err = keyring.keyset("0x123").await.unwrap_err();
        assert!(matches!(err, Error::InvalidKeyId { .. }));
        assert_eq!(keyring.source().request_count(), 0);
    }

    #[tokio::test]
    async fn test_keyset_is_idempotent() {
        let keyring = Keyring::with_source(CannedListing::new(SAMPLE_LISTING));
        let first = keyring.keyset("E6AA90171392B174").await.unwrap();
        let second = keyring.keyset("E6AA90171392B174").await.unwrap();
        assert_eq!(first, second);
    }
}
