use tracing::debug;

use crate::error::{Error, Result};
use crate::keyring::Keyring;
use crate::listing::{Listing, ListingSource};
use crate::parse::parse_user_string;
use crate::types::{Algorithm, Identity, RecordKind, Signature};
use crate::validation::validate_keyid;

/// Finds the `sig` record made by `signer` at `date` and decodes it.
fn find_signature(listing: &Listing, signer: &str, date: &str) -> Option<Result<Signature>> {
    let record = listing.records().find(|r| {
        r.kind() == RecordKind::Signature && r.key_id() == signer && r.field(5) == date
    })?;

    Some(parse_user_string(record.user_string()).map(|user| Signature {
        algorithm: Algorithm::from_field(record.field(3)),
        signing_key_id: signer.to_string(),
        signing_date: date.to_string(),
        name: user.name,
        comment: user.comment,
        email: user.email,
    }))
}

/// `(signer key ID, date)` of every signature over the identity `hash`.
///
/// A `uid`/`uat` record opens or closes the identity depending on its hash;
/// a `pub`/`sub` record always closes it, so subkey binding signatures are
/// never attributed to the last user ID.
fn signature_refs(listing: &Listing, hash: &str) -> Vec<(String, String)> {
    let mut refs = Vec::new();
    let mut inside = false;

    for record in listing.records() {
        match record.kind() {
            kind if kind.is_identity() => inside = record.hash().eq_ignore_ascii_case(hash),
            kind if kind.is_key_boundary() => inside = false,
            RecordKind::Signature if inside => {
                refs.push((record.key_id().to_string(), record.field(5).to_string()));
            }
            _ => {}
        }
    }

    refs
}

impl<S: ListingSource> Keyring<S> {
    /// Resolves the certification `signer` made on `keyid` at `date`.
    ///
    /// `signer` and `date` must match the listing fields exactly.
    pub async fn signature(&self, keyid: &str, signer: &str, date: &str) -> Result<Signature> {
        let id = validate_keyid(keyid)?;
        let listing = self.listing(&id).await?;

        find_signature(&listing, signer, date).unwrap_or_else(|| {
            Err(Error::NotFound {
                keyid: id,
                record: "sig",
                stderr: listing.diagnostics().to_string(),
            })
        })
    }

    /// Lists the signatures over one user ID or attribute of `keyid`.
    ///
    /// Each signature is resolved by its own lookup, so this costs one gpg
    /// run plus one per signature.
    pub async fn signatures(&self, keyid: &str, identity_hash: &str) -> Result<Vec<Signature>> {
        let id = validate_keyid(keyid)?;
        let listing = self.listing(&id).await?;
        let refs = signature_refs(&listing, identity_hash);
        debug!(keyid = %id, count = refs.len(), "resolving signatures");

        let mut signatures = Vec::with_capacity(refs.len());
        for (signer, date) in &refs {
            signatures.push(self.signature(&id, signer, date).await?);
        }
        Ok(signatures)
    }

    /// Signatures over `identity`, fetched fresh on every call.
    pub async fn identity_signatures(&self, identity: &Identity) -> Result<Vec<Signature>> {
        self.signatures(&identity.parent_key_id, &identity.hash).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::tests::SAMPLE_LISTING;
    use crate::listing::testing::CannedListing;

    #[test]
    fn test_find_signature_with_user_string() {
        let listing = Listing::new(SAMPLE_LISTING);
        let sig = find_signature(&listing, "F4B4B0CC797EBFAB", "1223678701")
            .unwrap()
            .unwrap();
        assert_eq!(sig.algorithm, Algorithm::Dsa);
        assert_eq!(sig.signing_key_id, "F4B4B0CC797EBFAB");
        assert_eq!(sig.signing_date, "1223678701");
        assert_eq!(sig.name, "Enrico Zini");
        assert_eq!(sig.email, "enrico@enricozini.com");
        assert!(sig.signed().is_some());
    }

    #[test]
    fn test_find_signature_requires_exact_pair() {
        let listing = Listing::new(SAMPLE_LISTING);
        assert!(find_signature(&listing, "F4B4B0CC797EBFAB", "1138787426").is_none());
        assert!(find_signature(&listing, "f4b4b0cc797ebfab", "1223678701").is_none());
    }

    #[test]
    fn test_find_signature_unknown_signer_string() {
        let listing =
            Listing::new("sig:::1:0123456789ABCDEF:1600000000::::[User ID not found]:10x:");
        let result = find_signature(&listing, "0123456789ABCDEF", "1600000000").unwrap();
        assert!(matches!(result, Err(Error::UserString(_))));
    }

    #[test]
    fn test_signature_refs_per_identity() {
        let listing = Listing::new(SAMPLE_LISTING);
        let refs = signature_refs(&listing, "64E94BC187C9B38AD5070B2327C4211970D90639");
        assert_eq!(
            refs,
            [
                ("E6AA90171392B174".to_string(), "1138787426".to_string()),
                ("F4B4B0CC797EBFAB".to_string(), "1223678701".to_string()),
            ]
        );
    }

    #[test]
    fn test_signature_refs_stop_at_subkey() {
        let listing = Listing::new(SAMPLE_LISTING);
        let refs = signature_refs(&listing, "4E2CB61790C019A48949A0124DC9F6CD00AE5E28");
        assert_eq!(
            refs,
            [("E6AA90171392B174".to_string(), "1199442125".to_string())]
        );
        assert!(signature_refs(&listing, "unknown").is_empty());
    }

    #[tokio::test]
    async fn test_signatures_refetch_each_signature() {
        let keyring = Keyring::with_source(CannedListing::new(SAMPLE_LISTING));
        let sigs = keyring
            .signatures("E6AA90171392B174", "64E94BC187C9B38AD5070B2327C4211970D90639")
            .await
            .unwrap();

        assert_eq!(sigs.len(), 2);
        assert_eq!(sigs[0].email, "d.paleino@gmail.com");
        assert_eq!(sigs[1].name, "Enrico Zini");
        assert_eq!(keyring.source().scopes(), ["E6AA90171392B174"; 3]);
    }

    #[tokio::test]
    async fn test_identity_signatures() {
        let keyring = Keyring::with_source(CannedListing::new(SAMPLE_LISTING));
        let key = keyring.key("E6AA90171392B174").await.unwrap();
        let sigs = keyring
            .identity_signatures(&key.identities[1])
            .await
            .unwrap();
        assert_eq!(sigs.len(), 1);
        assert_eq!(sigs[0].signing_date, "1199228966");
    }

    #[tokio::test]
    async fn test_missing_signature_is_not_found() {
        let keyring = Keyring::with_source(CannedListing::new(SAMPLE_LISTING));
        let err = keyring
            .signature("E6AA90171392B174", "F4B4B0CC797EBFAB", "1")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { record: "sig", .. }));
    }
}
