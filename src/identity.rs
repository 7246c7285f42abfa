use crate::error::{Error, Result};
use crate::keyring::Keyring;
use crate::listing::{Listing, ListingSource};
use crate::parse::{Record, parse_user_string};
use crate::types::{Identity, RecordKind, TrustLevel, UserString};
use crate::validation::validate_keyid;

fn identity_from_record(record: &Record<'_>, parent_key_id: &str) -> Result<Identity> {
    let kind = record.kind();
    // Attribute payloads (photo IDs) are not decoded.
    let user = if kind == RecordKind::UserIdentity {
        parse_user_string(record.user_string())?
    } else {
        UserString::default()
    };

    Ok(Identity {
        kind,
        trust: TrustLevel::from_field(record.field(1)),
        creation_date: record.field(5).to_string(),
        expiration_date: record.field(6).to_string(),
        hash: record.hash().to_string(),
        name: user.name,
        comment: user.comment,
        email: user.email,
        parent_key_id: parent_key_id.to_string(),
    })
}

/// First record of `kind` whose hash equals `hash`, ignoring case.
fn find_identity<'a>(listing: &'a Listing, hash: &str, kind: RecordKind) -> Option<Record<'a>> {
    listing
        .records()
        .find(|r| r.kind() == kind && r.hash().eq_ignore_ascii_case(hash))
}

impl<S: ListingSource> Keyring<S> {
    /// Resolves one user ID or user attribute of a key by its hash.
    ///
    /// `kind` must be [`RecordKind::UserIdentity`] or
    /// [`RecordKind::UserAttribute`]. Fails with [`Error::NotFound`] when the
    /// listing has no such record.
    pub async fn identity(&self, keyid: &str, hash: &str, kind: RecordKind) -> Result<Identity> {
        let id = validate_keyid(keyid)?;
        let listing = self.listing(&id).await?;

        match find_identity(&listing, hash, kind) {
            Some(record) => identity_from_record(&record, &id),
            None => Err(Error::NotFound {
                keyid: id,
                record: kind.label(),
                stderr: listing.diagnostics().to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::tests::SAMPLE_LISTING;
    use crate::listing::testing::CannedListing;

    const UID_LINE: &str = "uid:u::::1138787426::64E94BC187C9B38AD5070B2327C4211970D90639::David Paleino <david.paleino@poste.it>:";

    #[test]
    fn test_identity_from_uid_record() {
        let identity = identity_from_record(&Record::parse(UID_LINE), "E6AA90171392B174").unwrap();
        assert_eq!(identity.kind, RecordKind::UserIdentity);
        assert_eq!(identity.trust, TrustLevel::Ultimate);
        assert_eq!(identity.name, "David Paleino");
        assert_eq!(identity.comment, "");
        assert_eq!(identity.email, "david.paleino@poste.it");
        assert_eq!(identity.hash, "64E94BC187C9B38AD5070B2327C4211970D90639");
        assert_eq!(identity.creation_date, "1138787426");
        assert_eq!(identity.parent_key_id, "E6AA90171392B174");
    }

    #[test]
    fn test_identity_from_uat_record() {
        let record = Record::parse(
            "uat:r::::1199442125::4E2CB61790C019A48949A0124DC9F6CD00AE5E28::1 6727:",
        );
        let identity = identity_from_record(&record, "E6AA90171392B174").unwrap();
        assert_eq!(identity.kind, RecordKind::UserAttribute);
        assert_eq!(identity.trust, TrustLevel::Revoked);
        assert!(identity.name.is_empty());
        assert!(identity.email.is_empty());
    }

    #[test]
    fn test_unparseable_user_id() {
        let record = Record::parse("uid:u::::1138787426::AAAA::no address here:");
        let err = identity_from_record(&record, "E6AA90171392B174").unwrap_err();
        assert!(matches!(err, Error::UserString(_)));
    }

    #[test]
    fn test_find_identity_matches_kind_and_hash() {
        let listing = Listing::new(SAMPLE_LISTING);
        let found = find_identity(
            &listing,
            "9ce39242a56ca074c46d5eb842c0af1b9493effa",
            RecordKind::UserIdentity,
        );
        assert!(found.is_some());

        // right hash, wrong kind
        let found = find_identity(
            &listing,
            "4E2CB61790C019A48949A0124DC9F6CD00AE5E28",
            RecordKind::UserIdentity,
        );
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_resolve_identity() {
        let keyring = Keyring::with_source(CannedListing::new(SAMPLE_LISTING));
        let identity = keyring
            .identity(
                "E6AA90171392B174",
                "9CE39242A56CA074C46D5EB842C0AF1B9493EFFA",
                RecordKind::UserIdentity,
            )
            .await
            .unwrap();
        assert_eq!(identity.name, "David Paleino");
        assert_eq!(identity.comment, "Alioth account");
        assert_eq!(identity.email, "hanska-guest@alioth.debian.org");
    }

    #[tokio::test]
    async fn test_missing_identity_is_not_found() {
        let keyring = Keyring::with_source(CannedListing::new(SAMPLE_LISTING));
        let err = keyring
            .identity("E6AA90171392B174", "0000", RecordKind::UserAttribute)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { record: "uat", .. }));
    }
}
