use chrono::{DateTime, Utc};

use crate::parse::parse_timestamp;

/// Kind of a record in `--with-colons` output, taken from its first field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecordKind {
    PrimaryKey,
    Subkey,
    SecretKey,
    SecretSubkey,
    UserIdentity,
    UserAttribute,
    Signature,
    RevocationSignature,
    Fingerprint,
    PublicKeyDatum,
    Group,
    RevocationKey,
    TrustDbInfo,
    SignatureSubpacket,
    X509Certificate,
    X509CertificatePrivate,
    #[default]
    Unknown,
}

impl RecordKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "pub" => Self::PrimaryKey,
            "sub" => Self::Subkey,
            "sec" => Self::SecretKey,
            "ssb" => Self::SecretSubkey,
            "uid" => Self::UserIdentity,
            "uat" => Self::UserAttribute,
            "sig" => Self::Signature,
            "rev" => Self::RevocationSignature,
            "fpr" => Self::Fingerprint,
            "pkd" => Self::PublicKeyDatum,
            "grp" => Self::Group,
            "rvk" => Self::RevocationKey,
            "tru" => Self::TrustDbInfo,
            "spk" => Self::SignatureSubpacket,
            "crt" => Self::X509Certificate,
            "crs" => Self::X509CertificatePrivate,
            _ => Self::Unknown,
        }
    }

    /// Whether this record opens a new key in the listing.
    pub fn is_key_boundary(self) -> bool {
        matches!(self, Self::PrimaryKey | Self::Subkey)
    }

    /// Whether this record is a user ID or a user attribute.
    pub fn is_identity(self) -> bool {
        matches!(self, Self::UserIdentity | Self::UserAttribute)
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::PrimaryKey => "pub",
            Self::Subkey => "sub",
            Self::SecretKey => "sec",
            Self::SecretSubkey => "ssb",
            Self::UserIdentity => "uid",
            Self::UserAttribute => "uat",
            Self::Signature => "sig",
            Self::RevocationSignature => "rev",
            Self::Fingerprint => "fpr",
            Self::PublicKeyDatum => "pkd",
            Self::Group => "grp",
            Self::RevocationKey => "rvk",
            Self::TrustDbInfo => "tru",
            Self::SignatureSubpacket => "spk",
            Self::X509Certificate => "crt",
            Self::X509CertificatePrivate => "crs",
            Self::Unknown => "unknown",
        }
    }
}

/// GPG trust level.
///
/// Used both for the computed validity of a key or user ID (field 2 of a
/// record) and for the owner trust the user assigned to a primary key
/// (field 9 of a `pub` record).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TrustLevel {
    /// New key, not yet in the trust database.
    UnknownNew,
    Invalid,
    Disabled,
    Revoked,
    Expired,
    /// Not yet computed.
    Undefined,
    /// Explicitly distrusted.
    Never,
    Marginal,
    Full,
    /// The user's own key or one they explicitly trust ultimately.
    Ultimate,
    #[default]
    Unknown,
}

impl TrustLevel {
    pub fn from_gpg_char(c: char) -> Self {
        match c {
            'o' => Self::UnknownNew,
            'i' => Self::Invalid,
            'd' => Self::Disabled,
            'r' => Self::Revoked,
            'e' => Self::Expired,
            'q' => Self::Undefined,
            'n' => Self::Never,
            'm' => Self::Marginal,
            'f' => Self::Full,
            'u' => Self::Ultimate,
            _ => Self::Unknown,
        }
    }

    /// Decodes a whole trust field; anything but a single known character
    /// is `Unknown`.
    pub fn from_field(field: &str) -> Self {
        let mut chars = field.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_gpg_char(c),
            _ => Self::Unknown,
        }
    }
}

/// Public key algorithm, as numbered by OpenPGP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Algorithm {
    Rsa,
    RsaEncryptOnly,
    RsaSignOnly,
    ElgamalEncryptOnly,
    Dsa,
    ElgamalSignAndEncrypt,
    #[default]
    Unknown,
}

impl Algorithm {
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Rsa,
            2 => Self::RsaEncryptOnly,
            3 => Self::RsaSignOnly,
            16 => Self::ElgamalEncryptOnly,
            17 => Self::Dsa,
            20 => Self::ElgamalSignAndEncrypt,
            _ => Self::Unknown,
        }
    }

    pub fn from_field(field: &str) -> Self {
        field
            .trim()
            .parse()
            .map(Self::from_code)
            .unwrap_or_default()
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Rsa => "RSA",
            Self::RsaEncryptOnly => "RSA (encrypt only)",
            Self::RsaSignOnly => "RSA (sign only)",
            Self::ElgamalEncryptOnly => "Elgamal (encrypt only)",
            Self::Dsa => "DSA",
            Self::ElgamalSignAndEncrypt => "Elgamal",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// The parts of a `Name (Comment) <email>` user string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserString {
    pub name: String,
    pub comment: String,
    pub email: String,
}

/// A primary key or subkey.
///
/// Built from a single point-in-time listing; there is no way to refresh
/// or modify it afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct Key {
    /// [`RecordKind::PrimaryKey`] or [`RecordKind::Subkey`].
    pub kind: RecordKind,
    pub trust: TrustLevel,
    pub bits: u32,
    pub algorithm: Algorithm,
    pub id: String,
    /// Seconds since the epoch, as printed by gpg.
    pub creation_date: String,
    pub expiration_date: String,
    /// Always [`TrustLevel::Unknown`] for subkeys.
    pub owner_trust: TrustLevel,
    pub fingerprint: String,
    pub identities: Vec<Identity>,
    pub attributes: Vec<Identity>,
}

impl Key {
    pub fn is_primary(&self) -> bool {
        self.kind == RecordKind::PrimaryKey
    }

    pub fn created(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.creation_date)
    }

    pub fn expires(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.expiration_date)
    }
}

/// A primary key together with its subkeys, in listing order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub struct Keyset {
    /// `None` when the listing contained no primary key record.
    pub primary_key: Option<Key>,
    pub subkeys: Vec<Key>,
}

/// A user ID (`uid`) or user attribute (`uat`) bound to a key.
///
/// Signatures are not stored here; fetch them with
/// [`Keyring::identity_signatures`](crate::Keyring::identity_signatures).
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct Identity {
    /// [`RecordKind::UserIdentity`] or [`RecordKind::UserAttribute`].
    pub kind: RecordKind,
    pub trust: TrustLevel,
    pub creation_date: String,
    pub expiration_date: String,
    pub hash: String,
    /// Empty for user attributes.
    pub name: String,
    pub comment: String,
    pub email: String,
    /// ID of the key this identity was looked up under.
    pub parent_key_id: String,
}

impl Identity {
    pub fn created(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.creation_date)
    }

    pub fn expires(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.expiration_date)
    }
}

/// A certification made over a user ID or attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct Signature {
    pub algorithm: Algorithm,
    pub signing_key_id: String,
    pub signing_date: String,
    pub name: String,
    pub comment: String,
    pub email: String,
}

impl Signature {
    pub fn signed(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.signing_date)
    }
}
