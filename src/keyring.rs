use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::gpg::{Gpg, GpgOptions, Mode};
use crate::listing::{Listing, ListingSource};
use crate::runner::ProcessOutput;
use crate::types::RecordKind;
use crate::validation::validate_keyid;

/// Read-only view of a GnuPG keyring.
///
/// Every lookup runs its own listing through the [`ListingSource`]; nothing
/// is cached between calls, so two lookups may observe different keyring
/// states if gpg's data changes in between.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> gnupg_keyset::Result<()> {
/// use gnupg_keyset::Keyring;
///
/// let keyring = Keyring::with_homedir("/home/user/.gnupg");
/// let keyset = keyring.keyset("0xE6AA90171392B174").await?;
/// if let Some(primary) = &keyset.primary_key {
///     println!("{} {}", primary.id, primary.fingerprint);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Keyring<S = Gpg> {
    source: S,
}

impl Default for Keyring {
    fn default() -> Self {
        Self::new()
    }
}

impl Keyring {
    /// Uses `$GNUPGHOME` or `~/.gnupg` and `gpg` from `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(GpgOptions::default())
    }

    #[must_use]
    pub fn with_homedir(path: impl Into<PathBuf>) -> Self {
        Self::with_options(GpgOptions::with_homedir(path))
    }

    #[must_use]
    pub fn with_options(options: GpgOptions) -> Self {
        Self {
            source: Gpg::new(options),
        }
    }

    pub fn options(&self) -> &GpgOptions {
        self.source.options()
    }

    /// Key IDs of every secret key in the secret keyring.
    pub async fn secret_key_ids(&self) -> Result<Vec<String>> {
        let output = checked(self.source.run(Mode::ListSecretKeys).await?)?;
        Ok(secret_key_ids(&Listing::from(output)))
    }

    /// ASCII-armored public part of a key.
    pub async fn export_public_key(&self, keyid: &str) -> Result<String> {
        let id = validate_keyid(keyid)?;
        let output = checked(self.source.run(Mode::Export(&id)).await?)?;
        armored(id, output)
    }

    /// ASCII-armored secret part of a key.
    pub async fn export_secret_key(&self, keyid: &str) -> Result<String> {
        let id = validate_keyid(keyid)?;
        let output = checked(self.source.run(Mode::ExportSecretKey(&id)).await?)?;
        armored(id, output)
    }
}

impl<S: ListingSource> Keyring<S> {
    /// Builds a keyring over any listing source, e.g. a caching one.
    pub fn with_source(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub(crate) async fn listing(&self, key_id: &str) -> Result<Listing> {
        self.source.scope(key_id).await
    }
}

fn checked(output: ProcessOutput) -> Result<ProcessOutput> {
    if output.success() {
        return Ok(output);
    }
    Err(Error::Gpg {
        status: output.exit_code,
        stderr: output.stderr,
    })
}

fn armored(keyid: String, output: ProcessOutput) -> Result<String> {
    if output.stdout.trim().is_empty() {
        return Err(Error::NotFound {
            keyid,
            record: "key",
            stderr: output.stderr,
        });
    }
    Ok(output.stdout)
}

pub(crate) fn secret_key_ids(listing: &Listing) -> Vec<String> {
    listing
        .records()
        .filter(|r| r.kind() == RecordKind::SecretKey)
        .map(|r| r.key_id().to_string())
        .collect()
}
