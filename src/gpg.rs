use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;
use crate::listing::{Listing, ListingSource};
use crate::runner::{DEFAULT_TIMEOUT_MS, ProcessOutput, ProcessRunner};

const DEFAULT_GPG_PROGRAM: &str = "gpg";
const DEFAULT_GPG_HOMEDIR: &str = ".gnupg";
const PUBLIC_KEYRING_FILE: &str = "pubring.gpg";
const SECRET_KEYRING_FILE: &str = "secring.gpg";

/// How chatty gpg should be on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    #[default]
    None,
    Verbose,
    VeryVerbose,
}

impl Verbosity {
    fn flags(self) -> &'static [&'static str] {
        match self {
            Self::None => &["--no-verbose"],
            Self::Verbose => &["--verbose"],
            Self::VeryVerbose => &["--verbose", "--verbose"],
        }
    }
}

/// Where gpg keeps its data and how it is invoked.
///
/// The public and secret keyrings default to `pubring.gpg` and
/// `secring.gpg` inside the home directory and are always passed
/// explicitly, so gpg never falls back to its own defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpgOptions {
    pub program: String,
    pub homedir: PathBuf,
    pub public_keyring: Option<PathBuf>,
    pub secret_keyring: Option<PathBuf>,
    pub timeout_ms: u64,
    pub verbosity: Verbosity,
}

impl Default for GpgOptions {
    fn default() -> Self {
        Self::with_homedir(default_homedir())
    }
}

impl GpgOptions {
    #[must_use]
    pub fn with_homedir(homedir: impl Into<PathBuf>) -> Self {
        Self {
            program: DEFAULT_GPG_PROGRAM.to_string(),
            homedir: homedir.into(),
            public_keyring: None,
            secret_keyring: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            verbosity: Verbosity::None,
        }
    }

    pub fn public_keyring(&self) -> PathBuf {
        self.public_keyring
            .clone()
            .unwrap_or_else(|| self.homedir.join(PUBLIC_KEYRING_FILE))
    }

    pub fn secret_keyring(&self) -> PathBuf {
        self.secret_keyring
            .clone()
            .unwrap_or_else(|| self.homedir.join(SECRET_KEYRING_FILE))
    }
}

/// `$GNUPGHOME`, else `$HOME/.gnupg`.
fn default_homedir() -> PathBuf {
    if let Some(dir) = std::env::var_os("GNUPGHOME").filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    std::env::var_os("HOME")
        .map(|home| Path::new(&home).join(DEFAULT_GPG_HOMEDIR))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_GPG_HOMEDIR))
}

/// What a single gpg invocation is asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode<'a> {
    /// Keys, user IDs, signatures and fingerprints in colon format.
    List(&'a str),
    ListSecretKeys,
    Export(&'a str),
    ExportSecretKey(&'a str),
}

/// The gpg-backed [`ListingSource`].
#[derive(Debug, Clone)]
pub struct Gpg {
    options: GpgOptions,
    runner: ProcessRunner,
}

impl Gpg {
    #[must_use]
    pub fn new(options: GpgOptions) -> Self {
        let runner =
            ProcessRunner::new(options.program.clone()).with_timeout_ms(options.timeout_ms);
        Self { options, runner }
    }

    pub fn options(&self) -> &GpgOptions {
        &self.options
    }

    pub(crate) fn args(&self, mode: Mode<'_>) -> Vec<OsString> {
        let mut args: Vec<OsString> =
            vec!["--homedir".into(), self.options.homedir.clone().into()];
        push_flags(
            &mut args,
            &["--fixed-list-mode", "--no-default-keyring", "--keyring"],
        );
        args.push(self.options.public_keyring().into());
        args.push("--secret-keyring".into());
        args.push(self.options.secret_keyring().into());
        push_flags(
            &mut args,
            &["--display-charset", "utf-8", "--batch", "--no-tty"],
        );

        let key_id = match mode {
            Mode::List(key_id) => {
                push_flags(
                    &mut args,
                    &[
                        "--list-sigs",
                        "--fingerprint",
                        "--fingerprint",
                        "--with-colons",
                    ],
                );
                Some(key_id)
            }
            Mode::ListSecretKeys => {
                push_flags(&mut args, &["--list-secret-keys", "--with-colons"]);
                None
            }
            Mode::Export(key_id) => {
                push_flags(&mut args, &["--armor", "--export"]);
                Some(key_id)
            }
            Mode::ExportSecretKey(key_id) => {
                push_flags(&mut args, &["--armor", "--export-secret-keys"]);
                Some(key_id)
            }
        };

        push_flags(&mut args, self.options.verbosity.flags());
        // Validated IDs arrive bare; gpg takes them as hex with a prefix.
        if let Some(key_id) = key_id {
            args.push(format!("0x{key_id}").into());
        }
        args
    }

    pub(crate) async fn run(&self, mode: Mode<'_>) -> Result<ProcessOutput> {
        let output = self.runner.run(self.args(mode)).await?;
        if !output.success() {
            debug!(
                exit_code = output.exit_code,
                stderr = %output.stderr.trim_end(),
                "gpg reported an error"
            );
        }
        Ok(output)
    }
}

fn push_flags(args: &mut Vec<OsString>, flags: &[&str]) {
    args.extend(flags.iter().map(OsString::from));
}

impl ListingSource for Gpg {
    async fn scope(&self, key_id: &str) -> Result<Listing> {
        self.run(Mode::List(key_id)).await.map(Listing::from)
    }
}
