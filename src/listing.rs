use std::future::Future;

use crate::error::Result;
use crate::parse::{Record, records};
use crate::runner::ProcessOutput;

/// Text of one `--with-colons` listing plus whatever the tool said on stderr.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Listing {
    text: String,
    diagnostics: String,
    exit_code: i32,
}

impl Listing {
    /// A successful listing with no diagnostics.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Captured stderr of the invocation that produced this listing.
    pub fn diagnostics(&self) -> &str {
        &self.diagnostics
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// Records in the order the tool emitted them.
    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        records(&self.text)
    }
}

impl From<ProcessOutput> for Listing {
    fn from(output: ProcessOutput) -> Self {
        Self {
            text: output.stdout,
            diagnostics: output.stderr,
            exit_code: output.exit_code,
        }
    }
}

/// Produces a fresh listing of keys, user IDs, signatures and fingerprints
/// scoped to one key.
///
/// Every lookup asks for its own listing. Implementations may cache, but
/// the parsers never assume they do.
pub trait ListingSource {
    fn scope(&self, key_id: &str) -> impl Future<Output = Result<Listing>> + Send;
}
