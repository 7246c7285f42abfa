use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::error::{Error, Result};
use crate::types::{RecordKind, UserString};

/// RFC 2822 §3.4.1 addr-spec, minus the quoted-string and domain-literal forms.
const EMAIL_PATTERN: &str = r"[a-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z0-9](?:[a-z0-9-]*[a-z0-9])?";

static USER_STRING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"([._+\w\s]+)( \(([^)]*)\))? <((?i:{EMAIL_PATTERN}))>"
    ))
    .expect("invalid user string pattern")
});

/// Splits a listing line into its colon-separated fields.
pub fn fields(line: &str) -> Vec<&str> {
    if line.is_empty() {
        return Vec::new();
    }
    line.split(':').collect()
}

/// Returns field `index` of `line`, or empty text for an empty line.
///
/// gpg guarantees the field count per record kind, so asking for a field
/// past the end is a caller bug. Release builds yield empty text.
pub fn field(line: &str, index: usize) -> &str {
    if line.is_empty() {
        return "";
    }
    let value = line.split(':').nth(index);
    debug_assert!(value.is_some(), "field {index} missing in record {line:?}");
    value.unwrap_or("")
}

/// One line of a listing, tagged with its decoded kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record<'a> {
    kind: RecordKind,
    fields: Vec<&'a str>,
}

impl<'a> Record<'a> {
    pub fn parse(line: &'a str) -> Self {
        let fields = fields(line);
        let kind = fields
            .first()
            .map(|tag| RecordKind::from_tag(tag))
            .unwrap_or_default();
        Self { kind, fields }
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn tag(&self) -> &'a str {
        self.fields.first().copied().unwrap_or("")
    }

    /// Like [`field`], but over the already split record.
    pub fn field(&self, index: usize) -> &'a str {
        if self.fields.is_empty() {
            return "";
        }
        let value = self.fields.get(index).copied();
        debug_assert!(
            value.is_some(),
            "field {index} missing in {} record",
            self.tag()
        );
        value.unwrap_or("")
    }

    /// Field 5 for key, identity and signature records.
    pub fn key_id(&self) -> &'a str {
        self.field(4)
    }

    /// Field 8: the user ID hash of `uid`/`uat` records.
    pub fn hash(&self) -> &'a str {
        self.field(7)
    }

    /// Field 10: user ID or signer string.
    pub fn user_string(&self) -> &'a str {
        self.field(9)
    }
}

/// Decodes every line of `output`, in order.
pub fn records(output: &str) -> impl Iterator<Item = Record<'_>> {
    output.lines().map(Record::parse)
}

/// Splits a `Name (Comment) <email>` user string.
///
/// The comment is optional; the bracketed address is not. The match is not
/// anchored: a name holding characters outside letters, digits, `._+` and
/// whitespace keeps only the part after the last such character.
pub fn parse_user_string(user: &str) -> Result<UserString> {
    let caps = USER_STRING
        .captures(user)
        .ok_or_else(|| Error::UserString(user.to_string()))?;
    let group = |i| caps.get(i).map_or("", |m| m.as_str()).trim().to_string();

    Ok(UserString {
        name: group(1),
        comment: group(3),
        email: group(4),
    })
}

/// Decodes an epoch-seconds field. Empty or non-numeric text yields `None`.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    s.parse::<i64>()
        .ok()
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
}
