// src/domain.rs
//! Normalized domain names, crt.sh name-field parsing and fingerprints

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;

/// Characters that never appear in a usable hostname but do show up in
/// malformed CT entries.
const DISALLOWED_CHARS: &[char] = &['<', '>', '\\', '"', '\''];

/// Why a line of a certificate name field was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameRejection {
    /// Nothing left after trimming and wildcard stripping
    Empty,
    /// No `.` separator (bare identifiers, single labels)
    NoSeparator,
}

impl fmt::Display for NameRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameRejection::Empty => write!(f, "empty name"),
            NameRejection::NoSeparator => write!(f, "name has no domain separator"),
        }
    }
}

impl std::error::Error for NameRejection {}

/// A normalized, lowercase hostname without wildcard labels
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Domain(String);

impl Domain {
    /// Normalize a raw name: trim, lowercase, strip leading `*.` labels.
    ///
    /// Normalizing an already-normalized name returns it unchanged.
    pub fn parse(raw: &str) -> Result<Self, NameRejection> {
        let lowered = raw.trim().to_lowercase();

        let mut name = lowered.as_str();
        while let Some(rest) = name.strip_prefix("*.") {
            name = rest.trim_start();
        }

        if name.is_empty() {
            return Err(NameRejection::Empty);
        }
        if !name.contains('.') {
            return Err(NameRejection::NoSeparator);
        }

        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the name holds whitespace, angle brackets, quotes or
    /// backslashes and should never be handed to a caller.
    pub fn has_disallowed_chars(&self) -> bool {
        self.0
            .chars()
            .any(|c| c.is_whitespace() || DISALLOWED_CHARS.contains(&c))
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(self)
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Domain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Hex SHA-256 digest of a domain, the store's uniqueness key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of(domain: &Domain) -> Self {
        let digest = Sha256::digest(domain.as_str().as_bytes());
        Self(hex::encode(digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse a crt.sh `name_value` field, which holds one name per line.
///
/// Blank lines are skipped silently; every other line yields either a
/// normalized domain or the reason it was rejected.
pub fn parse_name_field(field: &str) -> impl Iterator<Item = Result<Domain, NameRejection>> + '_ {
    field
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(Domain::parse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lowercases_and_trims() {
        let domain = Domain::parse("  WWW.Example.COM \t").unwrap();
        assert_eq!(domain.as_str(), "www.example.com");
    }

    #[test]
    fn test_parse_strips_wildcards() {
        assert_eq!(Domain::parse("*.example.com").unwrap().as_str(), "example.com");
        assert_eq!(Domain::parse("*.*.example.com").unwrap().as_str(), "example.com");
        assert_eq!(Domain::parse("*. api.example.com").unwrap().as_str(), "api.example.com");
    }

    #[test]
    fn test_parse_rejects() {
        assert_eq!(Domain::parse(""), Err(NameRejection::Empty));
        assert_eq!(Domain::parse("*."), Err(NameRejection::Empty));
        assert_eq!(Domain::parse("localhost"), Err(NameRejection::NoSeparator));
        assert_eq!(Domain::parse("*.intranet"), Err(NameRejection::NoSeparator));
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let inputs = [
            "Example.com",
            " *.Foo.Example.org ",
            "*.*.bar.net",
            "*. spaced.io",
            "x.y.z.co.uk",
            "ÄBC.de",
        ];

        for input in inputs {
            let once = Domain::parse(input).unwrap();
            let twice = Domain::parse(once.as_str()).unwrap();
            assert_eq!(once, twice, "not idempotent for {:?}", input);
        }
    }

    #[test]
    fn test_disallowed_chars() {
        assert!(!Domain::parse("example.com").unwrap().has_disallowed_chars());
        assert!(Domain::parse("bad name.com").unwrap().has_disallowed_chars());
        assert!(Domain::parse("<script>.com").unwrap().has_disallowed_chars());
        assert!(Domain::parse("quote\".com").unwrap().has_disallowed_chars());
        assert!(Domain::parse("it's.com").unwrap().has_disallowed_chars());
        assert!(Domain::parse("back\\slash.com").unwrap().has_disallowed_chars());
    }

    #[test]
    fn test_fingerprint_is_sha256_hex() {
        let domain = Domain::parse("example.com").unwrap();
        let fp = domain.fingerprint();

        assert_eq!(fp.as_str().len(), 64);
        assert_eq!(
            fp.as_str(),
            "a379a6f6eeafb9a55e378c118034e2751e682fab9f2d30ab13d2125586ce1947"
        );
        assert_eq!(fp, Fingerprint::of(&Domain::parse("EXAMPLE.com").unwrap()));
    }

    #[test]
    fn test_parse_name_field_multiline() {
        let field = "*.example.com\nexample.com\n\nmail.Example.com\r\nintranet\n";
        let parsed: Vec<_> = parse_name_field(field).collect();

        assert_eq!(parsed.len(), 4);
        assert_eq!(parsed[0].as_ref().unwrap().as_str(), "example.com");
        assert_eq!(parsed[1].as_ref().unwrap().as_str(), "example.com");
        assert_eq!(parsed[2].as_ref().unwrap().as_str(), "mail.example.com");
        assert_eq!(parsed[3], Err(NameRejection::NoSeparator));
    }
}
