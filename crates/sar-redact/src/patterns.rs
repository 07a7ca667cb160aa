//! The ordered library of sensitive-data detectors.
//!
//! Patterns are applied strictly in library order. CARD runs before ACCOUNT
//! so that 13-19 digit runs are claimed as card numbers and only the
//! remaining digit runs fall through to the account detector.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Kind of sensitive value a pattern detects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// Email address
    Email,
    /// US social security number (ddd-dd-dddd)
    Ssn,
    /// Payment card number, 13-19 digits with optional space/hyphen groups
    Card,
    /// Bare 6-18 digit account number
    Account,
    /// IPv4 dotted quad
    Ip,
    /// http(s) URL
    Url,
    /// DNS domain name
    Domain,
}

impl PatternKind {
    /// All kinds in library order.
    pub const ALL: [PatternKind; 7] = [
        PatternKind::Email,
        PatternKind::Ssn,
        PatternKind::Card,
        PatternKind::Account,
        PatternKind::Ip,
        PatternKind::Url,
        PatternKind::Domain,
    ];

    /// Label used inside emitted tokens, e.g. `EMAIL` in `[EMAIL:1a2b3c]`.
    pub fn label(&self) -> &'static str {
        match self {
            PatternKind::Email => "EMAIL",
            PatternKind::Ssn => "SSN",
            PatternKind::Card => "CARD",
            PatternKind::Account => "ACCT",
            PatternKind::Ip => "IP",
            PatternKind::Url => "URL",
            PatternKind::Domain => "DOMAIN",
        }
    }

    /// Parse a token label back into a kind.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.label() == label)
    }
}

impl std::fmt::Display for PatternKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PatternKind::Email => "email",
            PatternKind::Ssn => "ssn",
            PatternKind::Card => "card",
            PatternKind::Account => "account",
            PatternKind::Ip => "ip",
            PatternKind::Url => "url",
            PatternKind::Domain => "domain",
        };
        write!(f, "{}", s)
    }
}

/// A single detector in the library.
pub struct SensitivePattern {
    kind: PatternKind,
    priority: u8,
    pattern: Lazy<Regex>,
    description: &'static str,
}

impl SensitivePattern {
    /// Kind of value this pattern detects.
    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    /// Position in the application order (0 runs first).
    pub fn priority(&self) -> u8 {
        self.priority
    }

    /// The compiled matcher.
    pub fn regex(&self) -> &Regex {
        &self.pattern
    }

    /// Human-readable description.
    pub fn description(&self) -> &'static str {
        self.description
    }
}

impl std::fmt::Debug for SensitivePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SensitivePattern")
            .field("kind", &self.kind)
            .field("priority", &self.priority)
            .field("pattern", &self.pattern.as_str())
            .finish()
    }
}

// Pre-compiled detection patterns, in application order
static LIBRARY: [SensitivePattern; 7] = [
    SensitivePattern {
        kind: PatternKind::Email,
        priority: 0,
        pattern: Lazy::new(|| {
            Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap()
        }),
        description: "Email address",
    },
    SensitivePattern {
        kind: PatternKind::Ssn,
        priority: 1,
        pattern: Lazy::new(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").unwrap()),
        description: "Social security number",
    },
    SensitivePattern {
        kind: PatternKind::Card,
        priority: 2,
        pattern: Lazy::new(|| Regex::new(r"\b(?:\d[ -]*?){13,19}\b").unwrap()),
        description: "Payment card number",
    },
    SensitivePattern {
        kind: PatternKind::Account,
        priority: 3,
        pattern: Lazy::new(|| Regex::new(r"\b\d{6,18}\b").unwrap()),
        description: "Account number",
    },
    SensitivePattern {
        kind: PatternKind::Ip,
        priority: 4,
        pattern: Lazy::new(|| {
            Regex::new(
                r"\b(?:(?:25[0-5]|2[0-4]\d|[01]?\d?\d)\.){3}(?:25[0-5]|2[0-4]\d|[01]?\d?\d)\b",
            )
            .unwrap()
        }),
        description: "IPv4 address",
    },
    SensitivePattern {
        kind: PatternKind::Url,
        priority: 5,
        pattern: Lazy::new(|| Regex::new(r"(?i)\bhttps?://\S+\b").unwrap()),
        description: "HTTP(S) URL",
    },
    SensitivePattern {
        kind: PatternKind::Domain,
        priority: 6,
        pattern: Lazy::new(|| Regex::new(r"\b(?:[A-Za-z0-9-]+\.)+[A-Za-z]{2,}\b").unwrap()),
        description: "Domain name",
    },
];

/// The pattern library in application order.
pub fn library() -> &'static [SensitivePattern] {
    &LIBRARY
}

/// Regex source matching a well-formed token with `digest_len` hex chars.
pub(crate) fn token_pattern(digest_len: usize) -> String {
    let labels: Vec<&str> = PatternKind::ALL.iter().map(|kind| kind.label()).collect();
    format!(r"\[(?:{}):[0-9a-f]{{{}}}\]", labels.join("|"), digest_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(kind: PatternKind) -> &'static SensitivePattern {
        library().iter().find(|p| p.kind() == kind).unwrap()
    }

    fn matches(kind: PatternKind, text: &str) -> Vec<&str> {
        pattern(kind)
            .regex()
            .find_iter(text)
            .map(|m| m.as_str())
            .collect()
    }

    #[test]
    fn test_library_order() {
        let kinds: Vec<PatternKind> = library().iter().map(|p| p.kind()).collect();
        assert_eq!(kinds, PatternKind::ALL.to_vec());
        for (index, p) in library().iter().enumerate() {
            assert_eq!(p.priority() as usize, index);
        }
    }

    #[test]
    fn test_labels_roundtrip() {
        for kind in PatternKind::ALL {
            assert_eq!(PatternKind::from_label(kind.label()), Some(kind));
        }
        assert_eq!(PatternKind::Account.label(), "ACCT");
        assert_eq!(PatternKind::from_label("ACCOUNT"), None);
    }

    #[test]
    fn test_email() {
        assert_eq!(
            matches(PatternKind::Email, "reach john.doe+aml@bank.example.co.uk today"),
            vec!["john.doe+aml@bank.example.co.uk"]
        );
        assert!(matches(PatternKind::Email, "user at example dot com").is_empty());
    }

    #[test]
    fn test_ssn() {
        assert_eq!(matches(PatternKind::Ssn, "ssn 123-45-6789."), vec!["123-45-6789"]);
        assert!(matches(PatternKind::Ssn, "1123-45-6789").is_empty());
    }

    #[test]
    fn test_card_plain_and_grouped() {
        assert_eq!(
            matches(PatternKind::Card, "card 4111111111111111 used"),
            vec!["4111111111111111"]
        );
        assert_eq!(
            matches(PatternKind::Card, "card 4111 1111 1111 1111 used"),
            vec!["4111 1111 1111 1111"]
        );
        assert_eq!(
            matches(PatternKind::Card, "card 4111-1111-1111-1111"),
            vec!["4111-1111-1111-1111"]
        );
        assert!(matches(PatternKind::Card, "ref 123456789012").is_empty());
    }

    #[test]
    fn test_account() {
        assert_eq!(matches(PatternKind::Account, "acct 00123456"), vec!["00123456"]);
        assert!(matches(PatternKind::Account, "code 12345").is_empty());
        assert!(matches(PatternKind::Account, "1234567890123456789").is_empty());
    }

    #[test]
    fn test_ip() {
        assert_eq!(
            matches(PatternKind::Ip, "from 192.168.10.200 and 10.0.0.1"),
            vec!["192.168.10.200", "10.0.0.1"]
        );
        assert!(matches(PatternKind::Ip, "999.1.1.1").is_empty());
    }

    #[test]
    fn test_url_case_insensitive() {
        assert_eq!(
            matches(PatternKind::Url, "see HTTPS://portal.example.com/login?id=7 now"),
            vec!["HTTPS://portal.example.com/login?id=7"]
        );
    }

    #[test]
    fn test_domain() {
        assert_eq!(
            matches(PatternKind::Domain, "wired via shell-co.example.org"),
            vec!["shell-co.example.org"]
        );
        assert!(matches(PatternKind::Domain, "no domain here").is_empty());
    }

    #[test]
    fn test_token_pattern_shape() {
        let re = Regex::new(&token_pattern(6)).unwrap();
        assert!(re.is_match("[EMAIL:1a2b3c]"));
        assert!(re.is_match("[ACCT:123456]"));
        assert!(!re.is_match("[EMAIL:1A2B3C]"));
        assert!(!re.is_match("[EMAIL:1a2b3]"));
        assert!(!re.is_match("[PHONE:1a2b3c]"));
    }

    #[test]
    fn test_tokens_never_satisfy_a_detector() {
        // Digests that are all digits are the worst case for the digit detectors.
        for kind in PatternKind::ALL {
            let token = format!("[{}:123456]", kind.label());
            for p in library() {
                if matches!(p.kind(), PatternKind::Account) {
                    continue;
                }
                assert!(
                    !p.regex().is_match(&token),
                    "{:?} matched token {}",
                    p.kind(),
                    token
                );
            }
        }
    }
}
