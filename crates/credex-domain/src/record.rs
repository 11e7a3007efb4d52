//! Canonical record - the unified output of every extraction

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Structured account information
///
/// Every sub-category extraction converges to this shape. All fields are
/// optional; an entirely empty record is legal and reported as a validation
/// warning by the gatekeeper, not as an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanonicalRecord {
    /// Service, site or system name
    pub title: Option<String>,

    /// Login id, user name or email address
    #[serde(rename = "userID")]
    pub user_id: Option<String>,

    /// Password or PIN
    pub password: Option<String>,

    /// Login or service URL
    pub url: Option<String>,

    /// Account, card or contract number
    pub number: Option<String>,

    /// Free-form remarks, including labelled lines appended by the mapper
    pub note: Option<String>,

    /// Host name or IP address for remote access
    pub host: Option<String>,

    /// Port for remote access (1-65535)
    ///
    /// Accepts both `22` and `"22"` when decoding.
    #[serde(deserialize_with = "deserialize_port")]
    pub port: Option<u16>,

    /// Private key or other authentication key material
    #[serde(rename = "authKey")]
    pub auth_key: Option<String>,

    /// Model self-reported confidence (0.0-1.0); carried, never acted upon
    pub confidence: Option<f64>,
}

impl CanonicalRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no content field is set (`confidence` alone does not count)
    pub fn is_empty(&self) -> bool {
        self.extracted_field_count() == 0
    }

    /// Number of content fields that carry a value
    pub fn extracted_field_count(&self) -> usize {
        CanonicalField::CONTENT
            .iter()
            .filter(|field| field.is_present(self))
            .count()
    }

    /// Classify the record by the kind of access it describes
    pub fn account_type(&self) -> AccountType {
        if self.host.is_some() || self.port.is_some() || self.auth_key.is_some() {
            if self.port == Some(22) || self.auth_key.is_some() {
                AccountType::Ssh
            } else if self.port == Some(3389) {
                AccountType::Rdp
            } else {
                AccountType::RemoteAccess
            }
        } else if self.url.is_some() {
            AccountType::Web
        } else {
            AccountType::General
        }
    }

    /// Get a field rendered as a string
    pub fn get(&self, field: CanonicalField) -> Option<String> {
        field.value_of(self)
    }
}

/// Kind of account a record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AccountType {
    /// Has a URL but no remote-access details
    Web,
    /// Port 22 or key material present
    Ssh,
    /// Port 3389
    Rdp,
    /// Host or port on some other protocol
    RemoteAccess,
    /// Anything else
    General,
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AccountType::Web => "Web",
            AccountType::Ssh => "SSH",
            AccountType::Rdp => "RDP",
            AccountType::RemoteAccess => "Remote access",
            AccountType::General => "General",
        };
        f.write_str(label)
    }
}

/// The ten canonical fields, addressed by wire name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum CanonicalField {
    #[serde(rename = "title")]
    Title,
    #[serde(rename = "userID")]
    UserId,
    #[serde(rename = "password")]
    Password,
    #[serde(rename = "url")]
    Url,
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "note")]
    Note,
    #[serde(rename = "host")]
    Host,
    #[serde(rename = "port")]
    Port,
    #[serde(rename = "authKey")]
    AuthKey,
    #[serde(rename = "confidence")]
    Confidence,
}

impl CanonicalField {
    /// All fields in record order
    pub const ALL: [CanonicalField; 10] = [
        CanonicalField::Title,
        CanonicalField::UserId,
        CanonicalField::Password,
        CanonicalField::Url,
        CanonicalField::Number,
        CanonicalField::Note,
        CanonicalField::Host,
        CanonicalField::Port,
        CanonicalField::AuthKey,
        CanonicalField::Confidence,
    ];

    /// Fields that hold extracted content (everything but `confidence`)
    pub const CONTENT: [CanonicalField; 9] = [
        CanonicalField::Title,
        CanonicalField::UserId,
        CanonicalField::Password,
        CanonicalField::Url,
        CanonicalField::Number,
        CanonicalField::Note,
        CanonicalField::Host,
        CanonicalField::Port,
        CanonicalField::AuthKey,
    ];

    /// Wire name as used in JSON and mapping rules
    pub fn wire_name(&self) -> &'static str {
        match self {
            CanonicalField::Title => "title",
            CanonicalField::UserId => "userID",
            CanonicalField::Password => "password",
            CanonicalField::Url => "url",
            CanonicalField::Number => "number",
            CanonicalField::Note => "note",
            CanonicalField::Host => "host",
            CanonicalField::Port => "port",
            CanonicalField::AuthKey => "authKey",
            CanonicalField::Confidence => "confidence",
        }
    }

    /// Parse a wire name
    pub fn from_wire_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.wire_name() == name)
    }

    /// Whether the field is set on the record
    pub fn is_present(&self, record: &CanonicalRecord) -> bool {
        match self {
            CanonicalField::Title => record.title.is_some(),
            CanonicalField::UserId => record.user_id.is_some(),
            CanonicalField::Password => record.password.is_some(),
            CanonicalField::Url => record.url.is_some(),
            CanonicalField::Number => record.number.is_some(),
            CanonicalField::Note => record.note.is_some(),
            CanonicalField::Host => record.host.is_some(),
            CanonicalField::Port => record.port.is_some(),
            CanonicalField::AuthKey => record.auth_key.is_some(),
            CanonicalField::Confidence => record.confidence.is_some(),
        }
    }

    /// Field value rendered as a string
    pub fn value_of(&self, record: &CanonicalRecord) -> Option<String> {
        match self {
            CanonicalField::Title => record.title.clone(),
            CanonicalField::UserId => record.user_id.clone(),
            CanonicalField::Password => record.password.clone(),
            CanonicalField::Url => record.url.clone(),
            CanonicalField::Number => record.number.clone(),
            CanonicalField::Note => record.note.clone(),
            CanonicalField::Host => record.host.clone(),
            CanonicalField::Port => record.port.map(|p| p.to_string()),
            CanonicalField::AuthKey => record.auth_key.clone(),
            CanonicalField::Confidence => record.confidence.map(|c| c.to_string()),
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl std::str::FromStr for CanonicalField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_wire_name(s).ok_or_else(|| format!("Unknown canonical field: {}", s))
    }
}

/// Parse a port written as decimal text
///
/// Returns `None` for anything that is not a plain number in 1-65535.
///
/// # Examples
///
/// ```
/// use credex_domain::parse_port;
///
/// assert_eq!(parse_port(" 22 "), Some(22));
/// assert_eq!(parse_port("99999"), None);
/// assert_eq!(parse_port("ssh"), None);
/// ```
pub fn parse_port(text: &str) -> Option<u16> {
    let text = text.trim();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match text.parse::<u32>() {
        Ok(n) if (1..=65535).contains(&n) => Some(n as u16),
        _ => None,
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PortRepr {
    Number(i64),
    Text(String),
}

fn deserialize_port<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<PortRepr>::deserialize(deserializer)? {
        None => Ok(None),
        Some(PortRepr::Number(n)) => match u16::try_from(n) {
            Ok(port) if port >= 1 => Ok(Some(port)),
            _ => Err(D::Error::custom(format!("port out of range: {}", n))),
        },
        Some(PortRepr::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(PortRepr::Text(s)) => parse_port(&s)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid port: {}", s))),
    }
}
