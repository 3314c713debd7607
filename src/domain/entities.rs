use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// Store-assigned identifier. The backend may hand out integer or text keys;
// both are kept as text so they compare the same way form input does.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Integer(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(value) => RecordId(value),
            RawId::Integer(value) => RecordId(value.to_string()),
        })
    }
}

// Authenticated user as reported by the auth collaborator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl User {
    // Identity string written into deposit attribution.
    pub fn identity(&self) -> &str {
        self.email.as_deref().unwrap_or(&self.id)
    }
}

// Signed-in session: the bearer token plus the user it belongs to.
#[derive(Clone, Debug)]
pub struct Session {
    pub access_token: String,
    pub user: User,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Player {
    pub id: RecordId,
    pub name: String,
    // Absent or null until the first credit lands.
    #[serde(default)]
    pub balance: Option<f64>,
}

impl Player {
    pub fn balance_or_zero(&self) -> f64 {
        self.balance.unwrap_or(0.0)
    }
}

// Insert payload for the players table; the store fills in id and balance.
#[derive(Clone, Debug, Serialize)]
pub struct NewPlayer {
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Deposit {
    pub id: RecordId,
    pub player_id: RecordId,
    // Legacy rows may carry a null amount; they render as null and count as zero.
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
}

// Insert payload for the deposits table.
#[derive(Clone, Debug, Serialize)]
pub struct NewDeposit {
    pub player_id: RecordId,
    pub amount: f64,
    pub method: String,
    pub created_by: String,
    pub timestamp: DateTime<Utc>,
}

// Accept both RFC 3339 instants and zone-less timestamps (read as UTC), since the
// column type is owned by the backend schema.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}
