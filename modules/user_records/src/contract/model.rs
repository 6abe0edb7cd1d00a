use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Server-assigned record identifier (opaque, Mongo-style `_id`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
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

/// A person record as held by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub age: u32,
    #[serde(with = "iso_date")]
    pub dob: NaiveDate,
    #[serde(default)]
    pub password: String,
    #[serde(default, rename = "confirmPassword")]
    pub confirm_password: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub about: String,
}

/// Request body for create and update. Carries no id: the create path never
/// sends one and the update path keys by URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPayload {
    pub name: String,
    pub age: u32,
    #[serde(with = "iso_date")]
    pub dob: NaiveDate,
    pub password: String,
    #[serde(rename = "confirmPassword")]
    pub confirm_password: String,
    pub gender: String,
    pub about: String,
}

impl UserPayload {
    /// The record the server holds after this payload was accepted under `id`.
    pub fn into_record(self, id: RecordId) -> UserRecord {
        UserRecord {
            id,
            name: self.name,
            age: self.age,
            dob: self.dob,
            password: self.password,
            confirm_password: self.confirm_password,
            gender: self.gender,
            about: self.about,
        }
    }
}

/// Form fields of a user record, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Name,
    Age,
    Dob,
    Password,
    ConfirmPassword,
    Gender,
    About,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Name,
        Field::Age,
        Field::Dob,
        Field::Password,
        Field::ConfirmPassword,
        Field::Gender,
        Field::About,
    ];

    /// Wire/form name of the field.
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Age => "age",
            Field::Dob => "dob",
            Field::Password => "password",
            Field::ConfirmPassword => "confirmPassword",
            Field::Gender => "gender",
            Field::About => "about",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown field: '{0}'")]
pub struct UnknownField(pub String);

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// Dates travel as `YYYY-MM-DD`; RFC 3339 timestamps are accepted on input
/// because document stores commonly serialise dates that way.
pub mod iso_date {
    use chrono::{DateTime, NaiveDate};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d";

    pub fn parse(s: &str) -> Option<NaiveDate> {
        let s = s.trim();
        NaiveDate::parse_from_str(s, FORMAT)
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
    }

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid date '{raw}'")))
    }
}
