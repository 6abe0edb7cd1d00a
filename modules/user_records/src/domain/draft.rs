use chrono::NaiveDate;

use crate::contract::model::{iso_date, Field, RecordId, UserPayload, UserRecord};
use crate::domain::dates::years_between;

/// The in-progress record held by the form, as the operator typed it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDraft {
    pub id: Option<RecordId>,
    pub name: String,
    /// Derived from `dob`; never typed.
    pub age: String,
    pub dob: String,
    pub password: String,
    pub confirm_password: String,
    pub gender: String,
    pub about: String,
}

impl UserDraft {
    /// Clone a stored record for editing. The confirmation starts equal to the
    /// stored password so an untouched record re-validates cleanly. The stored
    /// age is ignored; it is derived from `dob` as of `today`.
    pub fn from_record(record: &UserRecord, today: NaiveDate) -> Self {
        Self {
            id: Some(record.id.clone()),
            name: record.name.clone(),
            age: years_between(record.dob, today).to_string(),
            dob: record.dob.format(iso_date::FORMAT).to_string(),
            password: record.password.clone(),
            confirm_password: record.password.clone(),
            gender: record.gender.clone(),
            about: record.about.clone(),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Age => &self.age,
            Field::Dob => &self.dob,
            Field::Password => &self.password,
            Field::ConfirmPassword => &self.confirm_password,
            Field::Gender => &self.gender,
            Field::About => &self.about,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::Name => &mut self.name,
            Field::Age => &mut self.age,
            Field::Dob => &mut self.dob,
            Field::Password => &mut self.password,
            Field::ConfirmPassword => &mut self.confirm_password,
            Field::Gender => &mut self.gender,
            Field::About => &mut self.about,
        };
        *slot = value.into();
    }

    /// Request body for this draft, or the first field that does not convert.
    /// Only called after the full validation pass succeeded.
    pub fn to_payload(&self) -> Result<UserPayload, Field> {
        let age = self.age.trim().parse::<u32>().map_err(|_| Field::Age)?;
        let dob = iso_date::parse(&self.dob).ok_or(Field::Dob)?;
        Ok(UserPayload {
            name: self.name.clone(),
            age,
            dob,
            password: self.password.clone(),
            confirm_password: self.confirm_password.clone(),
            gender: self.gender.clone(),
            about: self.about.clone(),
        })
    }
}
