use std::collections::BTreeMap;

use crate::contract::model::{iso_date, Field};
use crate::domain::draft::UserDraft;

pub const MIN_NAME_LEN: usize = 2;
pub const MAX_AGE: i64 = 120;
pub const MAX_ABOUT_LEN: usize = 5000;
pub const MIN_PASSWORD_LEN: usize = 10;
pub const PASSWORD_SPECIALS: &str = "@$!%*?&";

/// Cross-field inputs a rule may need.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    pub password: &'a str,
    pub genders: &'a [String],
}

/// Validate one field value. `None` means the field is valid.
///
/// The same function backs change, blur and submit, so re-validating an
/// unchanged value always yields the same answer.
pub fn validate(field: Field, value: &str, ctx: &ValidationContext<'_>) -> Option<String> {
    let error = match field {
        Field::Name => (value.chars().count() < MIN_NAME_LEN)
            .then_some("Name must be at least 2 characters"),
        Field::Age => match value.trim().parse::<i64>() {
            Ok(age) if (0..=MAX_AGE).contains(&age) => None,
            _ => Some("Age must be between 0 and 120"),
        },
        Field::Dob => {
            if value.trim().is_empty() {
                Some("Date of Birth is required")
            } else if iso_date::parse(value).is_none() {
                Some("Date of Birth must be a valid date (YYYY-MM-DD)")
            } else {
                None
            }
        }
        Field::Password => (!is_strong_password(value)).then_some(
            "Password must be at least 10 characters, alphanumeric, and contain a special character",
        ),
        Field::ConfirmPassword => {
            if value.is_empty() {
                Some("Please confirm your password")
            } else if value != ctx.password {
                Some("Passwords do not match")
            } else {
                None
            }
        }
        Field::Gender => {
            if value.is_empty() {
                Some("Please select a gender")
            } else if !ctx.genders.iter().any(|g| g == value) {
                Some("Please select a valid gender")
            } else {
                None
            }
        }
        Field::About => {
            if value.trim().is_empty() {
                Some("About section is required")
            } else if value.chars().count() > MAX_ABOUT_LEN {
                Some("About section cannot exceed 5000 characters")
            } else {
                None
            }
        }
    };
    error.map(str::to_string)
}

// ASCII letters, ASCII digits and PASSWORD_SPECIALS only; at least one of each.
fn is_strong_password(value: &str) -> bool {
    let allowed = |c: char| c.is_ascii_alphanumeric() || PASSWORD_SPECIALS.contains(c);
    value.chars().count() >= MIN_PASSWORD_LEN
        && value.chars().all(allowed)
        && value.chars().any(|c| c.is_ascii_alphabetic())
        && value.chars().any(|c| c.is_ascii_digit())
        && value.chars().any(|c| PASSWORD_SPECIALS.contains(c))
}

/// Current error per field. A field without an entry is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrorSet(BTreeMap<Field, String>);

impl ValidationErrorSet {
    /// Record the outcome of validating `field`; an empty or absent error clears it.
    pub fn record(&mut self, field: Field, error: Option<String>) {
        match error.filter(|e| !e.is_empty()) {
            Some(e) => {
                self.0.insert(field, e);
            }
            None => {
                self.0.remove(&field);
            }
        }
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(f, e)| (*f, e.as_str()))
    }
}

/// Full-form pass: every field, regardless of earlier results.
pub fn validate_draft(draft: &UserDraft, genders: &[String]) -> ValidationErrorSet {
    let ctx = ValidationContext {
        password: &draft.password,
        genders,
    };
    let mut errors = ValidationErrorSet::default();
    for field in Field::ALL {
        errors.record(field, validate(field, draft.get(field), &ctx));
    }
    errors
}
