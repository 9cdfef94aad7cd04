//! Field validation and normalization for person writes.
//!
//! # Responsibility
//! - Reject malformed person/address input before it reaches storage.
//! - Normalize accepted values into the shape persisted by repositories.
//!
//! # Invariants
//! - Pure and deterministic: no I/O, no logging.
//! - Fail-fast: fields are checked in `PersonField` declaration order and the
//!   first violated rule is returned.

use crate::model::person::{AddressInput, PersonInput, ValidatedAddress, ValidatedPerson};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const NAME_MIN_CHARS: usize = 2;
pub const PHONE_DIGITS: usize = 10;
pub const AGE_MIN: u8 = 1;
pub const AGE_MAX: u8 = 150;
pub const PASSWORD_MIN_CHARS: usize = 6;
pub const ADDRESS_MIN_CHARS: usize = 10;

/// Punctuation accepted as the password "symbol" class.
pub const PASSWORD_SYMBOLS: &str = r#"!@#$%^&*()_+-=[]{};':"\|,.<>/?"#;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

/// Input field identifiers, in validation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PersonField {
    Name,
    Email,
    Phone,
    Age,
    Password,
    PermanentAddress,
    CommunicationAddress,
}

impl PersonField {
    /// Stable snake_case label used in error envelopes and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Age => "age",
            Self::Password => "password",
            Self::PermanentAddress => "permanent_address",
            Self::CommunicationAddress => "communication_address",
        }
    }
}

impl Display for PersonField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Password character class required by the password rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordClass {
    Letter,
    Digit,
    Symbol,
}

impl Display for PasswordClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Letter => f.write_str("letter"),
            Self::Digit => f.write_str("digit"),
            Self::Symbol => f.write_str("symbol"),
        }
    }
}

/// First violated field rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Value is empty after trimming.
    Required(PersonField),
    /// Trimmed value has fewer than `min` characters.
    TooShort {
        field: PersonField,
        min: usize,
    },
    InvalidEmail,
    /// Phone does not contain exactly ten digits; `digits` is what was found.
    InvalidPhone { digits: usize },
    /// Age is not an integer in `1..=150`; carries the trimmed input.
    InvalidAge(String),
    /// Password lacks at least the `missing` character class.
    WeakPassword {
        missing: PasswordClass,
    },
}

impl ValidationError {
    /// Field the failure concerns.
    pub fn field(&self) -> PersonField {
        match self {
            Self::Required(field) | Self::TooShort { field, .. } => *field,
            Self::InvalidEmail => PersonField::Email,
            Self::InvalidPhone { .. } => PersonField::Phone,
            Self::InvalidAge(_) => PersonField::Age,
            Self::WeakPassword { .. } => PersonField::Password,
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Required(field) => write!(f, "{field} is required and cannot be empty"),
            Self::TooShort { field, min } => {
                write!(f, "{field} must be at least {min} characters long")
            }
            Self::InvalidEmail => write!(f, "email must look like name@domain.tld"),
            Self::InvalidPhone { digits } => write!(
                f,
                "phone must contain exactly {PHONE_DIGITS} digits, got {digits}"
            ),
            Self::InvalidAge(value) => write!(
                f,
                "age must be a whole number between {AGE_MIN} and {AGE_MAX}, got `{value}`"
            ),
            Self::WeakPassword { missing } => write!(
                f,
                "password must contain a letter, a digit and a symbol; missing {missing}"
            ),
        }
    }
}

impl Error for ValidationError {}

/// Validates a registration/edit form and returns normalized write shapes.
///
/// # Errors
/// - Returns the first violated rule in `PersonField` order.
pub fn validate_registration(
    person: &PersonInput,
    address: &AddressInput,
) -> Result<(ValidatedPerson, ValidatedAddress), ValidationError> {
    let name = validate_name(&person.name)?;
    let email = validate_email(&person.email)?;
    let phone = validate_phone(&person.phone)?;
    let age = validate_age(&person.age)?;
    let password = validate_password(&person.password)?;
    let permanent_address =
        validate_address(PersonField::PermanentAddress, &person.permanent_address)?;
    let communication_address = validate_address(
        PersonField::CommunicationAddress,
        &address.communication_address,
    )?;

    Ok((
        ValidatedPerson {
            name,
            email,
            phone,
            age,
            permanent_address,
            password,
        },
        ValidatedAddress {
            communication_address,
        },
    ))
}

/// Strips every non-digit character.
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Trims and lowercases an email value.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn validate_name(raw: &str) -> Result<String, ValidationError> {
    let value = required(PersonField::Name, raw)?;
    min_chars(PersonField::Name, value, NAME_MIN_CHARS)?;
    Ok(value.to_string())
}

fn validate_email(raw: &str) -> Result<String, ValidationError> {
    let value = required(PersonField::Email, raw)?;
    if !EMAIL_RE.is_match(value) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(normalize_email(value))
}

fn validate_phone(raw: &str) -> Result<String, ValidationError> {
    let value = required(PersonField::Phone, raw)?;
    let digits = normalize_phone(value);
    let count = digits.chars().count();
    if count != PHONE_DIGITS {
        return Err(ValidationError::InvalidPhone { digits: count });
    }
    Ok(digits)
}

fn validate_age(raw: &str) -> Result<u8, ValidationError> {
    let value = required(PersonField::Age, raw)?;
    match value.parse::<u8>() {
        Ok(age) if (AGE_MIN..=AGE_MAX).contains(&age) => Ok(age),
        _ => Err(ValidationError::InvalidAge(value.to_string())),
    }
}

fn validate_password(raw: &str) -> Result<String, ValidationError> {
    let value = required(PersonField::Password, raw)?;
    min_chars(PersonField::Password, value, PASSWORD_MIN_CHARS)?;

    let has_letter = value.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = value.chars().any(|c| c.is_ascii_digit());
    let has_symbol = value.chars().any(|c| PASSWORD_SYMBOLS.contains(c));
    let checks = [
        (PasswordClass::Letter, has_letter),
        (PasswordClass::Digit, has_digit),
        (PasswordClass::Symbol, has_symbol),
    ];
    if let Some((missing, _)) = checks.into_iter().find(|(_, present)| !present) {
        return Err(ValidationError::WeakPassword { missing });
    }

    Ok(value.to_string())
}

fn validate_address(field: PersonField, raw: &str) -> Result<String, ValidationError> {
    let value = required(field, raw)?;
    min_chars(field, value, ADDRESS_MIN_CHARS)?;
    Ok(value.to_string())
}

fn required(field: PersonField, raw: &str) -> Result<&str, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(trimmed)
}

fn min_chars(field: PersonField, value: &str, min: usize) -> Result<(), ValidationError> {
    if value.chars().count() < min {
        return Err(ValidationError::TooShort { field, min });
    }
    Ok(())
}
