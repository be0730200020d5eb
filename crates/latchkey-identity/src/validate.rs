//! Field validation for sign-in and sign-up forms.
//!
//! These checks belong to the caller: a form validates its fields before
//! handing them to the session manager, which trusts what it receives.
//! Messages are user-facing and meant to be shown next to the field.

use std::fmt;

use crate::SignUpDetails;

/// Number of digits in a PIN.
pub const PIN_LENGTH: usize = 5;

const NAME_MIN: usize = 2;
const NAME_MAX: usize = 50;

/// E.164 allows at most 15 digits; anything under 8 is no real number.
const PHONE_DIGITS_MIN: usize = 8;
const PHONE_DIGITS_MAX: usize = 15;

/// Which form field a [`FieldError`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Email,
    Phone,
    Pin,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::Email => write!(f, "email"),
            Self::Phone => write!(f, "phone"),
            Self::Pin => write!(f, "pin"),
        }
    }
}

/// Why a single field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("Name is required")]
    NameRequired,

    #[error("Name must be between 2 and 50 characters")]
    NameLength,

    #[error("Name can only contain letters, spaces, apostrophes, hyphens and periods")]
    NameCharacters,

    #[error("Email is required")]
    EmailRequired,

    #[error("Please enter a valid email address")]
    EmailInvalid,

    #[error("Invalid phone number")]
    PhoneInvalid,

    #[error("PIN must be exactly 5 digits")]
    PinInvalid,
}

/// Every field error found in one form submission.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors {
    errors: Vec<(Field, FieldError)>,
}

impl ValidationErrors {
    /// Returns the error for `field`, if it was rejected.
    pub fn get(&self, field: Field) -> Option<FieldError> {
        self.errors
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, e)| *e)
    }

    /// Iterates over rejected fields in form order.
    pub fn iter(&self) -> impl Iterator<Item = &(Field, FieldError)> {
        self.errors.iter()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    fn check(&mut self, field: Field, result: Result<(), FieldError>) {
        if let Err(e) = result {
            self.errors.push((field, e));
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, error)) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{field}: {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Checks a display name.
pub fn validate_name(name: &str) -> Result<(), FieldError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(FieldError::NameRequired);
    }
    let len = name.chars().count();
    if !(NAME_MIN..=NAME_MAX).contains(&len) {
        return Err(FieldError::NameLength);
    }
    let allowed =
        |c: char| c.is_alphabetic() || matches!(c, ' ' | '\'' | '-' | '.');
    if !name.chars().all(allowed) {
        return Err(FieldError::NameCharacters);
    }
    Ok(())
}

/// Checks that an email is syntactically plausible.
///
/// This is a shape check (`local@domain.tld`), not deliverability.
pub fn validate_email(email: &str) -> Result<(), FieldError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(FieldError::EmailRequired);
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Err(FieldError::EmailInvalid);
    };
    let labels: Vec<&str> = domain.split('.').collect();
    let valid = !local.is_empty()
        && !email.chars().any(char::is_whitespace)
        && labels.len() >= 2
        && labels.iter().all(|l| !l.is_empty() && !l.contains('@'));
    if valid { Ok(()) } else { Err(FieldError::EmailInvalid) }
}

/// Checks that a phone number is in E.164 form: `+`, then 8 to 15
/// digits, the first of which is not zero.
pub fn validate_phone(phone: &str) -> Result<(), FieldError> {
    let Some(digits) = phone.strip_prefix('+') else {
        return Err(FieldError::PhoneInvalid);
    };
    let valid = (PHONE_DIGITS_MIN..=PHONE_DIGITS_MAX).contains(&digits.len())
        && digits.chars().all(|c| c.is_ascii_digit())
        && !digits.starts_with('0');
    if valid { Ok(()) } else { Err(FieldError::PhoneInvalid) }
}

/// Checks that a PIN is exactly [`PIN_LENGTH`] ASCII digits.
pub fn validate_pin(pin: &str) -> Result<(), FieldError> {
    if pin.len() == PIN_LENGTH && pin.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(FieldError::PinInvalid)
    }
}

impl SignUpDetails {
    /// Validates every field and reports all failures at once, so a form
    /// can highlight each bad field in one pass.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        errors.check(Field::Name, validate_name(&self.name));
        errors.check(Field::Email, validate_email(&self.email));
        errors.check(Field::Phone, validate_phone(&self.phone));
        errors.check(Field::Pin, validate_pin(&self.pin));
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name_accepts_common_names() {
        for name in ["Aniket Negi", "Jo", "Anne-Marie O'Neil", "J. R. Smith", "Zoë"] {
            assert_eq!(validate_name(name), Ok(()), "{name:?}");
        }
    }

    #[test]
    fn test_validate_name_rejects_bad_names() {
        assert_eq!(validate_name("   "), Err(FieldError::NameRequired));
        assert_eq!(validate_name("A"), Err(FieldError::NameLength));
        assert_eq!(validate_name(&"a".repeat(51)), Err(FieldError::NameLength));
        assert_eq!(validate_name("R2D2"), Err(FieldError::NameCharacters));
    }

    #[test]
    fn test_validate_email_accepts_plausible_addresses() {
        for email in ["a@x.com", "first.last+tag@mail.example.org"] {
            assert_eq!(validate_email(email), Ok(()), "{email:?}");
        }
    }

    #[test]
    fn test_validate_email_rejects_malformed_addresses() {
        assert_eq!(validate_email(""), Err(FieldError::EmailRequired));
        for email in ["ax.com", "@x.com", "a@x", "a@.com", "a@x..com", "a@b@x.com", "a b@x.com"] {
            assert_eq!(validate_email(email), Err(FieldError::EmailInvalid), "{email:?}");
        }
    }

    #[test]
    fn test_validate_phone_accepts_e164() {
        assert_eq!(validate_phone("+911111111111"), Ok(()));
        assert_eq!(validate_phone("+917011270902"), Ok(()));
        assert_eq!(validate_phone("+14155550123"), Ok(()));
    }

    #[test]
    fn test_validate_phone_rejects_non_e164() {
        for phone in [
            "911111111111",
            "+0911111111",
            "+91 11111 11111",
            "+1234567",
            "+1234567890123456",
        ] {
            assert_eq!(validate_phone(phone), Err(FieldError::PhoneInvalid), "{phone:?}");
        }
    }

    #[test]
    fn test_validate_pin_requires_five_digits() {
        assert_eq!(validate_pin("12345"), Ok(()));
        assert_eq!(validate_pin("1234"), Err(FieldError::PinInvalid));
        assert_eq!(validate_pin("123456"), Err(FieldError::PinInvalid));
        assert_eq!(validate_pin("12a45"), Err(FieldError::PinInvalid));
    }

    #[test]
    fn test_sign_up_details_validate_collects_every_error() {
        let details = SignUpDetails {
            name: "".into(),
            email: "nope".into(),
            phone: "+911111111111".into(),
            pin: "1".into(),
        };

        let errors = details.validate().unwrap_err();

        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get(Field::Name), Some(FieldError::NameRequired));
        assert_eq!(errors.get(Field::Email), Some(FieldError::EmailInvalid));
        assert_eq!(errors.get(Field::Phone), None);
        assert_eq!(errors.get(Field::Pin), Some(FieldError::PinInvalid));
        assert!(errors.to_string().starts_with("name: Name is required"));
    }

    #[test]
    fn test_sign_up_details_validate_accepts_good_form() {
        let details = SignUpDetails {
            name: "A Person".into(),
            email: "a@x.com".into(),
            phone: "+911111111111".into(),
            pin: "12345".into(),
        };

        assert_eq!(details.validate(), Ok(()));
    }
}
