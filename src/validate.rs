//! Field rules for the contact form. The messages are inline UI text, not
//! errors in the `Result` sense; they never propagate.

pub const REQUIRED: &str = "This field is required.";
pub const NAME_TOO_SHORT: &str = "Name must be at least 2 characters.";
pub const MESSAGE_TOO_SHORT: &str = "Message must be at least 10 characters.";
pub const EMAIL_INVALID: &str = "Please enter a valid email address.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Message,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Name, Field::Email, Field::Message];

    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Email => "Email",
            Field::Message => "Message",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Field::Name => 0,
            Field::Email => 1,
            Field::Message => 2,
        }
    }

    pub fn next(self) -> Self {
        match self {
            Field::Name => Field::Email,
            Field::Email => Field::Message,
            Field::Message => Field::Name,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Field::Name => Field::Message,
            Field::Email => Field::Name,
            Field::Message => Field::Email,
        }
    }
}

/// Result of one full-form pass: per-field inline errors plus the overall
/// verdict that gates the submit control.
#[derive(Debug, PartialEq, Eq)]
pub struct FormCheck {
    pub errors: [Option<&'static str>; 3],
    pub ok: bool,
}

/// Checks one field. Rules apply in order, first match wins.
pub fn validate_field(field: Field, value: &str) -> Option<&'static str> {
    let chars = value.chars().count();
    if value.is_empty() {
        Some(REQUIRED)
    } else if field == Field::Name && chars < 2 {
        Some(NAME_TOO_SHORT)
    } else if field == Field::Message && chars < 10 {
        Some(MESSAGE_TOO_SHORT)
    } else if field == Field::Email && !looks_like_email(value) {
        Some(EMAIL_INVALID)
    } else {
        None
    }
}

/// Checks all three fields unconditionally so every inline error refreshes,
/// then ANDs the results.
pub fn validate_form(name: &str, email: &str, message: &str) -> FormCheck {
    let errors = [
        validate_field(Field::Name, name),
        validate_field(Field::Email, email),
        validate_field(Field::Message, message),
    ];
    let ok = errors.iter().all(Option::is_none);
    FormCheck { errors, ok }
}

/// True when the value contains a `\S+@\S+\.\S+` substring: a non-blank
/// character before some `@`, and after it an unbroken non-blank run holding
/// a `.` with at least one character on each side.
fn looks_like_email(value: &str) -> bool {
    for (at, _) in value.match_indices('@') {
        let before = value[..at].chars().next_back();
        if !before.is_some_and(|c| !c.is_whitespace()) {
            continue;
        }
        let run = value[at + 1..]
            .split(char::is_whitespace)
            .next()
            .unwrap_or("");
        if run
            .char_indices()
            .any(|(i, c)| c == '.' && i > 0 && i + c.len_utf8() < run.len())
        {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_field_is_required_regardless_of_other_rules() {
        for field in Field::ALL {
            assert_eq!(validate_field(field, ""), Some(REQUIRED));
        }
    }

    #[test]
    fn one_character_name_is_too_short() {
        assert_eq!(validate_field(Field::Name, "A"), Some(NAME_TOO_SHORT));
        assert_eq!(validate_field(Field::Name, " "), Some(NAME_TOO_SHORT));
        assert_eq!(validate_field(Field::Name, "Al"), None);
    }

    #[test]
    fn short_message_is_rejected_until_ten_characters() {
        assert_eq!(
            validate_field(Field::Message, "hi there!"),
            Some(MESSAGE_TOO_SHORT)
        );
        assert_eq!(validate_field(Field::Message, "hi there!!"), None);
    }

    #[test]
    fn email_shapes() {
        assert_eq!(validate_field(Field::Email, "a@b.co"), None);
        assert_eq!(validate_field(Field::Email, "first.last@sub.domain.org"), None);
        // pattern is a substring search, not anchored
        assert_eq!(validate_field(Field::Email, "reach me at a@b.co thanks"), None);
        assert_eq!(validate_field(Field::Email, "plainaddress"), Some(EMAIL_INVALID));
        assert_eq!(validate_field(Field::Email, "a@b"), Some(EMAIL_INVALID));
        assert_eq!(validate_field(Field::Email, "a@b."), Some(EMAIL_INVALID));
        assert_eq!(validate_field(Field::Email, "a@.b"), Some(EMAIL_INVALID));
        assert_eq!(validate_field(Field::Email, " @b.c"), Some(EMAIL_INVALID));
        assert_eq!(validate_field(Field::Email, "a@ b.c"), Some(EMAIL_INVALID));
        assert_eq!(validate_field(Field::Email, "a@b .c"), Some(EMAIL_INVALID));
    }

    #[test]
    fn form_verdict_is_the_and_of_all_three_fields() {
        let check = validate_form("Al", "a@b.co", "a long enough message");
        assert_eq!(check.errors, [None, None, None]);
        assert!(check.ok);

        let check = validate_form("Al", "not-an-email", "short");
        assert_eq!(
            check.errors,
            [None, Some(EMAIL_INVALID), Some(MESSAGE_TOO_SHORT)]
        );
        assert!(!check.ok);
    }
}
