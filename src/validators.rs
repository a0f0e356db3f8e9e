// Reusable predicates for `PromptSpec::validate`.
//
// Each builder returns a closure with the collector's validator signature,
// so flows read as a list of rules rather than inline checks.

use regex::Regex;

use crate::collector::AnswerRecord;

pub const MIN_PASSWORD_LEN: usize = 8;

/// The value must contain something other than whitespace.
pub fn required(label: &str) -> impl Fn(&str, &AnswerRecord) -> Result<(), String> + 'static {
    let message = format!("{label} is required");
    move |value, _| {
        if value.trim().is_empty() {
            Err(message.clone())
        } else {
            Ok(())
        }
    }
}

/// At least `min` characters after trimming.
pub fn min_len(label: &str, min: usize) -> impl Fn(&str, &AnswerRecord) -> Result<(), String> + 'static {
    let message = format!("{label} must be at least {min} characters");
    move |value, _| {
        if value.trim().chars().count() >= min {
            Ok(())
        } else {
            Err(message.clone())
        }
    }
}

/// A `local@domain.tld` shaped address.
pub fn email() -> impl Fn(&str, &AnswerRecord) -> Result<(), String> + 'static {
    let shape = Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("email pattern is valid");
    move |value, _| {
        if shape.is_match(value.trim()) {
            Ok(())
        } else {
            Err("Please enter a valid email address".to_string())
        }
    }
}

/// Length plus one lowercase letter, one uppercase letter and one digit.
pub fn password_strength() -> impl Fn(&str, &AnswerRecord) -> Result<(), String> + 'static {
    |value, _| {
        if value.chars().count() < MIN_PASSWORD_LEN {
            return Err(format!("Password must be at least {MIN_PASSWORD_LEN} characters"));
        }
        let lower = value.chars().any(|c| c.is_lowercase());
        let upper = value.chars().any(|c| c.is_uppercase());
        let digit = value.chars().any(|c| c.is_ascii_digit());
        if lower && upper && digit {
            Ok(())
        } else {
            Err("Password must contain uppercase, lowercase and a number".to_string())
        }
    }
}

/// The value must equal the earlier answer stored under `other`.
pub fn matches_field(other: &str, message: &str) -> impl Fn(&str, &AnswerRecord) -> Result<(), String> + 'static {
    let other = other.to_string();
    let message = message.to_string();
    move |value, answers| match answers.get(&other) {
        Some(expected) if expected == value => Ok(()),
        _ => Err(message.clone()),
    }
}
