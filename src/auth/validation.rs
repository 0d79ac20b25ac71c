//! Credential format and strength checks.
//!
//! All checks are pure: they only look at their input and report the first
//! problem found for that field as a [`ValidationError`].

use crate::types::ValidationError;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Minimum password entropy in bits.
///
/// At 10^14 guesses per second, exhausting a 60-bit space takes about three hours.
pub const MIN_PASSWORD_ENTROPY_BITS: f64 = 60.0;

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 25;

static USERNAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9]+(?:[_-]?[a-zA-Z0-9]+)*$").expect("username pattern is valid")
});

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$")
        .expect("email pattern is valid")
});

const REPLACE_CHARS: &str = "!@$&*";
const SEP_CHARS: &str = "_-., ";
const OTHER_SPECIAL_CHARS: &str = "\"#%'()+/:;<=>?[\\]^{|}~";
const LOWER_CHARS: &str = "abcdefghijklmnopqrstuvwxyz";
const UPPER_CHARS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGIT_CHARS: &str = "0123456789";

/// Keyboard and alphabet runs that add little entropy when typed in order.
const SEQUENCES: &[&str] = &[
    "0123456789",
    "abcdefghijklmnopqrstuvwxyz",
    "qwertyuiop",
    "asdfghjkl",
    "zxcvbnm",
    "1qaz2wsx3edc4rfv5tgb6yhn7ujm8ik9ol0p",
];

pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let len = username.chars().count();
    if len < USERNAME_MIN_LEN {
        return Err(ValidationError::new("username", "too_short"));
    }
    if len > USERNAME_MAX_LEN {
        return Err(ValidationError::new("username", "too_long"));
    }
    if !USERNAME_RE.is_match(username) {
        return Err(ValidationError::new("username", "invalid_format"));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if !EMAIL_RE.is_match(email) {
        return Err(ValidationError::new("email", "invalid_format"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password_entropy(password) < MIN_PASSWORD_ENTROPY_BITS {
        return Err(ValidationError::new("password", "weak_password"));
    }
    Ok(())
}

/// Estimates password entropy in bits as `log2(charset) * effective_length`.
///
/// The charset grows by the full size of every character class the password
/// touches. The effective length ignores characters beyond the second in a
/// repeated run or in an ordered sequence such as `abcd` or `qwerty`.
pub fn password_entropy(password: &str) -> f64 {
    let base = charset_size(password);
    let length = effective_length(password);
    if base == 0 || length == 0 {
        return 0.0;
    }
    (base as f64).log2() * length as f64
}

fn charset_size(password: &str) -> usize {
    let classes = [
        REPLACE_CHARS,
        SEP_CHARS,
        OTHER_SPECIAL_CHARS,
        LOWER_CHARS,
        UPPER_CHARS,
        DIGIT_CHARS,
    ];
    let mut seen_classes = [false; 6];
    let mut other = 0;

    let unique: HashSet<char> = password.chars().collect();
    for c in unique {
        match classes.iter().position(|class| class.contains(c)) {
            Some(idx) => seen_classes[idx] = true,
            None => other += 1,
        }
    }

    classes
        .iter()
        .zip(seen_classes)
        .filter(|(_, seen)| *seen)
        .map(|(class, _)| class.chars().count())
        .sum::<usize>()
        + other
}

fn effective_length(password: &str) -> usize {
    let mut chars: Vec<char> = password.chars().collect();
    for seq in SEQUENCES {
        chars = drop_long_sequence_runs(&chars, seq);
    }
    drop_long_repeats(&chars).len()
}

/// Keeps at most two characters of any run that follows `seq` in order.
fn drop_long_sequence_runs(chars: &[char], seq: &str) -> Vec<char> {
    let seq: Vec<char> = seq.chars().collect();
    let position = |c: char| seq.iter().position(|s| *s == c.to_ascii_lowercase());

    let mut out = Vec::with_capacity(chars.len());
    let mut run = 0;
    let mut prev: Option<usize> = None;

    for &c in chars {
        let pos = position(c);
        run = match (prev, pos) {
            (Some(p), Some(q)) if q == p + 1 => run + 1,
            (_, Some(_)) => 1,
            _ => 0,
        };
        prev = pos;
        if run <= 2 {
            out.push(c);
        }
    }
    out
}

/// Keeps at most two consecutive copies of the same character.
fn drop_long_repeats(chars: &[char]) -> Vec<char> {
    let mut out: Vec<char> = Vec::with_capacity(chars.len());
    for &c in chars {
        let n = out.len();
        if n >= 2 && out[n - 1] == c && out[n - 2] == c {
            continue;
        }
        out.push(c);
    }
    out
}
