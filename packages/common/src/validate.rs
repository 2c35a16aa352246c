//! Input sanitation and validation shared by the server and the admin client.
//!
//! Every check here is a pure predicate. Turning a failed check into a
//! `400` response is the caller's job.

use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

/// Calendar date format accepted on the wire.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 8;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?$",
    )
    .expect("email pattern is valid")
});

/// Trim, strip markup and HTML-escape a free-text field.
///
/// Tags are removed but their text content is kept, except for `script`
/// and `style` whose content is dropped together with the tag. The result
/// escapes `&`, `<`, `>`, `"` and `'`, so it renders as inert text.
pub fn sanitize_text(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let mut builder = ammonia::Builder::empty();
    builder.clean_content_tags(HashSet::from(["script", "style"]));
    let stripped = builder.clean(trimmed).to_string();

    stripped
        .trim()
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
}

/// Returns true for a syntactically valid email address.
pub fn validate_email(email: &str) -> bool {
    let Some((local, domain)) = email.rsplit_once('@') else {
        return false;
    };
    if email.len() > 254 || local.len() > 64 || domain.len() > 255 {
        return false;
    }
    EMAIL_REGEX.is_match(email)
}

/// Parse a `YYYY-MM-DD` date, rejecting anything that does not round-trip.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let date = NaiveDate::parse_from_str(value, DATE_FORMAT).ok()?;
    (date.format(DATE_FORMAT).to_string() == value).then_some(date)
}

/// Returns true only if `value` is exactly a `YYYY-MM-DD` calendar date.
pub fn validate_date(value: &str) -> bool {
    parse_date(value).is_some()
}

/// Returns true iff `value` is one of `allowed`.
pub fn validate_enum(value: &str, allowed: &[&str]) -> bool {
    allowed.contains(&value)
}

/// Resolve an allow-listed key to its fixed target.
pub fn lookup<T: Copy>(value: &str, table: &[(&str, T)]) -> Option<T> {
    table
        .iter()
        .find(|(key, _)| *key == value)
        .map(|(_, target)| *target)
}

pub fn validate_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
}
