//! Field-shape checks shared by the table inserts.

use modkit_core::{EntityKind, StoreError, StoreResult};
use once_cell::sync::Lazy;
use regex::Regex;

static LOGIN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_\-@.]+$").expect("Invalid login regex"));

static MAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$").expect("Invalid mail regex")
});

static IDENTIFIER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9\-_]+$").expect("Invalid identifier regex"));

/// Longest accepted login, matching the hosting application's column.
pub const LOGIN_MAX_LENGTH: usize = 60;

/// Longest accepted project identifier.
pub const IDENTIFIER_MAX_LENGTH: usize = 100;

pub(crate) fn require_name(kind: EntityKind, field: &str, value: &str) -> StoreResult<()> {
    if value.trim().is_empty() {
        return Err(StoreError::invalid(kind, format!("{} cannot be blank", field)));
    }
    Ok(())
}

pub(crate) fn login(value: &str) -> StoreResult<()> {
    require_name(EntityKind::User, "login", value)?;
    if value.len() > LOGIN_MAX_LENGTH || !LOGIN_PATTERN.is_match(value) {
        return Err(StoreError::invalid(
            EntityKind::User,
            format!("login {:?} is invalid", value),
        ));
    }
    Ok(())
}

pub(crate) fn mail(value: &str) -> StoreResult<()> {
    if !MAIL_PATTERN.is_match(value) {
        return Err(StoreError::invalid(
            EntityKind::User,
            format!("mail {:?} is invalid", value),
        ));
    }
    Ok(())
}

/// Project identifiers: lowercase letters, digits, dashes and underscores,
/// not purely numeric.
pub(crate) fn project_identifier(value: &str) -> StoreResult<()> {
    let valid = !value.is_empty()
        && value.len() <= IDENTIFIER_MAX_LENGTH
        && IDENTIFIER_PATTERN.is_match(value)
        && !value.chars().all(|c| c.is_ascii_digit());
    if !valid {
        return Err(StoreError::invalid(
            EntityKind::Project,
            format!("identifier {:?} is invalid", value),
        ));
    }
    Ok(())
}

pub(crate) fn field_regexp(value: &str) -> StoreResult<()> {
    Regex::new(value).map(|_| ()).map_err(|e| {
        StoreError::invalid(
            EntityKind::CustomField,
            format!("regular expression {:?} is invalid: {}", value, e),
        )
    })
}

pub(crate) fn webhook_url(value: &str) -> StoreResult<()> {
    let parsed = url::Url::parse(value).map_err(|e| {
        StoreError::invalid(EntityKind::Webhook, format!("url {:?} is invalid: {}", value, e))
    })?;
    match parsed.scheme() {
        "http" | "https" if parsed.has_host() => Ok(()),
        _ => Err(StoreError::invalid(
            EntityKind::Webhook,
            format!("url {:?} must be an absolute http(s) URL", value),
        )),
    }
}
