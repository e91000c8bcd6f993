//! Input rules for account creation and update.
//!
//! Each rule has its own error variant with a fixed message. Rules are checked
//! in a fixed order and the first violation is returned.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

use crate::domain::{NewUser, UserPatch, UserRole, UserStatus};

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("all fields must be provided")]
    MissingFields,

    #[error("username must contain only characters")]
    InvalidUsername,

    #[error("password must be between 8 and 15 characters")]
    PasswordLength,

    #[error("invalid status value")]
    InvalidStatus,

    #[error("invalid role value")]
    InvalidRole,

    #[error("username is already taken")]
    UsernameTaken,

    #[error("invalid file format, only images are allowed")]
    NotAnImage,
}

fn username_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z]+$").expect("Invalid regex"))
}

pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username_regex().is_match(username) {
        Ok(())
    } else {
        Err(ValidationError::InvalidUsername)
    }
}

/// Length is counted in UTF-8 bytes, so a multibyte character counts more
/// than once.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if (MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&password.len()) {
        Ok(())
    } else {
        Err(ValidationError::PasswordLength)
    }
}

pub fn parse_status(status: &str) -> Result<UserStatus, ValidationError> {
    status.parse().map_err(|_| ValidationError::InvalidStatus)
}

pub fn parse_role(role: &str) -> Result<UserRole, ValidationError> {
    role.parse().map_err(|_| ValidationError::InvalidRole)
}

/// Creation input after every rule passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedNewUser {
    pub status: UserStatus,
    pub role: UserRole,
}

pub fn validate_new_user(input: &NewUser) -> Result<ValidatedNewUser, ValidationError> {
    if input.full_name.is_empty() || input.username.is_empty() || input.password.is_empty() {
        return Err(ValidationError::MissingFields);
    }

    validate_username(&input.username)?;
    validate_password(&input.password)?;
    let status = parse_status(&input.status)?;
    let role = parse_role(&input.role)?;

    Ok(ValidatedNewUser { status, role })
}

/// The parsed, non-empty fields of a patch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedPatch<'a> {
    pub full_name: Option<&'a str>,
    pub username: Option<&'a str>,
    pub password: Option<&'a str>,
    pub status: Option<UserStatus>,
    pub role: Option<UserRole>,
}

pub fn validate_patch(patch: &UserPatch) -> Result<ValidatedPatch<'_>, ValidationError> {
    let username = UserPatch::present(&patch.username);
    if let Some(username) = username {
        validate_username(username)?;
    }

    let password = UserPatch::present(&patch.password);
    if let Some(password) = password {
        validate_password(password)?;
    }

    let status = UserPatch::present(&patch.status)
        .map(parse_status)
        .transpose()?;
    let role = UserPatch::present(&patch.role).map(parse_role).transpose()?;

    Ok(ValidatedPatch {
        full_name: UserPatch::present(&patch.full_name),
        username,
        password,
        status,
        role,
    })
}
