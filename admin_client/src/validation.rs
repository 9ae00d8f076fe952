//! Client-side required-field checks run before any request is sent.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use validator::{Validate, ValidationErrors};

use crate::{RolePayload, UserPayload};

/// Validation failures keyed by field name, for inline display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors {
    pub fields: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.entry(field.into()).or_default().push(message.into());
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self
            .fields
            .values()
            .flat_map(|messages| messages.iter().map(String::as_str))
            .collect();
        write!(f, "{}", messages.join(", "))
    }
}

impl std::error::Error for FieldErrors {}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FieldErrors::default();
        for (field, errors) in errors.field_errors() {
            for error in errors.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|msg| msg.to_string())
                    .unwrap_or_else(|| format!("{field} is invalid"));
                out.add(field.to_string(), message);
            }
        }
        out
    }
}

pub fn validate<T: Validate>(form: &T) -> Result<(), FieldErrors> {
    form.validate().map_err(FieldErrors::from)
}

/// Create-user form: first name, last name and role are mandatory.
pub fn validate_new_user(payload: &UserPayload) -> Result<(), FieldErrors> {
    let mut errors = validate(payload).err().unwrap_or_default();
    require(&mut errors, "first", payload.first.as_deref(), "First name is required");
    require(&mut errors, "last", payload.last.as_deref(), "Last name is required");
    require(&mut errors, "role_id", payload.role_id.as_deref(), "Role is required");
    finish(errors)
}

/// Create-role form: name is mandatory.
pub fn validate_new_role(payload: &RolePayload) -> Result<(), FieldErrors> {
    let mut errors = validate(payload).err().unwrap_or_default();
    require(&mut errors, "name", payload.name.as_deref(), "Name is required");
    finish(errors)
}

fn require(errors: &mut FieldErrors, field: &str, value: Option<&str>, message: &str) {
    // An empty string already failed the length rule.
    if value.is_none() {
        errors.add(field, message);
    }
}

fn finish(errors: FieldErrors) -> Result<(), FieldErrors> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
