// This file is part of the product Custodesk.
// SPDX-FileCopyrightText: 2025-2026 Custodesk Authors
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use serde::Serialize;

/// A single rejected form field with a human-readable message. Handlers
/// collect these and feed them back into the template context.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: &str) -> Self {
        Self {
            field,
            message: message.to_string(),
        }
    }
}

pub struct RegistrationForm<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub password_verify: &'a str,
    pub first_name: &'a str,
    pub age: &'a str,
}

pub struct CustomerForm<'a> {
    pub passport_series: &'a str,
    pub passport_number: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub gender: &'a str,
    pub age: &'a str,
    pub phone_number: &'a str,
}

pub fn validate_registration(form: &RegistrationForm<'_>) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if form.first_name.is_empty() {
        errors.push(FieldError::new("first_name", "First name is required"));
    }

    if form.username.is_empty() {
        errors.push(FieldError::new("username", "Username is required"));
    } else if form.username.len() < 4
        || form.username.len() > 12
        || !form.username.chars().all(|c| c.is_ascii_alphanumeric())
    {
        errors.push(FieldError::new(
            "username",
            "Username must be 4 to 12 letters or digits",
        ));
    }

    if form.password.len() < 8 {
        errors.push(FieldError::new(
            "password",
            "Password must be at least 8 characters",
        ));
    }
    if form.password_verify.len() < 8 {
        errors.push(FieldError::new(
            "password_verify",
            "Password confirmation must be at least 8 characters",
        ));
    } else if form.password_verify != form.password {
        errors.push(FieldError::new("password_verify", "Passwords do not match"));
    }

    // Age is optional at registration, but when given it must be a short
    // digit string.
    if !form.age.is_empty() && !is_digits(form.age, 1, 3) {
        errors.push(FieldError::new("age", "Age must be 1 to 3 digits"));
    }

    errors
}

/// Format checks on the passport pair used for customer lookups. These run
/// before any store access, so malformed input never reaches the service.
pub fn validate_passport_query(series: &str, number: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if !is_digits(series, 4, 4) {
        errors.push(FieldError::new(
            "passport_series",
            "Passport series must be exactly 4 digits",
        ));
    }
    if !is_digits(number, 6, 6) {
        errors.push(FieldError::new(
            "passport_number",
            "Passport number must be exactly 6 digits",
        ));
    }
    errors
}

pub fn validate_customer_form(form: &CustomerForm<'_>) -> Vec<FieldError> {
    let mut errors = validate_passport_query(form.passport_series, form.passport_number);

    for (field, value, label) in [
        ("first_name", form.first_name, "First name"),
        ("last_name", form.last_name, "Last name"),
        ("gender", form.gender, "Gender"),
    ] {
        if value.is_empty() {
            errors.push(FieldError {
                field,
                message: format!("{} is required", label),
            });
        }
    }

    if !is_digits(form.age, 1, 3) {
        errors.push(FieldError::new("age", "Age must be 1 to 3 digits"));
    }
    if !is_digits(form.phone_number, 10, 10) {
        errors.push(FieldError::new(
            "phone_number",
            "Phone number must be exactly 10 digits",
        ));
    }

    errors
}

fn is_digits(value: &str, min_len: usize, max_len: usize) -> bool {
    value.len() >= min_len
        && value.len() <= max_len
        && value.chars().all(|c| c.is_ascii_digit())
}
