// SPDX-FileCopyrightText: 2026 Turnstile Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Input checks for ticket issuance. All of them run before any store access.

use std::sync::LazyLock;

use regex::Regex;
use turnstile_core::{CustomerContact, TurnstileError};

static MOBILE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{9,11}$").expect("static pattern compiles"));

/// Check the customer fields of a new ticket.
pub fn validate_customer(customer: &CustomerContact) -> Result<(), TurnstileError> {
    if customer.customer_name.trim().is_empty() {
        return Err(TurnstileError::Validation(
            "customer_name must not be empty".into(),
        ));
    }
    if !MOBILE_NUMBER.is_match(&customer.mobile_number) {
        return Err(TurnstileError::Validation(
            "mobile_number must be 9 to 11 digits".into(),
        ));
    }
    if !is_email(&customer.email) {
        return Err(TurnstileError::Validation(format!(
            "'{}' is not a valid email address",
            customer.email
        )));
    }
    Ok(())
}

fn is_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer(name: &str, mobile: &str, email: &str) -> CustomerContact {
        CustomerContact {
            customer_name: name.into(),
            customer_name_ar: String::new(),
            nationality: String::new(),
            mobile_number: mobile.into(),
            email: email.into(),
        }
    }

    #[test]
    fn accepts_well_formed_customer() {
        assert!(validate_customer(&customer("Ada", "0501234567", "ada@example.com")).is_ok());
        assert!(validate_customer(&customer("Ada", "501234567", "a@b")).is_ok());
    }

    #[test]
    fn mobile_must_be_nine_to_eleven_digits() {
        for bad in ["12345678", "123456789012", "05012345a7", "", "+971501234"] {
            let err = validate_customer(&customer("Ada", bad, "ada@example.com")).unwrap_err();
            assert!(matches!(err, TurnstileError::Validation(_)), "{bad}");
        }
    }

    #[test]
    fn rejects_blank_name() {
        let err = validate_customer(&customer("  ", "0501234567", "ada@example.com")).unwrap_err();
        assert!(err.to_string().contains("customer_name"));
    }

    #[test]
    fn rejects_malformed_email() {
        for bad in ["", "ada", "@example.com", "ada@", "a@b@c", "ada @example.com"] {
            assert!(!is_email(bad), "{bad}");
        }
    }
}
