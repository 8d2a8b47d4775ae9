//! Field-level validation rules shared by the domain drafts.
//!
//! Failures become [`Error::invalid_request`] with
//! `details = {"field", "code"}` so clients can highlight the offending input.

use serde_json::json;
use url::Url;

use super::Error;

/// Characters accepted as the "special" class of the password policy.
pub const PASSWORD_SPECIALS: &str = "@$!%*?&#";

/// Minimum password length.
pub const PASSWORD_MIN_LEN: usize = 8;

const IMAGE_EXTENSIONS: [&str; 4] = [".png", ".jpg", ".jpeg", ".gif"];

/// Build a validation error for `field` with a stable machine code.
pub fn field_error(field: &str, code: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code,
    }))
}

/// Trim `value` and require it to be non-empty.
pub fn required(field: &str, value: &str) -> Result<String, Error> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(field_error(
            field,
            "missing_field",
            format!("{field} is required"),
        ));
    }
    Ok(trimmed.to_owned())
}

/// Trim `value` and require its character count to fall in `min..=max`.
pub fn length_between(field: &str, value: &str, min: usize, max: usize) -> Result<String, Error> {
    let trimmed = required(field, value)?;
    let count = trimmed.chars().count();
    if count < min || count > max {
        return Err(field_error(
            field,
            "invalid_length",
            format!("{field} must be between {min} and {max} characters"),
        ));
    }
    Ok(trimmed)
}

/// Trim `value` and require at least `min` characters.
pub fn min_length(field: &str, value: &str, min: usize) -> Result<String, Error> {
    length_between(field, value, min, usize::MAX).map_err(|_| {
        field_error(
            field,
            "too_short",
            format!("{field} must be at least {min} characters"),
        )
    })
}

/// Upper-case the first letter and lower-case the rest.
///
/// # Examples
/// ```
/// use storefront::domain::validation::capitalise;
///
/// assert_eq!(capitalise("  rOLEX "), "Rolex");
/// ```
pub fn capitalise(value: &str) -> String {
    let mut chars = value.trim().chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Require exactly ten ASCII digits.
pub fn mobile_number(field: &str, value: &str) -> Result<String, Error> {
    let trimmed = value.trim();
    if trimmed.len() == 10 && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        Ok(trimmed.to_owned())
    } else {
        Err(field_error(
            field,
            "invalid_mobile",
            format!("{field} must be exactly 10 digits"),
        ))
    }
}

/// Normalise and loosely validate an email address.
pub fn email(field: &str, value: &str) -> Result<String, Error> {
    let normalised = value.trim().to_lowercase();
    let valid = match normalised.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !normalised.contains(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(normalised)
    } else {
        Err(field_error(
            field,
            "invalid_email",
            format!("{field} must be a valid email address"),
        ))
    }
}

/// Require an absolute `http` or `https` URL.
pub fn http_url(field: &str, value: &str) -> Result<String, Error> {
    let trimmed = value.trim();
    match Url::parse(trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {
            Ok(trimmed.to_owned())
        }
        _ => Err(field_error(
            field,
            "invalid_url",
            format!("{field} must be an http(s) URL"),
        )),
    }
}

/// Require an `http(s)` URL whose path ends with a known image extension.
pub fn image_url(field: &str, value: &str) -> Result<String, Error> {
    let trimmed = http_url(field, value)?;
    let path_ok = Url::parse(&trimmed)
        .map(|url| {
            let path = url.path().to_ascii_lowercase();
            IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
        })
        .unwrap_or(false);
    if path_ok {
        Ok(trimmed)
    } else {
        Err(field_error(
            field,
            "invalid_image_url",
            format!("{field} must point to a .png, .jpg, .jpeg or .gif image"),
        ))
    }
}

/// Enforce the account password policy.
///
/// At least [`PASSWORD_MIN_LEN`] characters drawn from letters, digits and
/// [`PASSWORD_SPECIALS`], with one of each of: lower-case, upper-case, digit,
/// special.
pub fn password(field: &str, value: &str) -> Result<(), Error> {
    let allowed = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || PASSWORD_SPECIALS.contains(c));
    let has_lower = value.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = value.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = value.chars().any(|c| c.is_ascii_digit());
    let has_special = value.chars().any(|c| PASSWORD_SPECIALS.contains(c));
    if value.chars().count() >= PASSWORD_MIN_LEN
        && allowed
        && has_lower
        && has_upper
        && has_digit
        && has_special
    {
        Ok(())
    } else {
        Err(field_error(
            field,
            "weak_password",
            format!(
                "{field} must be at least {PASSWORD_MIN_LEN} characters with upper-case, \
                 lower-case, digit and one of {PASSWORD_SPECIALS}"
            ),
        ))
    }
}

/// Require `value` to fall in `min..=max`.
pub fn in_range(field: &str, value: i64, min: i64, max: i64) -> Result<i64, Error> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(field_error(
            field,
            "out_of_range",
            format!("{field} must be between {min} and {max}"),
        ))
    }
}

/// Require `value >= min`.
pub fn at_least(field: &str, value: i64, min: i64) -> Result<i64, Error> {
    if value >= min {
        Ok(value)
    } else {
        Err(field_error(
            field,
            "too_small",
            format!("{field} must be at least {min}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    //! Coverage for the shared field rules.

    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    fn detail_code(error: &Error) -> Option<&str> {
        error
            .details()
            .and_then(|d| d.get("code"))
            .and_then(serde_json::Value::as_str)
    }

    #[rstest]
    #[case("Passw0rd!", true)]
    #[case("Abcdef1#", true)]
    #[case("password1!", false)]
    #[case("PASSWORD1!", false)]
    #[case("Password!", false)]
    #[case("Password1", false)]
    #[case("Pa1!", false)]
    #[case("Passw0rd!^", false)]
    fn password_policy(#[case] candidate: &str, #[case] ok: bool) {
        assert_eq!(password("password", candidate).is_ok(), ok);
    }

    #[rstest]
    #[case("9876543210", true)]
    #[case(" 9876543210 ", true)]
    #[case("987654321", false)]
    #[case("98765432100", false)]
    #[case("98765abc10", false)]
    fn mobile_numbers(#[case] candidate: &str, #[case] ok: bool) {
        assert_eq!(mobile_number("mobile", candidate).is_ok(), ok);
    }

    #[rstest]
    #[case("https://cdn.example.com/a/b.PNG", true)]
    #[case("http://cdn.example.com/shoe.jpeg", true)]
    #[case("https://cdn.example.com/shoe.webp", false)]
    #[case("ftp://cdn.example.com/shoe.png", false)]
    #[case("shoe.png", false)]
    fn image_urls(#[case] candidate: &str, #[case] ok: bool) {
        assert_eq!(image_url("thumbnail", candidate).is_ok(), ok);
    }

    #[rstest]
    #[case(" Jane@Example.COM ", Some("jane@example.com"))]
    #[case("jane.example.com", None)]
    #[case("jane@example", None)]
    #[case("@example.com", None)]
    fn emails(#[case] candidate: &str, #[case] expected: Option<&str>) {
        assert_eq!(email("email", candidate).ok().as_deref(), expected);
    }

    #[rstest]
    fn length_errors_carry_field_details() {
        let error = length_between("title", "abc", 5, 50).expect_err("too short");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(detail_code(&error), Some("invalid_length"));
        assert_eq!(
            error.details().and_then(|d| d.get("field")),
            Some(&serde_json::json!("title"))
        );
    }

    #[rstest]
    fn required_trims_and_rejects_blank() {
        assert_eq!(required("name", "  Shoes ").ok().as_deref(), Some("Shoes"));
        let error = required("name", "   ").expect_err("blank");
        assert_eq!(detail_code(&error), Some("missing_field"));
    }

    #[rstest]
    #[case("hello world", "Hello world")]
    #[case("NIKE", "Nike")]
    #[case("", "")]
    fn capitalises_first_letter(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(capitalise(input), expected);
    }

    #[rstest]
    fn ranges_are_inclusive() {
        assert!(in_range("discount", 100, 0, 100).is_ok());
        assert!(in_range("discount", 101, 0, 100).is_err());
        assert!(at_least("amount", 1, 1).is_ok());
        assert!(at_least("amount", 0, 1).is_err());
    }
}
