//! User-facing wording for server errors.
//!
//! Server details are shown as-is unless they mention a field the user can
//! fix in their file, in which case a more specific hint replaces them.

/// Shown when a response body does not have the expected shape.
pub const INVALID_RESPONSE_MESSAGE: &str = "Invalid response from server";

/// Shown when the server gives no detail at all.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

const PHONE_HINT: &str =
    "One or more phone numbers are invalid. Check the phone column uses a valid format, e.g. +15551234567.";

const EMAIL_HINT: &str =
    "One or more email addresses are invalid. Check the email column for typos or missing '@'.";

/// Reword a server-provided error detail for display.
///
/// Substrings are matched case-insensitively in the order `phone`, `email`,
/// `invalid`.
pub fn friendly_error_message(detail: &str) -> String {
    let detail = detail.trim();
    if detail.is_empty() {
        return GENERIC_ERROR_MESSAGE.to_string();
    }

    let lower = detail.to_lowercase();
    if lower.contains("phone") {
        PHONE_HINT.to_string()
    } else if lower.contains("email") {
        EMAIL_HINT.to_string()
    } else if lower.contains("invalid") {
        format!("Some rows contain invalid data: {detail}")
    } else {
        detail.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_detail_gets_phone_hint() {
        assert_eq!(friendly_error_message("Invalid PHONE number in row 4"), PHONE_HINT);
    }

    #[test]
    fn email_detail_gets_email_hint() {
        assert_eq!(friendly_error_message("email is malformed"), EMAIL_HINT);
    }

    #[test]
    fn phone_wins_over_email() {
        assert_eq!(friendly_error_message("email and phone invalid"), PHONE_HINT);
    }

    #[test]
    fn generic_invalid_keeps_detail() {
        assert_eq!(
            friendly_error_message("Invalid date in column 'born'"),
            "Some rows contain invalid data: Invalid date in column 'born'"
        );
    }

    #[test]
    fn other_details_pass_through() {
        assert_eq!(friendly_error_message("File expired"), "File expired");
    }

    #[test]
    fn blank_detail_is_generic() {
        assert_eq!(friendly_error_message("  "), GENERIC_ERROR_MESSAGE);
    }
}
