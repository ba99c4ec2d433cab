//! Validation helpers for DTOs.

use validator::ValidationError;

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 32;

/// Validates that a username is 3-32 characters of lowercase alphanumerics,
/// underscores or dashes, starting with a letter.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.len() < USERNAME_MIN || username.len() > USERNAME_MAX {
        let mut err = ValidationError::new("username_length");
        err.message = Some(
            format!(
                "username must be {USERNAME_MIN}-{USERNAME_MAX} characters (got {})",
                username.len()
            )
            .into(),
        );
        return Err(err);
    }

    let mut chars = username.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_lowercase());
    if !starts_with_letter
        || !username
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
    {
        let mut err = ValidationError::new("username_format");
        err.message = Some(
            "username must start with a lowercase letter and contain only lowercase \
             alphanumerics, underscores or dashes"
                .into(),
        );
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_usernames() {
        assert!(validate_username("ada").is_ok());
        assert!(validate_username("ada_lovelace-1815").is_ok());
        assert!(validate_username("a23").is_ok());
    }

    #[test]
    fn rejects_bad_lengths() {
        assert!(validate_username("ab").is_err());
        assert!(validate_username(&"a".repeat(33)).is_err());
        assert!(validate_username("").is_err());
    }

    #[test]
    fn rejects_bad_characters() {
        assert!(validate_username("Ada").is_err());
        assert!(validate_username("1ada").is_err());
        assert!(validate_username("ada lovelace").is_err());
        assert!(validate_username("ada!").is_err());
    }
}
