// src/utils/validation.rs

use url::Url;

use crate::utils::html::visible_text;

pub const MAX_OPTIONS: usize = 10;

/// Validates that a string is a correctly formatted URL.
pub fn validate_url_string(url: &str) -> Result<(), validator::ValidationError> {
    if Url::parse(url).is_err() {
        return Err(validator::ValidationError::new("invalid_url"));
    }
    Ok(())
}

/// A display name must still say something once markup is stripped.
pub fn validate_display_name(name: &str) -> Result<(), validator::ValidationError> {
    if visible_text(name).trim().is_empty() {
        let mut err = validator::ValidationError::new("blank_name");
        err.message = Some("Name must contain visible text".into());
        return Err(err);
    }
    Ok(())
}

/// Shape check for a question's options.
///
/// The two-distinct-options rule lives in the quiz model, not here.
pub fn validate_options(options: &[String]) -> Result<(), validator::ValidationError> {
    if options.len() > MAX_OPTIONS {
        return Err(validator::ValidationError::new("too_many_options"));
    }
    for opt in options {
        if opt.is_empty() {
            return Err(validator::ValidationError::new("option_cannot_be_empty"));
        }
        if opt.len() > 500 {
            return Err(validator::ValidationError::new("option_too_long"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_check() {
        assert!(validate_url_string("https://cdn.example.com/quiz/1.jpg").is_ok());
        assert!(validate_url_string("quiz.jpg").is_err());
    }

    #[test]
    fn options_check() {
        let ok = vec!["3".to_string(), "4".to_string()];
        assert!(validate_options(&ok).is_ok());

        let empty_entry = vec!["3".to_string(), String::new()];
        assert!(validate_options(&empty_entry).is_err());

        let too_many: Vec<String> = (0..=MAX_OPTIONS).map(|i| i.to_string()).collect();
        assert!(validate_options(&too_many).is_err());
    }

    #[test]
    fn display_name_check() {
        assert!(validate_display_name("Capitals").is_ok());
        assert!(validate_display_name("<b>Capitals</b>").is_ok());
        assert!(validate_display_name("<script>x</script>").is_err());
        assert!(validate_display_name("   ").is_err());
        assert!(validate_display_name("<p> </p>").is_err());
        assert!(validate_display_name("<img src=\"x.png\">").is_err());
    }
}
