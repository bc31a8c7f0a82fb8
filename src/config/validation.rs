//! Profile validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that URLs parse and the artifact name is a plain file name
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: Profile → Result<(), Vec<ValidationError>>

use std::fmt;

use url::Url;

use crate::config::schema::Profile;

/// A single semantic problem in a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_profile(profile: &Profile) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let artifact = profile.server.artifact.trim();
    if artifact.is_empty() {
        errors.push(ValidationError {
            field: "server.artifact",
            message: "must not be empty".to_string(),
        });
    } else if artifact.contains(['/', '\\']) || artifact == "." || artifact == ".." {
        errors.push(ValidationError {
            field: "server.artifact",
            message: format!("'{}' must be a file name, not a path", artifact),
        });
    }

    if profile.server.java.trim().is_empty() {
        errors.push(ValidationError {
            field: "server.java",
            message: "must not be empty".to_string(),
        });
    }

    check_url(&mut errors, "server.artifact_url", &profile.server.artifact_url);
    if let Some(bundle_url) = &profile.server.bundle_url {
        check_url(&mut errors, "server.bundle_url", bundle_url);
    }
    check_url(
        &mut errors,
        "resources.config_template_url",
        &profile.resources.config_template_url,
    );

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError {
            field,
            message: format!("unsupported scheme '{}'", url.scheme()),
        }),
        Err(e) => errors.push(ValidationError {
            field,
            message: format!("invalid URL '{}': {}", value, e),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile_is_valid() {
        assert!(validate_profile(&Profile::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut profile = Profile::default();
        profile.server.artifact = "../server.jar".to_string();
        profile.server.artifact_url = "not a url".to_string();
        profile.resources.config_template_url = "ftp://example.com/template".to_string();

        let errors = validate_profile(&profile).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "server.artifact",
                "server.artifact_url",
                "resources.config_template_url"
            ]
        );
    }

    #[test]
    fn test_empty_artifact() {
        let mut profile = Profile::default();
        profile.server.artifact = "  ".to_string();
        let errors = validate_profile(&profile).unwrap_err();
        assert_eq!(errors[0].to_string(), "server.artifact: must not be empty");
    }

    #[test]
    fn test_bundle_url_is_checked_when_set() {
        let mut profile = Profile::default();
        profile.server.bundle_url = Some("https://example.com/RESOURCES.zip".to_string());
        assert!(validate_profile(&profile).is_ok());

        profile.server.bundle_url = Some("file:///tmp/RESOURCES.zip".to_string());
        let errors = validate_profile(&profile).unwrap_err();
        assert_eq!(errors[0].field, "server.bundle_url");
    }
}
