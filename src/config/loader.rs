//! Profile loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::Profile;
use crate::config::validation::{validate_profile, ValidationError};

/// Error type for profile loading.
#[derive(Debug)]
pub enum ProfileError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ProfileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfileError::Io(e) => write!(f, "IO error: {}", e),
            ProfileError::Parse(e) => write!(f, "Parse error: {}", e),
            ProfileError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ProfileError {}

/// Load and validate a profile from a TOML file.
pub fn load_profile(path: &Path) -> Result<Profile, ProfileError> {
    let content = fs::read_to_string(path).map_err(ProfileError::Io)?;
    parse_profile(&content)
}

/// Load the profile at `path` if it exists, defaults otherwise.
pub fn load_profile_or_default(path: &Path) -> Result<Profile, ProfileError> {
    if path.is_file() {
        load_profile(path)
    } else {
        tracing::debug!(path = %path.display(), "No profile file, using defaults");
        Ok(Profile::default())
    }
}

/// Parse and validate profile text.
pub fn parse_profile(content: &str) -> Result<Profile, ProfileError> {
    let profile: Profile = toml::from_str(content).map_err(ProfileError::Parse)?;

    validate_profile(&profile).map_err(ProfileError::Validation)?;

    Ok(profile)
}
