use std::path::PathBuf;

use thiserror::Error;

/// An environment variable required by the application is not set.
#[derive(Debug, Error)]
#[error("Missing environment variable: {0}")]
pub struct MissingEnvVarError(pub String);

/// Reads an environment variable, returning a structured error if it's missing.
///
/// This is a thin wrapper around `std::env::var` that provides a more
/// ergonomic and specific error type for missing variables.
///
/// # Arguments
/// * `name` - The name of the environment variable to read.
pub fn get_env_var(name: &str) -> Result<String, MissingEnvVarError> {
    std::env::var(name).map_err(|_| MissingEnvVarError(name.to_string()))
}

/// Reads an optional override. Unset and blank values both yield `None`.
pub fn env_override(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Like [`env_override`], but for variables holding a filesystem path.
pub fn env_path_override(name: &str) -> Option<PathBuf> {
    env_override(name).map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VAR: &str = "SHARED_UTILS_TEST_VAR";

    #[test]
    #[serial]
    fn missing_var_names_the_variable() {
        unsafe { std::env::remove_var(VAR) };
        let err = get_env_var(VAR).unwrap_err();
        assert_eq!(err.to_string(), format!("Missing environment variable: {VAR}"));
    }

    #[test]
    #[serial]
    fn blank_override_is_treated_as_unset() {
        unsafe { std::env::set_var(VAR, "   ") };
        assert!(env_override(VAR).is_none());

        unsafe { std::env::set_var(VAR, " /opt/terminal ") };
        assert_eq!(
            env_path_override(VAR),
            Some(PathBuf::from("/opt/terminal"))
        );
        unsafe { std::env::remove_var(VAR) };
    }
}
