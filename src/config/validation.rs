//! Configuration validation.
//!
//! Semantic checks on an already-deserialized `ServerOptions`. Returns all
//! violations, not just the first, so a user can fix a config in one pass.

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::ServerOptions;

/// A single semantic violation found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Bind address does not parse as host:port.
    InvalidAddress(String),
    /// Share root does not exist or is not a directory.
    BadRoot(String),
    /// Basic auth configured with an empty username or password.
    EmptyCredentials,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidAddress(addr) => {
                write!(f, "invalid bind address {addr:?}")
            }
            ValidationError::BadRoot(root) => {
                write!(f, "share root {root:?} is not an existing directory")
            }
            ValidationError::EmptyCredentials => {
                write!(f, "basic auth requires a non-empty username and password")
            }
        }
    }
}

/// Validate options; pure apart from the root-directory existence check.
pub fn validate_options(options: &ServerOptions) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if options.addr.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress(options.addr.clone()));
    }

    if !options.root.is_dir() {
        errors.push(ValidationError::BadRoot(
            options.root.display().to_string(),
        ));
    }

    if let Some(auth) = &options.auth {
        if auth.username.is_empty() || auth.password.is_empty() {
            errors.push(ValidationError::EmptyCredentials);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
