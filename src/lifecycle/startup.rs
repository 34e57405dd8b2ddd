//! Preflight checks run before the listener is committed.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ServerOptions;

/// Error raised by a failed preflight check. All variants are fatal and
/// carry a user-actionable message.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("certificate file not found: {path}\nrun `lanshare cert` to generate certificates")]
    MissingCertificate { path: PathBuf },

    #[error("private key file not found: {path}\nrun `lanshare cert` to generate certificates")]
    MissingKey { path: PathBuf },

    #[error("cannot listen on {addr} (already in use?): {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },
}

/// Verify certificate material exists and the address can be bound.
pub fn preflight(options: &ServerOptions) -> Result<(), StartupError> {
    if !options.cert_path.exists() {
        return Err(StartupError::MissingCertificate {
            path: options.cert_path.clone(),
        });
    }
    if !options.key_path.exists() {
        return Err(StartupError::MissingKey {
            path: options.key_path.clone(),
        });
    }

    // Probe the address before committing to a long-lived listener, so
    // "already in use" surfaces as a clean startup error.
    let probe = std::net::TcpListener::bind(&options.addr).map_err(|source| StartupError::Bind {
        addr: options.addr.clone(),
        source,
    })?;
    drop(probe);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certs::{generate, CertPaths};

    fn options_with_certs(dir: &std::path::Path, addr: &str) -> ServerOptions {
        let paths = CertPaths::new(
            dir.join("ca.pem"),
            dir.join("cert.pem"),
            dir.join("key.pem"),
        );
        generate(&paths, false).unwrap();
        ServerOptions {
            addr: addr.to_string(),
            cert_path: paths.server_cert,
            key_path: paths.server_key,
            ca_cert_path: paths.ca_cert,
            ..ServerOptions::default()
        }
    }

    #[test]
    fn missing_certificates_fail_with_hint() {
        let options = ServerOptions {
            cert_path: "/nonexistent/cert.pem".into(),
            ..ServerOptions::default()
        };
        let err = preflight(&options).unwrap_err();
        assert!(err.to_string().contains("lanshare cert"));
    }

    #[test]
    fn free_port_passes() {
        let dir = tempfile::tempdir().unwrap();
        let options = options_with_certs(dir.path(), "127.0.0.1:0");
        assert!(preflight(&options).is_ok());
    }

    #[test]
    fn occupied_port_is_detected() {
        let holder = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = holder.local_addr().unwrap().to_string();

        let dir = tempfile::tempdir().unwrap();
        let options = options_with_certs(dir.path(), &addr);
        let err = preflight(&options).unwrap_err();
        assert!(matches!(err, StartupError::Bind { .. }));
    }
}
