//! Self-signed CA and server-leaf certificate issuance.
//!
//! Issues one root CA bound to nothing and one leaf bound to the loopback
//! identities (`localhost`, `127.0.0.1`, `::1`), signed by the CA. The leaf
//! validity is deliberately long (decades): this is a zero-maintenance
//! local tool and renewal friction would defeat its purpose.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use rcgen::{
    BasicConstraints, CertificateParams, DistinguishedName, DnType, ExtendedKeyUsagePurpose, IsCa,
    KeyPair, KeyUsagePurpose, SerialNumber,
};
use thiserror::Error;
use time::{Duration, OffsetDateTime};

/// CA certificate validity: ten years.
const CA_VALID_DAYS: i64 = 3650;
/// Leaf certificate validity: thirty years (documented trade-off).
const LEAF_VALID_DAYS: i64 = 10950;

const CA_COMMON_NAME: &str = "Local HTTPS CA";
const LEAF_COMMON_NAME: &str = "localhost";

/// Error raised while issuing or persisting certificates.
#[derive(Debug, Error)]
pub enum CertError {
    #[error("key generation failed: {0}")]
    KeyGen(#[source] rcgen::Error),

    #[error("certificate issuance failed: {0}")]
    Issue(#[source] rcgen::Error),

    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// On-disk locations of the three persisted PEM files.
#[derive(Debug, Clone)]
pub struct CertPaths {
    pub ca_cert: PathBuf,
    pub server_cert: PathBuf,
    pub server_key: PathBuf,
}

impl CertPaths {
    pub fn new(ca_cert: PathBuf, server_cert: PathBuf, server_key: PathBuf) -> Self {
        Self {
            ca_cert,
            server_cert,
            server_key,
        }
    }
}

/// What `generate` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateOutcome {
    /// Both certificates already existed; nothing was touched.
    AlreadyPresent,
    /// Fresh key material was issued and persisted.
    Generated,
}

/// Freshly issued certificate material, PEM encoded.
struct CertificateMaterial {
    ca_cert_pem: String,
    server_cert_pem: String,
    server_key_pem: String,
}

/// Generate and persist the CA and server certificates.
///
/// Idempotent unless `force`: when both the leaf and the CA certificate
/// already exist on disk, the call is a no-op.
pub fn generate(paths: &CertPaths, force: bool) -> Result<GenerateOutcome, CertError> {
    if !force && paths.server_cert.exists() && paths.ca_cert.exists() {
        return Ok(GenerateOutcome::AlreadyPresent);
    }

    let material = issue()?;
    persist(paths, &material)?;

    Ok(GenerateOutcome::Generated)
}

/// Issue a fresh CA + leaf pair in memory. Pure apart from the RNG.
fn issue() -> Result<CertificateMaterial, CertError> {
    let now = OffsetDateTime::now_utc();

    // Root CA: self-signed, restricted to certificate and CRL signing.
    let ca_key = KeyPair::generate().map_err(CertError::KeyGen)?;
    let mut ca_params = CertificateParams::default();
    ca_params.not_before = now - Duration::minutes(5);
    ca_params.not_after = now + Duration::days(CA_VALID_DAYS);
    ca_params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    ca_params.key_usages = vec![KeyUsagePurpose::KeyCertSign, KeyUsagePurpose::CrlSign];
    ca_params.distinguished_name = common_name(CA_COMMON_NAME);
    ca_params.serial_number = Some(serial(now));
    let ca_cert = ca_params.self_signed(&ca_key).map_err(CertError::Issue)?;

    // Server leaf: bound to the loopback identities, signed by the CA.
    let server_key = KeyPair::generate().map_err(CertError::KeyGen)?;
    let mut leaf_params = CertificateParams::new(vec![
        "localhost".to_string(),
        "127.0.0.1".to_string(),
        "::1".to_string(),
    ])
    .map_err(CertError::Issue)?;
    leaf_params.not_before = now - Duration::minutes(5);
    leaf_params.not_after = now + Duration::days(LEAF_VALID_DAYS);
    leaf_params.is_ca = IsCa::NoCa;
    leaf_params.key_usages = vec![
        KeyUsagePurpose::DigitalSignature,
        KeyUsagePurpose::KeyEncipherment,
    ];
    leaf_params.extended_key_usages = vec![ExtendedKeyUsagePurpose::ServerAuth];
    leaf_params.distinguished_name = common_name(LEAF_COMMON_NAME);
    leaf_params.serial_number = Some(serial(now));
    let server_cert = leaf_params
        .signed_by(&server_key, &ca_cert, &ca_key)
        .map_err(CertError::Issue)?;

    Ok(CertificateMaterial {
        ca_cert_pem: ca_cert.pem(),
        server_cert_pem: server_cert.pem(),
        server_key_pem: server_key.serialize_pem(),
    })
}

/// Write the three PEM files: certificates world-readable, key owner-only.
fn persist(paths: &CertPaths, material: &CertificateMaterial) -> Result<(), CertError> {
    write_pem(&paths.ca_cert, &material.ca_cert_pem, 0o644)?;
    write_pem(&paths.server_cert, &material.server_cert_pem, 0o644)?;
    write_pem(&paths.server_key, &material.server_key_pem, 0o600)?;
    Ok(())
}

fn common_name(name: &str) -> DistinguishedName {
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, name);
    dn
}

fn serial(now: OffsetDateTime) -> SerialNumber {
    let nanos = now.unix_timestamp_nanos();
    let value = if nanos <= 0 {
        1
    } else {
        (nanos as u128 % u128::from(u64::MAX)).max(1) as u64
    };
    SerialNumber::from(value)
}

fn write_pem(path: &Path, pem: &str, mode: u32) -> Result<(), CertError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| CertError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let write = |path: &Path| -> std::io::Result<()> {
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(mode);
        }
        #[cfg(not(unix))]
        let _ = mode;
        let mut file = options.open(path)?;
        file.write_all(pem.as_bytes())?;
        // Mode from OpenOptions only applies on creation; force-regenerate
        // rewrites existing files.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(mode))?;
        }
        Ok(())
    };

    write(path).map_err(|source| CertError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_paths(dir: &Path) -> CertPaths {
        CertPaths::new(
            dir.join("certs/ca.pem"),
            dir.join("certs/cert.pem"),
            dir.join("certs/key.pem"),
        )
    }

    #[test]
    fn generate_creates_three_pem_files() {
        let dir = tempfile::tempdir().unwrap();
        let paths = temp_paths(dir.path());

        let outcome = generate(&paths, false).unwrap();
        assert_eq!(outcome, GenerateOutcome::Generated);
        for path in [&paths.ca_cert, &paths.server_cert, &paths.server_key] {
            let pem = fs::read_to_string(path).unwrap();
            assert!(pem.contains("BEGIN"), "{path:?} is not PEM");
        }
    }

    #[test]
    fn second_generate_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let paths = temp_paths(dir.path());

        generate(&paths, false).unwrap();
        let first_cert = fs::read(&paths.server_cert).unwrap();
        let first_key = fs::read(&paths.server_key).unwrap();

        let outcome = generate(&paths, false).unwrap();
        assert_eq!(outcome, GenerateOutcome::AlreadyPresent);
        assert_eq!(fs::read(&paths.server_cert).unwrap(), first_cert);
        assert_eq!(fs::read(&paths.server_key).unwrap(), first_key);
    }

    #[test]
    fn force_produces_fresh_key_material() {
        let dir = tempfile::tempdir().unwrap();
        let paths = temp_paths(dir.path());

        generate(&paths, false).unwrap();
        let first_key = fs::read(&paths.server_key).unwrap();
        let first_ca = fs::read(&paths.ca_cert).unwrap();

        let outcome = generate(&paths, true).unwrap();
        assert_eq!(outcome, GenerateOutcome::Generated);
        assert_ne!(fs::read(&paths.server_key).unwrap(), first_key);
        assert_ne!(fs::read(&paths.ca_cert).unwrap(), first_ca);
    }

    #[cfg(unix)]
    #[test]
    fn key_file_is_owner_readable_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let paths = temp_paths(dir.path());
        generate(&paths, false).unwrap();

        let key_mode = fs::metadata(&paths.server_key).unwrap().permissions().mode() & 0o777;
        assert_eq!(key_mode, 0o600);
        let ca_mode = fs::metadata(&paths.ca_cert).unwrap().permissions().mode() & 0o777;
        assert_eq!(ca_mode, 0o644);
    }

    #[test]
    fn generated_pem_parses_as_cert_and_key() {
        let dir = tempfile::tempdir().unwrap();
        let paths = temp_paths(dir.path());
        generate(&paths, false).unwrap();

        let mut reader = std::io::BufReader::new(fs::File::open(&paths.server_cert).unwrap());
        let certs: Vec<_> = rustls_pemfile::certs(&mut reader)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(certs.len(), 1);

        let mut reader = std::io::BufReader::new(fs::File::open(&paths.server_key).unwrap());
        let key = rustls_pemfile::private_key(&mut reader).unwrap();
        assert!(key.is_some());
    }
}
