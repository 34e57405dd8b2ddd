//! Shared utilities for integration testing: spin up a real HTTPS server on
//! an ephemeral port with freshly generated certificates, and build a client
//! that trusts the generated CA.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Once;

use axum_server::Handle;
use tempfile::TempDir;
use tokio::task::JoinHandle;

use lanshare::certs::{self, CertPaths};
use lanshare::net::tls::load_tls_config;
use lanshare::{HttpServer, ServeError, ServerOptions};

static INIT_CRYPTO: Once = Once::new();

/// reqwest links its own rustls provider features; pin the process-wide
/// default once so the server's TLS config builds deterministically.
pub fn init_crypto() {
    INIT_CRYPTO.call_once(|| {
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
    });
}

/// A running server plus everything a test needs to talk to it.
pub struct TestServer {
    pub addr: SocketAddr,
    pub handle: Handle,
    pub task: JoinHandle<Result<(), ServeError>>,
    pub ca_cert: PathBuf,
    _cert_dir: TempDir,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        // "localhost" matches the leaf SANs, so verification is real.
        format!("https://localhost:{}{}", self.addr.port(), path)
    }
}

/// Start a server on 127.0.0.1:0 sharing `root`, with `configure` applied to
/// the options before launch. Resolves once the listener is bound.
pub async fn spawn_server<F>(root: &Path, configure: F) -> TestServer
where
    F: FnOnce(&mut ServerOptions),
{
    init_crypto();

    let cert_dir = tempfile::tempdir().unwrap();
    let paths = CertPaths::new(
        cert_dir.path().join("ca.pem"),
        cert_dir.path().join("cert.pem"),
        cert_dir.path().join("key.pem"),
    );
    certs::generate(&paths, false).unwrap();

    let mut options = ServerOptions {
        addr: "127.0.0.1:0".to_string(),
        root: root.to_path_buf(),
        cert_path: paths.server_cert.clone(),
        key_path: paths.server_key.clone(),
        ca_cert_path: paths.ca_cert.clone(),
        quiet: true,
        ..ServerOptions::default()
    };
    configure(&mut options);

    let tls = load_tls_config(&options.cert_path, &options.key_path).unwrap();
    let handle = Handle::new();
    let server = HttpServer::new(options);
    let task = {
        let handle = handle.clone();
        tokio::spawn(async move { server.serve(tls, handle).await })
    };

    let addr = handle.listening().await.expect("server failed to bind");

    TestServer {
        addr,
        handle,
        task,
        ca_cert: paths.ca_cert,
        _cert_dir: cert_dir,
    }
}

/// HTTPS client that trusts only the server's generated CA, proving the
/// chain of trust end to end.
pub fn client_for(server: &TestServer) -> reqwest::Client {
    let pem = std::fs::read(&server.ca_cert).unwrap();
    let ca = reqwest::Certificate::from_pem(&pem).unwrap();
    reqwest::Client::builder()
        .use_rustls_tls()
        .add_root_certificate(ca)
        .no_proxy()
        .build()
        .unwrap()
}
