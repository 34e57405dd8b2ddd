//! lanshare — self-hosted HTTPS static-file server for ad-hoc LAN sharing
//! (phone-to-PC transfer) with no external certificate authority.
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!                        │                  LANSHARE                     │
//!                        │                                               │
//!   Client request       │  ┌───────┐   ┌────────────┐   ┌───────────┐  │
//!   ─────────────────────┼─▶│  TLS  │──▶│ middleware │──▶│ PathGuard │  │
//!                        │  │policy │   │  pipeline  │   │  + files  │  │
//!                        │  └───────┘   └────────────┘   └───────────┘  │
//!                        │                                               │
//!                        │  ┌─────────────────────────────────────────┐  │
//!                        │  │          Cross-Cutting Concerns          │  │
//!                        │  │  config · certs · lifecycle · logging   │  │
//!                        │  └─────────────────────────────────────────┘  │
//!                        └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use lanshare::certs::{self, CertPaths, GenerateOutcome};
use lanshare::config::loader::{load_options, ConfigError};
use lanshare::config::schema::BasicAuthConfig;
use lanshare::config::validation::validate_options;
use lanshare::observability::logging::init_logging;
use lanshare::{HttpServer, ServeError, ServerOptions};

#[derive(Parser)]
#[command(
    name = "lanshare",
    version,
    about = "Self-hosted HTTPS static-file server for ad-hoc LAN sharing"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTPS server (the default when no command is given).
    Serve(ServeArgs),

    /// Generate the local CA and server certificates.
    Cert(CertArgs),
}

#[derive(Args)]
struct CertArgs {
    /// Regenerate even if certificates already exist.
    #[arg(long)]
    force: bool,

    /// Where to write the CA certificate (PEM).
    #[arg(long)]
    ca: Option<PathBuf>,

    /// Where to write the server certificate (PEM).
    #[arg(long)]
    cert: Option<PathBuf>,

    /// Where to write the server private key (PEM).
    #[arg(long)]
    key: Option<PathBuf>,
}

impl CertArgs {
    /// Output locations, with the defaults filling any gap.
    fn paths(&self) -> CertPaths {
        let defaults = ServerOptions::default();
        CertPaths::new(
            self.ca.clone().unwrap_or(defaults.ca_cert_path),
            self.cert.clone().unwrap_or(defaults.cert_path),
            self.key.clone().unwrap_or(defaults.key_path),
        )
    }
}

#[derive(Args)]
struct ServeArgs {
    /// Listen port.
    #[arg(short, long, default_value_t = 8443)]
    port: u16,

    /// Bind host.
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Share root directory (defaults to the current directory).
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Specific files or directories to share; everything else under the
    /// root becomes invisible.
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Quiet mode: no banner, no access log.
    #[arg(short, long)]
    quiet: bool,

    /// Load all options from a TOML file instead of flags.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Basic-auth username.
    #[arg(long)]
    auth_user: Option<String>,

    /// Basic-auth password.
    #[arg(long)]
    auth_pass: Option<String>,

    /// Basic-auth realm.
    #[arg(long, default_value = "lanshare")]
    auth_realm: String,

    /// Read timeout in seconds (0 = default 30).
    #[arg(long, default_value_t = 0)]
    read_timeout: u64,

    /// Write timeout in seconds (0 = default 30).
    #[arg(long, default_value_t = 0)]
    write_timeout: u64,

    /// Idle connection timeout in seconds (0 = default 120).
    #[arg(long, default_value_t = 0)]
    idle_timeout: u64,

    /// Shutdown grace period in seconds (0 = default 5).
    #[arg(long, default_value_t = 0)]
    grace: u64,

    /// Maximum request header size in bytes (0 = default 1 MiB).
    #[arg(long, default_value_t = 0)]
    max_header_bytes: usize,

    /// Maximum request body size in bytes (0 = default 10 MiB).
    #[arg(long, default_value_t = 0)]
    max_body_bytes: u64,

    /// Server certificate file (PEM).
    #[arg(long)]
    cert: Option<PathBuf>,

    /// Server private key file (PEM).
    #[arg(long)]
    key: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    init_logging();

    let cli = Cli::parse();
    let result = match cli.command {
        Some(Command::Cert(args)) => run_cert(&args),
        Some(Command::Serve(args)) => run_serve(args).await,
        None => run_serve(cli.serve).await,
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

async fn run_serve(args: ServeArgs) -> Result<(), ServeError> {
    let options = build_options(args)?;
    HttpServer::new(options).run().await
}

fn build_options(args: ServeArgs) -> Result<ServerOptions, ServeError> {
    if let Some(path) = &args.config {
        return Ok(load_options(path)?);
    }

    let root = match &args.dir {
        Some(dir) => std::fs::canonicalize(dir)?,
        None => std::env::current_dir()?,
    };

    let mut options = ServerOptions {
        addr: format!("{}:{}", args.host, args.port),
        root,
        allow: args.paths,
        quiet: args.quiet,
        read_timeout_secs: args.read_timeout,
        write_timeout_secs: args.write_timeout,
        idle_timeout_secs: args.idle_timeout,
        grace_secs: args.grace,
        max_header_bytes: args.max_header_bytes,
        max_body_bytes: args.max_body_bytes,
        ..ServerOptions::default()
    };
    if let Some(cert) = args.cert {
        options.cert_path = cert;
    }
    if let Some(key) = args.key {
        options.key_path = key;
    }
    if args.auth_user.is_some() || args.auth_pass.is_some() {
        options.auth = Some(BasicAuthConfig {
            username: args.auth_user.unwrap_or_default(),
            password: args.auth_pass.unwrap_or_default(),
            realm: args.auth_realm,
        });
    }

    validate_options(&options)
        .map_err(|errors| ServeError::Config(ConfigError::Validation(errors)))?;

    Ok(options)
}

fn run_cert(args: &CertArgs) -> Result<(), ServeError> {
    let paths = args.paths();

    match certs::generate(&paths, args.force)? {
        GenerateOutcome::AlreadyPresent => {
            println!("certificates already exist, nothing to do (use --force to regenerate)");
        }
        GenerateOutcome::Generated => {
            println!("certificates generated");
        }
    }

    println!();
    println!("To trust lanshare on another device, install the CA certificate:");
    println!("  {}", paths.ca_cert.display());
    println!();
    println!("On Android: Settings -> Security -> Encryption & credentials");
    println!("  -> Install a certificate -> CA certificate, then pick the file.");
    println!("On iOS/macOS: open the file and trust it in the certificate settings.");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cert_subcommand_honors_path_overrides() {
        let cli = Cli::try_parse_from([
            "lanshare",
            "cert",
            "--force",
            "--cert",
            "/srv/tls/cert.pem",
            "--key",
            "/srv/tls/key.pem",
        ])
        .unwrap();

        let Some(Command::Cert(args)) = cli.command else {
            panic!("expected the cert subcommand");
        };
        assert!(args.force);

        let paths = args.paths();
        assert_eq!(paths.server_cert, PathBuf::from("/srv/tls/cert.pem"));
        assert_eq!(paths.server_key, PathBuf::from("/srv/tls/key.pem"));
        // Unset locations fall back to the defaults.
        assert_eq!(paths.ca_cert, ServerOptions::default().ca_cert_path);
    }

    #[test]
    fn cert_subcommand_defaults_to_standard_locations() {
        let cli = Cli::try_parse_from(["lanshare", "cert"]).unwrap();
        let Some(Command::Cert(args)) = cli.command else {
            panic!("expected the cert subcommand");
        };
        assert!(!args.force);

        let defaults = ServerOptions::default();
        let paths = args.paths();
        assert_eq!(paths.ca_cert, defaults.ca_cert_path);
        assert_eq!(paths.server_cert, defaults.cert_path);
        assert_eq!(paths.server_key, defaults.key_path);
    }
}
