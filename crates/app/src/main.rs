use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use scholar_core::model::UserId;
use services::{AppServices, Clock, CompletionClient, OpenAiCompletionClient};
use storage::repository::Storage;
use storage::sample::install_sample_course;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use web::{AppState, AuthKeys, router};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidPort { raw: String },
    InvalidAddr { raw: String },
    MissingJwtSecret,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidPort { raw } => write!(f, "invalid --port value: {raw}"),
            ArgsError::InvalidAddr { raw } => write!(f, "invalid listen address: {raw}"),
            ArgsError::MissingJwtSecret => {
                write!(f, "a JWT secret is required (--jwt-secret or SCHOLAR_JWT_SECRET)")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

struct Args {
    db_url: String,
    host: String,
    port: u16,
    jwt_secret: Option<String>,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!(
        "  cargo run -p app -- serve [--db <sqlite_url>] [--host <addr>] [--port <n>] [--jwt-secret <s>]"
    );
    eprintln!("  cargo run -p app -- seed  [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:scholar.sqlite3");
    eprintln!("  --host 127.0.0.1");
    eprintln!("  --port 3000");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  SCHOLAR_DB_URL, SCHOLAR_HOST, SCHOLAR_PORT, SCHOLAR_JWT_SECRET");
    eprintln!("  SCHOLAR_AI_API_KEY, SCHOLAR_AI_BASE_URL, SCHOLAR_AI_MODEL");
    eprintln!("  RUST_LOG (default: info)");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Serve,
    Seed,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "serve" => Some(Self::Serve),
            "seed" => Some(Self::Seed),
            _ => None,
        }
    }
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("SCHOLAR_DB_URL")
            .ok()
            .map_or_else(
                || normalize_sqlite_url("scholar.sqlite3".into()),
                normalize_sqlite_url,
            );
        let mut host = std::env::var("SCHOLAR_HOST").unwrap_or_else(|_| "127.0.0.1".into());
        let mut port = std::env::var("SCHOLAR_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3000);
        let mut jwt_secret = std::env::var("SCHOLAR_JWT_SECRET")
            .ok()
            .filter(|s| !s.trim().is_empty());

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--host" => {
                    host = require_value(args, "--host")?;
                }
                "--port" => {
                    let value = require_value(args, "--port")?;
                    port = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidPort { raw: value.clone() })?;
                }
                "--jwt-secret" => {
                    jwt_secret = Some(require_value(args, "--jwt-secret")?);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            host,
            port,
            jwt_secret,
        })
    }

    fn listen_addr(&self) -> Result<SocketAddr, ArgsError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse().map_err(|_| ArgsError::InvalidAddr { raw })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    warn!("shutdown signal received");
}

async fn serve(args: Args, storage: Storage) -> Result<(), Box<dyn std::error::Error>> {
    let secret = args.jwt_secret.as_deref().ok_or(ArgsError::MissingJwtSecret)?;
    let addr = args.listen_addr()?;

    let completion = OpenAiCompletionClient::from_env()?;
    if !completion.enabled() {
        warn!("SCHOLAR_AI_API_KEY not set; tutor endpoints will answer with errors");
    }
    let completion: Arc<dyn CompletionClient> = Arc::new(completion);

    let services = AppServices::from_storage(&storage, Clock::system(), completion);
    let app = router(AppState::new(services, AuthKeys::from_secret(secret.as_bytes())));

    let listener = TcpListener::bind(addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None => Command::Serve,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Serve,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    init_tracing();

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    let storage = Storage::sqlite(&parsed.db_url).await?;

    match cmd {
        Command::Serve => serve(parsed, storage).await,
        Command::Seed => {
            let course_id =
                install_sample_course(&storage, UserId::new(1), Clock::system().now()).await?;
            info!(%course_id, db = %parsed.db_url, "sample course installed");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_become_absolute_urls() {
        let url = normalize_sqlite_url("sqlite:data/app.db".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/app.db"));
        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/x.db".into()),
            "sqlite:///tmp/x.db"
        );
    }

    #[test]
    fn memory_database_needs_no_file() {
        assert!(prepare_sqlite_file("sqlite::memory:").is_ok());
        assert!(prepare_sqlite_file("postgres://nope").is_err());
    }

    #[test]
    fn subcommands_parse() {
        assert_eq!(Command::from_arg("serve"), Some(Command::Serve));
        assert_eq!(Command::from_arg("seed"), Some(Command::Seed));
        assert_eq!(Command::from_arg("ui"), None);
    }

    #[test]
    fn flags_override_defaults() {
        let mut argv = [
            "--db",
            "sqlite::memory:",
            "--host",
            "0.0.0.0",
            "--port",
            "8080",
            "--jwt-secret",
            "s",
        ]
        .into_iter()
        .map(String::from);
        let args = Args::parse(&mut argv).unwrap();
        assert_eq!(args.db_url, "sqlite::memory:");
        assert_eq!(args.listen_addr().unwrap().port(), 8080);
        assert_eq!(args.jwt_secret.as_deref(), Some("s"));

        let mut bad = ["--port", "http"].into_iter().map(String::from);
        assert!(matches!(
            Args::parse(&mut bad),
            Err(ArgsError::InvalidPort { .. })
        ));
    }
}
