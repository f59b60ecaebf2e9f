use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default lifetime of a notification stream before it is closed as idle (1 hour).
pub const DEFAULT_SSE_IDLE_TIMEOUT_SECS: u64 = 60 * 60;

/// Longest accepted idle timeout (30 days).
pub const MAX_SSE_IDLE_TIMEOUT_SECS: u64 = 30 * 24 * 60 * 60;

/// Longest accepted interval between keep-alive comments (1 hour).
pub const MAX_SSE_KEEP_ALIVE_SECS: u64 = 60 * 60;

#[derive(Clone, Debug, PartialEq)]
pub enum RustEnv {
    Development,
    Production,
    Staging,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RustEnvParseError;

impl FromStr for RustEnv {
    type Err = RustEnvParseError;
    fn from_str(level: &str) -> Result<RustEnv, Self::Err> {
        match level.to_lowercase().as_str() {
            "development" => Ok(RustEnv::Development),
            "production" => Ok(RustEnv::Production),
            "staging" => Ok(RustEnv::Staging),
            _ => Err(RustEnvParseError),
        }
    }
}

impl fmt::Display for RustEnv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RustEnv::Development => write!(f, "development"),
            RustEnv::Production => write!(f, "production"),
            RustEnv::Staging => write!(f, "staging"),
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// A list of full CORS origin URLs that allowed to receive server responses.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        default_value = "http://localhost:3000,https://localhost:3000"
    )]
    pub allowed_origins: Vec<String>,

    /// The shared HS256 secret used to verify bearer tokens presented by stream clients.
    #[arg(long, env)]
    jwt_secret: Option<String>,

    /// Seconds a notification stream may stay open before it is closed as idle.
    /// The deadline is anchored at connection creation; sends do not extend it.
    #[arg(
        long,
        env,
        default_value_t = DEFAULT_SSE_IDLE_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..=MAX_SSE_IDLE_TIMEOUT_SECS)
    )]
    pub sse_idle_timeout_secs: u64,

    /// Seconds between keep-alive comments written on open notification streams.
    #[arg(
        long,
        env,
        default_value_t = 15,
        value_parser = clap::value_parser!(u64).range(1..=MAX_SSE_KEEP_ALIVE_SECS)
    )]
    pub sse_keep_alive_secs: u64,

    /// Subjects whose delivery preference disables streaming at startup.
    #[arg(long, env, value_delimiter = ',')]
    pub streaming_disabled_subjects: Vec<String>,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 4000)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Set the Rust runtime environment to use.
    #[arg(
    short,
    long,
    env,
    default_value_t = RustEnv::Development,
    value_parser = clap::builder::PossibleValuesParser::new([
        "DEVELOPMENT", "PRODUCTION", "STAGING",
        "development", "production", "staging"
    ])
        .map(|s| s.parse::<RustEnv>().unwrap()),
    )]
    pub runtime_env: RustEnv,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    pub fn set_jwt_secret(mut self, jwt_secret: String) -> Self {
        self.jwt_secret = Some(jwt_secret);
        self
    }

    pub fn jwt_secret(&self) -> Option<String> {
        self.jwt_secret.clone()
    }

    pub fn set_sse_idle_timeout(mut self, timeout: Duration) -> Self {
        self.sse_idle_timeout_secs = timeout.as_secs();
        self
    }

    /// Returns the idle timeout applied to each notification stream.
    pub fn sse_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.sse_idle_timeout_secs)
    }

    /// Returns the interval between keep-alive comments on open streams.
    pub fn sse_keep_alive(&self) -> Duration {
        Duration::from_secs(self.sse_keep_alive_secs)
    }

    pub fn runtime_env(&self) -> RustEnv {
        self.runtime_env.clone()
    }
}
