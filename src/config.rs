//! Command line and environment configuration for the server.

use clap::{Parser, ValueEnum};

use crate::{Error, session::SessionKey, timezone::get_local_offset};

/// Where the server is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Environment {
    /// Local development over plain HTTP.
    Development,
    /// Deployed behind HTTPS.
    Production,
}

/// The web server for the school finance app.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct ServerArgs {
    /// File path to the application SQLite database.
    #[arg(long, env = "DATABASE_PATH")]
    pub db_path: String,

    /// The port to serve the app from.
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// The canonical name of the school's timezone, used to decide which
    /// month a date belongs to.
    #[arg(long, env = "TIMEZONE", default_value = "America/Sao_Paulo")]
    pub timezone: String,

    /// Session cookies are only marked `Secure` in production.
    #[arg(long, env = "APP_ENV", value_enum, default_value_t = Environment::Production)]
    pub environment: Environment,

    /// The secret used to sign session tokens.
    #[arg(long, env = "AUTH_SECRET", hide_env_values = true)]
    pub auth_secret: String,
}

/// Validated server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// File path to the application SQLite database.
    pub db_path: String,
    /// The port to serve the app from.
    pub port: u16,
    /// A canonical timezone name, e.g. "America/Sao_Paulo".
    pub local_timezone: String,
    /// Where the server is running.
    pub environment: Environment,
    /// The key for signing session tokens.
    pub session_key: SessionKey,
}

impl ServerConfig {
    /// Whether cookies should only be sent over HTTPS.
    pub fn secure_cookies(&self) -> bool {
        self.environment == Environment::Production
    }
}

impl TryFrom<ServerArgs> for ServerConfig {
    type Error = Error;

    fn try_from(args: ServerArgs) -> Result<Self, Self::Error> {
        let session_key = SessionKey::new(&args.auth_secret)?;

        if get_local_offset(&args.timezone).is_none() {
            return Err(Error::InvalidTimezoneError(args.timezone));
        }

        Ok(Self {
            db_path: args.db_path,
            port: args.port,
            local_timezone: args.timezone,
            environment: args.environment,
            session_key,
        })
    }
}

#[cfg(test)]
mod server_config_tests {
    use clap::Parser;

    use crate::Error;

    use super::{Environment, ServerArgs, ServerConfig};

    fn parse(args: &[&str]) -> ServerArgs {
        ServerArgs::try_parse_from(
            std::iter::once("server").chain(args.iter().copied()),
        )
        .unwrap()
    }

    #[test]
    fn valid_args_produce_config() {
        let args = parse(&[
            "--db-path",
            "test.db",
            "--port",
            "8080",
            "--timezone",
            "Etc/UTC",
            "--environment",
            "production",
            "--auth-secret",
            "shh",
        ]);

        let config = ServerConfig::try_from(args).unwrap();

        assert_eq!(config.db_path, "test.db");
        assert_eq!(config.port, 8080);
        assert_eq!(config.local_timezone, "Etc/UTC");
        assert_eq!(config.environment, Environment::Production);
        assert!(config.secure_cookies());
    }

    #[test]
    fn development_does_not_use_secure_cookies() {
        let args = parse(&[
            "--db-path",
            "test.db",
            "--auth-secret",
            "shh",
            "--environment",
            "development",
        ]);

        let config = ServerConfig::try_from(args).unwrap();

        assert!(!config.secure_cookies());
    }

    #[test]
    fn blank_secret_fails() {
        let args = parse(&["--db-path", "test.db", "--auth-secret", "  "]);

        let result = ServerConfig::try_from(args);

        assert!(matches!(result, Err(Error::MissingSecret)));
    }

    #[test]
    fn unknown_timezone_fails() {
        let args = parse(&[
            "--db-path",
            "test.db",
            "--auth-secret",
            "shh",
            "--timezone",
            "Middle/Earth",
        ]);

        let result = ServerConfig::try_from(args);

        assert!(matches!(
            result,
            Err(Error::InvalidTimezoneError(timezone)) if timezone == "Middle/Earth"
        ));
    }
}
