//! Configuration for movie-bridge
//!
//! CLI arguments with environment variable fallbacks. A `.env` file, when
//! present, is loaded into the environment before parsing.

use std::net::SocketAddr;
use std::time::Duration;

use clap::builder::NonEmptyStringValueParser;
use clap::{Args as ClapArgs, Parser, Subcommand};
use reconcile::TitleMatching;
use server::ContextSettings;
use sources::{MongoConfig, Neo4jConfig};

/// movie-bridge - movies from MongoDB and Neo4j, and the titles they share
#[derive(Parser, Debug, Clone)]
#[command(name = "movie-bridge")]
#[command(about = "Serve and reconcile movie catalogs held in MongoDB and Neo4j", long_about = None)]
pub struct Args {
    #[command(flatten)]
    pub mongo: MongoArgs,

    #[command(flatten)]
    pub neo4j: Neo4jArgs,

    /// Upper bound for a single store call, in milliseconds
    #[arg(long, env = "STORE_TIMEOUT_MS", default_value = "5000")]
    pub store_timeout_ms: u64,

    /// Title matching used by reconciliation (exact, case-insensitive)
    #[arg(long, env = "TITLE_MATCH", default_value = "exact")]
    pub title_match: TitleMatching,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Address the HTTP service listens on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8000", global = true)]
    pub listen: SocketAddr,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// MongoDB connection settings
#[derive(ClapArgs, Debug, Clone)]
pub struct MongoArgs {
    /// MongoDB connection string
    #[arg(long = "connection-string", env = "CONNECTION_STRING", hide_env_values = true, value_parser = NonEmptyStringValueParser::new())]
    pub connection_string: String,

    /// MongoDB database name
    #[arg(long = "db-name", env = "DB_NAME", value_parser = NonEmptyStringValueParser::new())]
    pub db_name: String,

    /// Collection holding movie documents
    #[arg(long, env = "MOVIES_COLLECTION", default_value = "movies", value_parser = NonEmptyStringValueParser::new())]
    pub movies_collection: String,
}

/// Neo4j connection settings
#[derive(ClapArgs, Debug, Clone)]
pub struct Neo4jArgs {
    /// Neo4j bolt URI
    #[arg(long = "neo4j-uri", env = "NEO4J_URI", value_parser = NonEmptyStringValueParser::new())]
    pub uri: String,

    #[arg(long = "neo4j-username", env = "NEO4J_USERNAME", value_parser = NonEmptyStringValueParser::new())]
    pub username: String,

    #[arg(long = "neo4j-password", env = "NEO4J_PASSWORD", hide_env_values = true, value_parser = NonEmptyStringValueParser::new())]
    pub password: String,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP service (default)
    Serve,

    /// Reconcile the two catalogs once and print the common titles
    Common {
        /// Print the full Mongo records as JSON instead of titles
        #[arg(long)]
        json: bool,
    },
}

impl Args {
    /// Subcommand to run; `serve` when none is given
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn mongo_config(&self) -> MongoConfig {
        MongoConfig {
            uri: self.mongo.connection_string.clone(),
            database: self.mongo.db_name.clone(),
            collection: self.mongo.movies_collection.clone(),
            connect_timeout: self.store_timeout(),
        }
    }

    pub fn neo4j_config(&self) -> Neo4jConfig {
        Neo4jConfig {
            uri: self.neo4j.uri.clone(),
            username: self.neo4j.username.clone(),
            password: self.neo4j.password.clone(),
            connect_timeout: self.store_timeout(),
        }
    }

    pub fn context_settings(&self) -> ContextSettings {
        ContextSettings {
            store_timeout: self.store_timeout(),
            title_matching: self.title_match,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: &[&str] = &[
        "movie-bridge",
        "--connection-string",
        "mongodb://localhost:27017",
        "--db-name",
        "sample_mflix",
        "--neo4j-uri",
        "neo4j://localhost:7687",
        "--neo4j-username",
        "neo4j",
        "--neo4j-password",
        "secret",
    ];

    fn parse(extra: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(REQUIRED.iter().chain(extra.iter()))
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["serve", "--listen", "127.0.0.1:9000"]).unwrap();

        assert_eq!(args.mongo.movies_collection, "movies");
        assert_eq!(args.title_match, TitleMatching::Exact);
        assert_eq!(args.command(), Command::Serve);
        assert_eq!(args.listen, "127.0.0.1:9000".parse::<SocketAddr>().unwrap());

        let mongo = args.mongo_config();
        assert_eq!(mongo.database, "sample_mflix");
        assert_eq!(mongo.connect_timeout, Duration::from_millis(5000));

        let neo4j = args.neo4j_config();
        assert_eq!(neo4j.username, "neo4j");
        assert_eq!(neo4j.connect_timeout, Duration::from_millis(5000));
    }

    #[test]
    fn test_overrides() {
        let args = parse(&[
            "--store-timeout-ms",
            "250",
            "--title-match",
            "case-insensitive",
            "common",
        ])
        .unwrap();

        assert_eq!(args.store_timeout(), Duration::from_millis(250));
        let settings = args.context_settings();
        assert_eq!(settings.title_matching, TitleMatching::CaseInsensitive);
        assert_eq!(settings.store_timeout, Duration::from_millis(250));
        assert_eq!(args.command(), Command::Common { json: false });
    }

    #[test]
    fn test_listen_is_parsed_with_or_without_subcommand() {
        let args = parse(&["--listen", "127.0.0.1:9100"]).unwrap();
        assert_eq!(args.command(), Command::Serve);
        assert_eq!(args.listen.port(), 9100);

        assert!(parse(&["--listen", "not-an-address"]).is_err());
        assert!(parse(&["serve", "--listen", "not-an-address"]).is_err());
    }

    #[test]
    fn test_rejects_empty_and_unknown_values() {
        let mut argv: Vec<&str> = REQUIRED.to_vec();
        argv[4] = "";
        assert!(Args::try_parse_from(argv).is_err());

        assert!(parse(&["--title-match", "fuzzy"]).is_err());
    }
}
