use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::{Config, ParserKind};
use crate::models::Table;

#[derive(Debug, Parser)]
#[command(name = "feed-catalog")]
#[command(version)]
#[command(about = "Crawl RSS feeds and catalog websites, feeds, articles and parsed content")]
pub struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Catalog database file
    #[arg(long = "db", global = true)]
    pub db_path: Option<String>,

    /// Article parser
    #[arg(long, global = true, value_enum)]
    pub parser: Option<ParserKind>,

    /// Mercury Web Parser API key
    #[arg(long, global = true, env = "MERCURY_API_KEY")]
    pub mercury_api_key: Option<String>,

    /// Readability.js server log file
    #[arg(long, global = true)]
    pub readability_log_file: Option<PathBuf>,

    /// Readability.js server port
    #[arg(long, global = true)]
    pub readability_port: Option<u16>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Add or update websites and feeds from a JSON file
    Import {
        /// JSON array of {url, name, lang, country, feeds: [{url, name}]}
        file: PathBuf,
    },

    /// Fetch every feed and store new articles (default)
    Crawl,

    /// Print the URLs stored in a table
    List {
        #[arg(value_enum)]
        table: ListTable,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListTable {
    Websites,
    Feeds,
    Articles,
}

impl From<ListTable> for Table {
    fn from(table: ListTable) -> Self {
        match table {
            ListTable::Websites => Table::Websites,
            ListTable::Feeds => Table::Feeds,
            ListTable::Articles => Table::Articles,
        }
    }
}

impl Cli {
    /// Command-line values win over the config file.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(db_path) = &self.db_path {
            config.db_path = db_path.clone();
        }
        if let Some(parser) = self.parser {
            config.parser = parser;
        }
        if let Some(key) = &self.mercury_api_key {
            config.mercury.api_key = Some(key.clone());
        }
        if let Some(log_file) = &self.readability_log_file {
            config.readability.log_file = Some(log_file.clone());
        }
        if let Some(port) = self.readability_port {
            config.readability.port = port;
        }
    }

    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Crawl)
    }
}
