use clap::Parser;

use feed_catalog::cli::{Cli, Command};
use feed_catalog::config::Config;
use feed_catalog::feed::{import_seeds, parse_seed_file, Crawler};
use feed_catalog::services::{build_extractor, HttpClient};
use feed_catalog::{Catalog, Result, Table};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (info and up unless RUST_LOG says otherwise)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);

    let command = cli.command();
    if matches!(command, Command::Crawl) {
        config.validate_parser()?;
    }

    let catalog = Catalog::open(&config.db_path).await?;
    let result = run(&command, &config, &catalog).await;
    let closed = catalog.close().await;

    if let Err(e) = &result {
        tracing::error!("{}", e);
    }
    result?;
    closed
}

async fn run(command: &Command, config: &Config, catalog: &Catalog) -> Result<()> {
    match command {
        Command::Import { file } => {
            let seeds = parse_seed_file(file)?;
            for (url, outcome) in import_seeds(catalog, seeds).await? {
                println!("{url}: {outcome}");
            }
        }

        Command::List { table } => {
            for url in catalog.list_keys(Table::from(*table)).await? {
                println!("{url}");
            }
        }

        Command::Crawl => {
            let http = HttpClient::new(&config.http, &config.user_agent)?;
            let mut extractor = build_extractor(config, http.clone()).await?;

            let report = Crawler::new(catalog, http, extractor.as_ref())
                .crawl_all(config.crawl_concurrency)
                .await;
            extractor.shutdown().await?;

            let report = report?;
            println!(
                "Crawled {} feeds: {} new articles, {} parsed, {} skipped, {} failed",
                report.feeds,
                report.articles_added,
                report.parsed_added,
                report.skipped,
                report.failed
            );
        }
    }

    Ok(())
}
