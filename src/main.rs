use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use iptv_catalog::{
    catalog::CatalogService,
    config::Config,
    models::{Channel, ChannelFilters, ChannelPage},
    playback::{select_strategy, PlaybackCapabilities},
    utils::UrlUtils,
};

#[derive(Parser)]
#[command(name = "iptv-catalog")]
#[command(version)]
#[command(about = "Browse a public IPTV index and plan stream playback")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path (defaults to $CONFIG_FILE, then config.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Index base URL (overrides config file)
    #[arg(short = 'b', long, value_name = "URL")]
    base_url: Option<String>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List catalog channels, optionally filtered
    List {
        #[arg(short, long, default_value_t = 1)]
        page: usize,
        #[arg(long)]
        page_size: Option<usize>,
        #[arg(long)]
        country: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show the curated initial view
    Initial {
        #[arg(short, long, default_value_t = 1)]
        page: usize,
        #[arg(long)]
        page_size: Option<usize>,
    },
    /// Search channels by name, group, country or category
    Search { term: String },
    /// List countries
    Countries,
    /// List categories
    Categories,
    /// Show one channel and related channels
    Show { id: String },
    /// Show which delivery strategy a channel's stream would use
    Plan {
        id: String,
        /// Runtime has a software HLS demuxer
        #[arg(long)]
        software_demux: bool,
        /// Surface plays HLS natively
        #[arg(long)]
        native_hls: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = format!("iptv_catalog={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting IPTV catalog v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match &cli.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::load()?,
    };
    if let Some(base_url) = cli.base_url {
        config.index.base_url = base_url;
    }
    config.validate()?;
    info!("Using index: {}", config.index.base_url);

    let service = CatalogService::from_config(&config)?;
    let default_page_size = config.catalog.page_size;

    match cli.command {
        Command::List {
            page,
            page_size,
            country,
            category,
            search,
        } => {
            let mut filters = ChannelFilters::new();
            filters.search_query = search;
            filters.country = country;
            filters.category = category;
            let result = service
                .browse(page, page_size.unwrap_or(default_page_size), &filters)
                .await;
            print_page(&result, cli.json)?;
        }
        Command::Initial { page, page_size } => {
            let result = service
                .get_initial_page(page, page_size.unwrap_or(default_page_size))
                .await;
            print_page(&result, cli.json)?;
        }
        Command::Search { term } => {
            let channels = service.search_channels(&term).await;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&channels)?);
            } else {
                channels.iter().for_each(print_channel_line);
                println!("{} channels", channels.len());
            }
        }
        Command::Countries => {
            let countries = service.get_countries().await;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&*countries)?);
            } else {
                for country in countries.iter() {
                    println!("{} {:<4} {}", country.flag, country.code, country.name);
                }
            }
        }
        Command::Categories => {
            let categories = service.get_categories().await;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&*categories)?);
            } else {
                for category in categories.iter() {
                    println!("{:<16} {}", category.id, category.name);
                }
            }
        }
        Command::Show { id } => {
            let channel = match service.find_channel(&id).await {
                Ok(channel) => channel,
                Err(e) => {
                    let shown = e.to_user_facing();
                    anyhow::bail!("{} ({:?})", shown.message, shown.recovery);
                }
            };
            let related = service.related_channels(&channel, None).await;
            if cli.json {
                let body = serde_json::json!({ "channel": channel, "related": related });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                println!("{} ({})", channel.name, channel.id);
                println!("  category: {}", channel.category);
                println!("  country:  {}", channel.country);
                println!("  language: {}", channel.language);
                println!(
                    "  stream:   {}",
                    UrlUtils::obfuscate_credentials(&channel.playback_url)
                );
                if let Some(quality) = &channel.quality {
                    println!("  quality:  {quality}");
                }
                println!("Related:");
                related.iter().for_each(print_channel_line);
            }
        }
        Command::Plan {
            id,
            software_demux,
            native_hls,
        } => {
            let channel = service.find_channel(&id).await?;
            let strategy = select_strategy(
                &channel.playback_url,
                PlaybackCapabilities {
                    software_demux,
                    native_hls,
                },
            );
            if cli.json {
                let body = serde_json::json!({
                    "channel": channel.id,
                    "url": UrlUtils::obfuscate_credentials(&channel.playback_url),
                    "strategy": strategy,
                    "demuxer": config.playback.demuxer,
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                println!(
                    "{} -> {} ({})",
                    channel.name,
                    strategy,
                    UrlUtils::obfuscate_credentials(&channel.playback_url)
                );
            }
        }
    }

    Ok(())
}

fn print_page(page: &ChannelPage, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(page)?);
        return Ok(());
    }
    page.items.iter().for_each(print_channel_line);
    println!(
        "page {}/{} ({} channels)",
        page.page, page.total_pages, page.total_count
    );
    Ok(())
}

fn print_channel_line(channel: &Channel) {
    println!(
        "{:<32} {:<40} {:<16} {}",
        channel.id, channel.name, channel.category, channel.country
    );
}
