pub mod api;
pub mod config;
pub mod fetcher;
pub mod filters;
pub mod model;
pub mod ui;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use api::{HttpNewsApi, NewsApi};
use config::{Config, ConfigOverrides};
use filters::{FilterState, LaunchParams, normalize_choice, parse_date_selection};
use ui::data::Page;
use ui::pagination::Pagination;
use ui::tui::TuiOptions;
use ui::wordcloud::{PreparedCloud, ShelfLayout};

/// Command-line interface.
#[derive(Parser, Debug)]
#[command(
    name = "earth-news",
    version,
    about = "Terminal client for the State of the Earth environmental news feed"
)]
pub struct Cli {
    /// Base URL of the news API (overrides config and EARTH_NEWS_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Directory for filters.json, tui_state.json and logs
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Path to config.toml (defaults to the platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Defaults to `tui` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Launch the interactive client
    Tui {
        /// Shared link or query string (`?topic=..&source=..&keyword=..`)
        link: Option<String>,

        #[arg(long)]
        topic: Option<String>,

        #[arg(long)]
        source: Option<String>,

        #[arg(long)]
        keyword: Option<String>,

        /// Start on the word-cloud page
        #[arg(long, default_value_t = false)]
        cloud: bool,

        /// Render once and exit (headless-friendly)
        #[arg(long, default_value_t = false)]
        once: bool,
    },
    /// Print one page of articles
    Articles {
        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long)]
        topic: Option<String>,

        #[arg(long)]
        source: Option<String>,

        #[arg(long)]
        keyword: Option<String>,

        /// First day, YYYY-MM-DD
        #[arg(long)]
        start: Option<String>,

        /// Last day (inclusive), YYYY-MM-DD
        #[arg(long, requires = "start")]
        end: Option<String>,

        /// Emit the raw page as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the word cloud as text
    Cloud {
        #[arg(long)]
        source: Option<String>,

        #[arg(long)]
        topic: Option<String>,

        #[arg(long, default_value_t = 100)]
        width: u16,

        #[arg(long, default_value_t = 24)]
        height: u16,

        /// Emit the word records as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the page numbers shown for a position (no network)
    Window {
        #[arg(long)]
        current: u32,

        #[arg(long)]
        total: u32,
    },
    /// Generate shell completions to stdout
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate man page to stdout
    Man,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Tui {
        link: None,
        topic: None,
        source: None,
        keyword: None,
        cloud: false,
        once: false,
    });

    match command {
        Commands::Window { current, total } => {
            let pages: Vec<String> = Pagination::new(current, total)
                .window()
                .map(|p| p.to_string())
                .collect();
            println!("{}", pages.join(" "));
            Ok(())
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "earth-news", &mut std::io::stdout());
            Ok(())
        }
        Commands::Man => {
            let cmd = Cli::command();
            let man = clap_mangen::Man::new(cmd);
            let mut out = std::io::stdout();
            man.render(&mut out)?;
            Ok(())
        }
        command => {
            let overrides = ConfigOverrides {
                api_url: cli.api_url,
                data_dir: cli.data_dir,
                config_path: cli.config,
            };
            let config = Config::load(&overrides)?;
            run_with_config(command, config).await
        }
    }
}

async fn run_with_config(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Tui {
            link,
            topic,
            source,
            keyword,
            cloud,
            once,
        } => {
            let _guard = init_tracing(Some(&config.data_dir()));
            let flags = LaunchParams {
                topic,
                source,
                keyword,
            };
            let launch = link
                .as_deref()
                .map(LaunchParams::parse)
                .unwrap_or_default()
                .overridden_by(flags);
            let opts = TuiOptions {
                launch,
                start_page: if cloud { Page::WordCloud } else { Page::Articles },
                ..TuiOptions::default()
            };
            ui::tui::run_tui(&config, opts, once)
        }
        Commands::Articles {
            page,
            topic,
            source,
            keyword,
            start,
            end,
            json,
        } => {
            let _guard = init_tracing(None);
            let api = HttpNewsApi::new(&config.api_url, config.timeout())?;
            let days = match (start, end) {
                (Some(start), Some(end)) => parse_date_selection(&format!("{start}..{end}")),
                (Some(start), None) => parse_date_selection(&start),
                _ => Ok(Vec::new()),
            }
            .map_err(anyhow::Error::msg)?;
            let state = FilterState {
                topic: normalize_choice(topic.as_deref().unwrap_or_default()),
                source: normalize_choice(source.as_deref().unwrap_or_default()),
                keyword: keyword.unwrap_or_default(),
                date_range: filters::DateRange::from_selection(&days),
            };
            let result = api
                .get_articles(&state.article_query(page.max(filters::FIRST_PAGE)))
                .await
                .context("fetching articles")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
                return Ok(());
            }
            println!(
                "Page {} of {} | {}",
                result.current_page,
                result.total_pages,
                state.describe()
            );
            if result.articles.is_empty() {
                println!("{}", ui::articles::EMPTY_PLACEHOLDER);
            }
            for article in &result.articles {
                println!(
                    "{}  [{}]  {}\n    {}",
                    article.display_date(),
                    article.source,
                    article.title,
                    article.link
                );
            }
            Ok(())
        }
        Commands::Cloud {
            source,
            topic,
            width,
            height,
            json,
        } => {
            let _guard = init_tracing(None);
            let api = HttpNewsApi::new(&config.api_url, config.timeout())?;
            let query = FilterState {
                source: normalize_choice(source.as_deref().unwrap_or_default()),
                topic: normalize_choice(topic.as_deref().unwrap_or_default()),
                ..FilterState::default()
            }
            .word_query();
            let words = api
                .word_data(&query)
                .await
                .context("fetching word data")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&words)?);
                return Ok(());
            }
            let cloud = PreparedCloud::build(&words, width, height, &ShelfLayout::default());
            let palette = ui::components::theme::ThemePalette::dark();
            for line in cloud.lines(None, palette) {
                let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
                println!("{}", text.trim_end());
            }
            Ok(())
        }
        Commands::Window { .. } | Commands::Completions { .. } | Commands::Man => Ok(()),
    }
}

/// Logs to a daily file under `log_dir/logs` when given (the TUI owns the
/// terminal), otherwise to stderr. `RUST_LOG` overrides the level.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if log_dir.is_some() { "info" } else { "warn" }));
    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir.join("logs"), "earth-news.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(writer)
                .try_init();
            Some(guard)
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init();
            None
        }
    }
}

pub fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("org", "state-of-the-earth", "earth-news").map_or_else(
        || PathBuf::from(".earth-news"),
        |dirs| dirs.data_dir().to_path_buf(),
    )
}
