//! Terminal front end of the weather dashboard
//!
//! Type a city to search it. An empty line (or `:search`) searches whatever
//! is in the search box, e.g. after `:recall N`. Other commands: `:unit`,
//! `:quit`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use url::Url;
use wxdash_core::Coordinates;
use wxdash_dashboard::{Dashboard, FixedGeolocator, JsonFileStore, ProxyClient};

#[derive(Debug, Parser)]
#[command(name = "wxdash", version, about = "Weather dashboard")]
struct Cli {
    /// Base URL of the weather proxy
    #[arg(long)]
    proxy_url: Option<Url>,

    /// File holding the recent-searches list
    #[arg(long)]
    history_file: Option<PathBuf>,

    /// Latitude of this device
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Longitude of this device
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,
}

enum Command {
    Quit,
    ToggleUnit,
    Recall(usize),
    SearchCurrent,
    Search(String),
    Unknown(String),
}

fn parse_command(line: &str) -> Command {
    let line = line.trim();
    match line.split_once(char::is_whitespace) {
        _ if line == ":quit" || line == ":q" => Command::Quit,
        _ if line == ":unit" => Command::ToggleUnit,
        _ if line.is_empty() || line == ":search" => Command::SearchCurrent,
        Some((":recall", n)) => match n.trim().parse() {
            Ok(index) => Command::Recall(index),
            Err(_) => Command::Unknown(line.to_string()),
        },
        _ if line.starts_with(':') => Command::Unknown(line.to_string()),
        _ => Command::Search(line.to_string()),
    }
}

fn print_view(dashboard: &Dashboard) {
    let today = chrono::Local::now().date_naive();
    println!("{}", dashboard.view(today));
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    wxdash_obs::init("wxdash");

    let cfg = wxdash_config::AppConfig::load().context("failed to load configuration")?;
    let proxy_url = match cli.proxy_url {
        Some(url) => url,
        None => cfg.proxy_url()?,
    };
    let history_path = cli.history_file.unwrap_or_else(|| cfg.history_path());
    let position = match (cli.lat, cli.lon) {
        (Some(lat), Some(lon)) => Some(Coordinates { lat, lon }),
        _ => cfg.location().map(|l| Coordinates {
            lat: l.lat,
            lon: l.lon,
        }),
    };
    tracing::info!(%proxy_url, history = %history_path.display(), ?position, "starting dashboard");

    let dashboard = Dashboard::new(
        Arc::new(ProxyClient::new(proxy_url)),
        Arc::new(FixedGeolocator::new(position)),
        Arc::new(JsonFileStore::new(history_path)),
    );

    dashboard.init_load().await;
    print_view(&dashboard);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        match parse_command(&line) {
            Command::Quit => break,
            Command::ToggleUnit => {
                dashboard.toggle_unit().await;
            }
            Command::Recall(index) => {
                if dashboard.recall(index).is_none() {
                    eprintln!("no recent search #{index}");
                    continue;
                }
            }
            Command::SearchCurrent => dashboard.search().await,
            Command::Search(city) => dashboard.search_for(city).await,
            Command::Unknown(cmd) => {
                eprintln!("unknown command: {cmd}");
                continue;
            }
        }
        print_view(&dashboard);
    }

    Ok(())
}
