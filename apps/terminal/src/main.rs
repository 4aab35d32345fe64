use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use seekcore_bridge::TcpBridge;
use seekcore_config::PanelConfig;
use seekpanel::Panel;

mod commands;

use commands::{parse_input, Input, COMMANDS};

const DEFAULT_ADDR: &str = "127.0.0.1:3020";
const LOG_ENV: &str = "SEEKPANEL_LOG";

#[derive(Parser, Debug, PartialEq, Eq)]
#[command(name = "seekpanel", version, about = "Search panel for a local file-search backend")]
struct Options {
    /// Backend address (host:port)
    #[arg(default_value = DEFAULT_ADDR)]
    addr: String,

    /// JSON file with panel options
    #[arg(long = "config", value_name = "FILE")]
    config_path: Option<PathBuf>,
}

fn load_config(path: Option<&Path>) -> anyhow::Result<PanelConfig> {
    let config = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str::<PanelConfig>(&raw)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => PanelConfig::default(),
    };
    config.validate().context("invalid panel config")?;
    Ok(config)
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

fn apply_input(panel: &mut Panel<TcpBridge>, input: Input) -> Flow {
    match input {
        Input::Query(text) => panel.query_changed(text),
        Input::Commit => panel.commit(),
        Input::Open(index) => {
            if !panel.open_result(index) {
                println!("No result {index} in this tab.");
            }
        }
        Input::Tab(tab) => panel.set_tab(tab),
        Input::Settings => panel.open_settings(),
        Input::Set(edit) => {
            if !panel.edit_settings(edit) {
                println!("Settings are not editable right now.");
            }
        }
        Input::Save => panel.save_settings(),
        Input::Cancel => {
            panel.cancel_settings();
        }
        Input::Help => {
            for item in &COMMANDS {
                println!("  {:<32} {}", item.command, item.description);
            }
        }
        Input::Exit => return Flow::Exit,
        Input::Invalid(message) => println!("{message}"),
    }
    Flow::Continue
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let options = Options::parse();
    let config = load_config(options.config_path.as_deref())?;

    // An unreachable backend is fatal at startup.
    let bridge = TcpBridge::connect(&options.addr, &config)
        .await
        .with_context(|| format!("search backend at {} is not reachable", options.addr))?;

    let (mut panel, mut events) = Panel::new(Arc::new(bridge), config);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print!("{}", panel.view());
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("reading stdin")? else {
                    break;
                };
                if apply_input(&mut panel, parse_input(&line)) == Flow::Exit {
                    break;
                }
            }
            Some(event) = events.recv() => panel.handle(event),
        }
        print!("{}", panel.view());
    }

    tracing::info!("panel closed");
    Ok(())
}
