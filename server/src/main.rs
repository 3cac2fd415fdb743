use anyhow::Context;
use clap::Parser;
use log::{info, warn};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use web_bridge::bridge::WebBridge;
use workflow::config::AppConfig;
use workflow::session::Session;

mod web_bridge;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Map-based capture of radiation dose measurements")]
struct Args {
    /// Load settings from YAML; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,
    /// Backing CSV file for the point table
    #[arg(long)]
    db: Option<PathBuf>,
    /// Address for the HTTP front end
    #[arg(long)]
    bind: Option<SocketAddr>,
    /// Fixed UTC offset (hours) for capture timestamps
    #[arg(long, allow_hyphen_values = true)]
    utc_offset: Option<i32>,
    /// Print the stored table as CSV and exit
    #[arg(long, default_value_t = false)]
    dump: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match args.config.as_ref() {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    }
    .with_overrides(args.db, args.bind, args.utc_offset);

    let session = Session::open(&config)?;
    info!(
        "Point store {} opened with {} measurement(s)",
        config.database.display(),
        session.records().len()
    );

    if args.dump {
        let table = session.export_csv()?;
        print!("{}", String::from_utf8_lossy(&table));
        return Ok(());
    }

    let bridge = WebBridge::new(session);
    let runtime = TokioBuilder::new_multi_thread()
        .enable_all()
        .build()
        .context("creating HTTP runtime")?;
    runtime.block_on(async {
        bridge
            .serve(config.bind, async {
                if let Err(err) = signal::ctrl_c().await {
                    warn!("Ctrl+C handler failed: {err}");
                }
            })
            .await
    })?;

    Ok(())
}
