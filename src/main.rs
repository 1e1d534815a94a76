// Entrypoint for the CLI application.
// - Keeps `main` small: parse flags into a `Config`, build the HTTP client
//   and hand both to the pipeline.
// - Returns `anyhow::Result` so any failure is printed with its cause chain
//   and the process exits non-zero.

use anyhow::Context;
use clap::Parser;
use env_logger::{Builder, Env};
use log::LevelFilter;
use photoverify_cli::{api::ApiClient, config::Config, config::DEFAULT_ENDPOINT, pipeline};
use std::io::Write;

/// BioIDWebService PhotoVerify REST client.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// BioIDWebService AppID
    #[arg(long = "BWSAppID", alias = "app-id")]
    app_id: String,

    /// BioIDWebService AppSecret
    #[arg(long = "BWSAppSecret", alias = "app-secret")]
    app_secret: String,

    /// Path to the reference photo image
    #[arg(long)]
    photo: String,

    /// Path to the first live image
    #[arg(long)]
    image1: String,

    /// Path to the second live image (optional)
    #[arg(long, default_value = "")]
    image2: String,

    /// Verification endpoint
    #[arg(long, env = "PHOTOVERIFY_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Initialize logging on stderr with `[HH:MM:SS] [LEVEL] message` lines.
/// `RUST_LOG` wins over the verbosity flag when set.
fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    Builder::new()
        .filter_level(level)
        .parse_env(Env::default())
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] [{}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logger(args.verbose);

    let config = Config::new(&args.app_id, &args.app_secret, &args.photo, &args.image1, &args.image2)?
        .with_endpoint(args.endpoint);
    let client = ApiClient::new(&config)?;

    let stdout = std::io::stdout();
    pipeline::run(&config, &client, &mut stdout.lock()).context("photo verification failed")?;
    Ok(())
}
