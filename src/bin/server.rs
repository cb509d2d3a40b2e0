use std::ffi::OsString;

use anyhow::Result;
use clap::{Arg, Command, crate_version, value_parser};
use tracing_subscriber::EnvFilter;

use shortgo::{app, config};

fn cli() -> Command {
    Command::new("shortgo")
        .version(crate_version!())
        .about("URL shortening service")
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .num_args(1)
                .value_parser(value_parser!(u16))
                .help("port to listen on (default 8080, or APP_PORT / settings.yml)"),
        )
}

/// Rewrites the single-dash `-port` spelling, which clap would read as `-p ort`
fn normalize_args(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    args.into_iter()
        .map(|arg| {
            let long = match arg.to_str() {
                Some("-port") => Some(OsString::from("--port")),
                Some(s) if s.starts_with("-port=") => Some(OsString::from(format!("-{s}"))),
                _ => None,
            };
            long.unwrap_or(arg)
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let matches = cli().get_matches_from(normalize_args(std::env::args_os()));
    let port = matches.get_one::<u16>("port").copied();

    let settings = config::load(port)?;

    if let Err(e) = app::run(settings).await {
        tracing::error!(error = ?e, "Failed to start server");
        std::process::exit(1);
    }

    Ok(())
}
