#[macro_use]
extern crate tracing;

mod config;
mod controller;
mod error;
mod models;
mod processor;
mod routes;
mod sample;
mod scratch;

#[cfg(test)]
mod tests;

use std::ffi::OsStr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use mimalloc::MiMalloc;
use poem::listener::TcpListener;
use poem::middleware::Tracing;
use poem::{EndpointExt, Server};

use crate::controller::ResizeController;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Debug, Parser)]
#[clap(author, version, about)]
pub struct ServerConfig {
    #[clap(long, default_value = "0.0.0.0", env)]
    /// The binding host address of the server.
    host: String,

    #[clap(long, default_value = "8080", env)]
    port: u16,

    #[clap(long, env)]
    /// The external URL advertised by the API docs, e.g. `https://example.com/action`.
    docs_url: Option<String>,

    #[clap(long, env)]
    /// The file path to a given YAML config file.
    ///
    /// The built-in defaults are used if this is not set.
    config_file: Option<PathBuf>,

    #[clap(long)]
    /// Resize the embedded sample image once, print the result and exit.
    ///
    /// Setting `TEST` to any non-empty value does the same.
    self_test: bool,
}

/// Any non-empty value of the `TEST` variable turns the self test on.
fn self_test_requested(flag: bool, env: Option<&OsStr>) -> bool {
    flag || env.map_or(false, |value| !value.is_empty())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "info,poem=info");
    }
    tracing_subscriber::fmt::init();

    let args: ServerConfig = ServerConfig::parse();

    config::init(args.config_file.as_deref())
        .context("failed to load the runtime config")?;

    let controller = Arc::new(ResizeController::from_config(config::config()));

    if self_test_requested(args.self_test, std::env::var_os("TEST").as_deref()) {
        return sample::run_self_test(&controller).await;
    }

    let bind = format!("{}:{}", args.host, args.port);
    let app = routes::build_app(controller, args.docs_url.as_deref()).with(Tracing);

    info!("Resize action listening on {}", &bind);

    Server::new(TcpListener::bind(bind))
        .run(app)
        .await?;

    Ok(())
}
