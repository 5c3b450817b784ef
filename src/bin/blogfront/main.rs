use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use spdlog::{info, warn};

use blogfront::config::Config;
use blogfront::logger::configure_logger;
use blogfront::post_processor::Templates;
use blogfront::server::server_run;
use blogfront::site_builder::build_site;
use blogfront::source::prismic::PrismicSource;

use crate::bootstrap::bootstrap_cmd;
use crate::config::open_config;

mod bootstrap;
mod config;
mod decompress;

const CFG_FILE_NAME: &str = "blogfront.toml";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Config path
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serves the blog over HTTP (default)
    Serve,
    /// Renders the whole blog as static files into the output directory
    Build,
    /// Bootstrap a new blog
    Bootstrap(BootstrapArgs),
}

#[derive(Parser, Debug)]
struct BootstrapArgs {
    /// Directory where the new blog will be generated
    #[arg(short, long)]
    out_dir: String,
}

fn load_config(config_path: Option<String>) -> Option<Config> {
    let config = match open_config(config_path.map(PathBuf::from)) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            eprintln!("Please run blogfront --help");
            return None;
        }
    };

    if let Err(err) = configure_logger(&config) {
        warn!("Error creating logger sinks. Using console instead. Desc={}", err);
    }

    Some(config)
}

async fn build_cmd(config: Config) -> Result<()> {
    info!("Building static site into {}", config.paths.output_dir.display());
    let templates = Templates::load(&config.paths.template_dir)?;
    let source = PrismicSource::new(&config.source)?;

    let summary = build_site(&source, &config, &templates).await?;
    info!("Done: {} list page(s), {} post(s)", summary.list_pages, summary.posts);

    Ok(())
}

#[ntex::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    match args.command.unwrap_or(Command::Serve) {
        Command::Bootstrap(bootstrap_args) => {
            bootstrap_cmd(bootstrap_args);
            Ok(())
        }
        Command::Build => {
            let Some(config) = load_config(args.config_path) else {
                return Ok(());
            };
            build_cmd(config).await
        }
        Command::Serve => {
            let Some(config) = load_config(args.config_path) else {
                return Ok(());
            };
            info!("Starting Blogfront =-=-=-=-=-=-=-=-=-=-=-=-=-=-=-");
            info!("Listening on {}:{}", config.server.address, config.server.port);
            server_run(config).await
        }
    }
}
