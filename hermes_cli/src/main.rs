use clap::{Parser, Subcommand};

#[cfg(not(feature = "dhat-heap"))]
use mimalloc::MiMalloc;

use crate::{decode::DecodeArgs, navigate::NavigateArgs};

mod decode;
mod navigate;
mod parsers;

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

#[cfg(not(feature = "dhat-heap"))]
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Replays a recorded fix trace against a route
    #[command(visible_alias = "n")]
    Navigate {
        #[command(flatten)]
        args: NavigateArgs,
    },
    /// Decodes an encoded polyline into coordinates
    Decode {
        #[command(flatten)]
        args: DecodeArgs,
    },
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    dotenvy::from_filename("./.env.local").ok();

    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    match cli.command {
        Some(Commands::Navigate { args }) => navigate::run(args).await?,
        Some(Commands::Decode { args }) => decode::run(args)?,
        None => {
            // Handle no command provided
        }
    }

    Ok(())
}
