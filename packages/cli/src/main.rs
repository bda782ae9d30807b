mod client;
mod import;
mod list;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::client::ApiClient;

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Manage the Folio media catalog from the command line")]
#[command(version)]
struct Cli {
    /// Base URL of the Folio server
    #[arg(
        long,
        env = "FOLIO_SERVER",
        default_value = "http://127.0.0.1:3000",
        global = true
    )]
    server: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload every image in a directory, one request per file
    Import {
        /// Directory to scan
        #[arg(long)]
        dir: PathBuf,

        /// Remote folder for the uploads
        #[arg(long, default_value = "uploads")]
        folder: String,

        /// Comma-separated file extensions to pick up (case-insensitive)
        #[arg(
            long,
            value_delimiter = ',',
            default_value = "jpg,jpeg,png,gif,webp,bmp"
        )]
        extensions: Vec<String>,

        /// Descend into subdirectories
        #[arg(long)]
        recursive: bool,
    },
    /// Print every catalogued image
    List,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = ApiClient::new(&cli.server)?;

    match cli.command {
        Command::Import {
            dir,
            folder,
            extensions,
            recursive,
        } => {
            let options = import::ImportOptions {
                dir,
                folder,
                extensions,
                recursive,
            };
            import::run(&client, &options)
        }
        Command::List => list::run(&client),
    }
}
