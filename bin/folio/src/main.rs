//! Folio CLI
//!
//! Validates a portfolio content directory and prints its derived views.
//!
//! This is the binary entry point. The library functionality is in `lib.rs`.

use clap::Parser;
use color_eyre::eyre::Result;
use folio::cmd::show::{ShowArgs, View};

/// Command-line interface for Folio.
#[derive(Parser)]
#[command(
    name = "folio",
    version,
    about = "Query and validate portfolio site content"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "folio.toml")]
    config: std::path::PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(clap::Subcommand)]
enum Commands {
    /// Validate configuration and content
    Check {
        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },
    /// Print a content view as JSON
    Show {
        /// View to print
        #[arg(value_enum)]
        view: View,
        /// Number of items for featured, recent and preview views
        #[arg(short = 'n', long)]
        count: Option<usize>,
        /// Project id for project-testimonials
        #[arg(long)]
        project: Option<i64>,
        /// Page path for post (e.g., /blog/hello-world)
        #[arg(long)]
        path: Option<String>,
        /// Page number for blog-page, starting at 1
        #[arg(long)]
        page: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    folio::init_tracing(cli.verbose);

    match cli.command {
        Commands::Check { strict } => {
            folio::cmd::check::run(&cli.config, strict).await?;
        }
        Commands::Show {
            view,
            count,
            project,
            path,
            page,
        } => {
            let args = ShowArgs {
                count,
                project,
                path,
                page,
            };
            folio::cmd::show::run(&cli.config, view, &args).await?;
        }
    }

    Ok(())
}
