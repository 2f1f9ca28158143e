//! CLI entry point for quire

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quire::commands::edit::PostChanges;

#[derive(Parser)]
#[command(name = "quire")]
#[command(version)]
#[command(about = "A minimal markdown blog store and static site generator", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new site
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Create a new post
    New {
        /// Title of the new post
        title: String,

        /// Read the markdown body from this file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Publish the post immediately
        #[arg(short, long)]
        publish: bool,
    },

    /// Edit an existing post
    Edit {
        /// Slug of the post
        slug: String,

        /// New title (the slug is kept)
        #[arg(short, long)]
        title: Option<String>,

        /// Replace the markdown body with this file's contents
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Mark the post as published
        #[arg(long, conflicts_with = "unpublish")]
        publish: bool,

        /// Mark the post as a draft
        #[arg(long)]
        unpublish: bool,
    },

    /// List all posts
    List,

    /// Print a post
    Show {
        /// Slug of the post
        slug: String,
    },

    /// Delete a post
    Delete {
        /// Slug of the post
        slug: String,
    },

    /// Generate static files
    #[command(alias = "g")]
    Generate,

    /// Rebuild the metadata index from post files
    Reindex,

    /// Check the metadata index against post files
    Verify,

    /// Remove the output folder
    Clean,

    /// Start the admin server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "quire=debug,info"
    } else {
        "quire=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing site in {:?}", target_dir);
            quire::commands::init::init_site(&target_dir)?;
            println!("Initialized site in {:?}", target_dir);
        }

        Commands::New {
            title,
            file,
            publish,
        } => {
            let site = quire::Site::new(&base_dir)?;
            tracing::info!("Creating new post with title: {}", title);
            quire::commands::new::create_post(&site, &title, file.as_deref(), publish)?;
        }

        Commands::Edit {
            slug,
            title,
            file,
            publish,
            unpublish,
        } => {
            let site = quire::Site::new(&base_dir)?;
            let published = match (publish, unpublish) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            let changes = PostChanges {
                title: title.as_deref(),
                body_file: file.as_deref(),
                published,
            };
            quire::commands::edit::edit_post(&site, &slug, changes)?;
        }

        Commands::List => {
            let site = quire::Site::new(&base_dir)?;
            quire::commands::list::run(&site)?;
        }

        Commands::Show { slug } => {
            let site = quire::Site::new(&base_dir)?;
            quire::commands::list::show(&site, &slug)?;
        }

        Commands::Delete { slug } => {
            let site = quire::Site::new(&base_dir)?;
            quire::commands::edit::delete_post(&site, &slug)?;
        }

        Commands::Generate => {
            let site = quire::Site::new(&base_dir)?;
            tracing::info!("Generating static files...");
            quire::commands::generate::run(&site)?;
        }

        Commands::Reindex => {
            let site = quire::Site::new(&base_dir)?;
            quire::commands::generate::reindex(&site)?;
        }

        Commands::Verify => {
            let site = quire::Site::new(&base_dir)?;
            let report = quire::commands::generate::verify(&site)?;
            if !report.is_consistent() {
                std::process::exit(1);
            }
        }

        Commands::Clean => {
            let site = quire::Site::new(&base_dir)?;
            tracing::info!("Cleaning output folder...");
            quire::commands::clean::run(&site)?;
            println!("Cleaned successfully!");
        }

        Commands::Server { port, ip } => {
            let site = quire::Site::new(&base_dir)?;
            tracing::info!("Starting server at http://{}:{}", ip, port);
            quire::server::start(&site, &ip, port).await?;
        }

        Commands::Version => {
            println!("quire version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
