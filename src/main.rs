use clap::{Parser, Subcommand};
use gallery_folders::{config, logging, output, scan, server};
use std::path::{Path, PathBuf};
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser)]
#[command(name = "gallery-folders")]
#[command(about = "Folder index and JSON endpoint for photo galleries")]
#[command(long_about = "\
Folder index and JSON endpoint for photo galleries

The uploads directory is the data source. Each subdirectory becomes a gallery
folder; its largest image becomes the cover.

Uploads structure:

  static/uploads/
  ├── summer-2024/           # Folder \"summer-2024\"
  │   ├── IMG_0001.JPG       # .jpg .jpeg .png .gif, any case
  │   └── IMG_0002.png
  ├── drafts/                # Listed even with no images (empty cover)
  ├── .thumbs/               # Dot-prefixed: ignored
  └── notes.txt              # Not a directory: ignored

Endpoint:
  GET /api/gallery/folders  ->  [{\"name\", \"coverImage\", \"images\"}, ...]

Run 'gallery-folders gen-config' to generate a documented gallery.toml.")]
#[command(version)]
struct Cli {
    /// Config file (optional; defaults apply when it does not exist)
    #[arg(long, default_value = config::DEFAULT_CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Uploads directory, overriding `uploads_dir` from the config file
    #[arg(long, global = true)]
    uploads: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the folder index and upload files over HTTP
    Serve {
        /// Listen address, overriding `server.bind`
        #[arg(long)]
        bind: Option<String>,
    },
    /// Scan the uploads directory once and print the index
    List {
        /// Print the JSON the endpoint would return
        #[arg(long)]
        json: bool,
    },
    /// Print a stock gallery.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve { bind } => {
            let mut site_config = load_config(&cli.config, cli.uploads)?;
            if let Some(bind) = bind {
                site_config.server.bind = bind;
                site_config.validate()?;
            }
            logging::init(LevelFilter::INFO);
            start_scan_workers(&site_config.processing);

            let server = server::Server::bind(&site_config)?;
            tracing::info!(
                addr = %server.local_addr()?,
                uploads = %site_config.uploads_dir.display(),
                "listening"
            );
            server.run()?;
        }
        Command::List { json } => {
            let site_config = load_config(&cli.config, cli.uploads)?;
            logging::init(LevelFilter::WARN);
            start_scan_workers(&site_config.processing);

            let folders = scan::scan_folders(&site_config.uploads_dir, &site_config.url_prefix)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&folders)?);
            } else {
                output::print_folders(&folders);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load the config file and apply the `--uploads` override.
fn load_config(
    path: &Path,
    uploads: Option<PathBuf>,
) -> Result<config::GalleryConfig, config::ConfigError> {
    let mut site_config = config::load_config(path)?;
    if let Some(uploads) = uploads {
        site_config.uploads_dir = uploads;
    }
    Ok(site_config)
}

/// Size the global rayon pool that folder scans fan out on.
fn start_scan_workers(processing: &config::ProcessingConfig) {
    let threads = processing.worker_threads();
    match rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("scan-{i}"))
        .build_global()
    {
        Ok(()) => tracing::debug!(threads, "scan pool ready"),
        Err(e) => tracing::warn!(error = %e, "scan pool already initialized"),
    }
}
