use clap::{Parser, Subcommand};
use std::fs::File;
use std::path::{Path, PathBuf};
use vstore_core::config::{allow_empty_uploads_from_env_value, storage_root_from_env_value};
use vstore_core::{
    ArtifactDescriptor, CoreConfig, FilesError, Namespace, StoreError, StoreResult, StoreService,
    DEFAULT_MAX_UPLOAD_BYTES,
};

#[derive(Parser)]
#[command(name = "vstore")]
#[command(about = "vstore versioned file storage CLI")]
struct Cli {
    /// Storage root directory
    #[arg(long, global = true, env = "VSTORE_STORAGE_ROOT")]
    root: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Commit a local file as the next version of its logical name
    Commit {
        /// File to upload
        path: PathBuf,
        /// User id (defaults to defaultUser)
        #[arg(long)]
        user: Option<String>,
        /// Category (defaults to uncategorized)
        #[arg(long)]
        category: Option<String>,
        /// Logical file name (defaults to the file name of `path`)
        #[arg(long)]
        name: Option<String>,
    },
    /// Show the latest version of a file
    Latest {
        user: String,
        category: String,
        file_name: String,
    },
    /// Show a specific version of a file
    Version {
        user: String,
        category: String,
        file_name: String,
        version: u64,
    },
    /// List every file in a namespace
    List { user: String, category: String },
    /// Show every version of a file, oldest first
    History {
        user: String,
        category: String,
        file_name: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Use 'vstore --help' for commands");
        return Ok(());
    };

    let cfg = CoreConfig::new(
        storage_root_from_env_value(cli.root),
        allow_empty_uploads_from_env_value(std::env::var("VSTORE_ALLOW_EMPTY_UPLOADS").ok())?,
        DEFAULT_MAX_UPLOAD_BYTES,
    )?;
    let service = StoreService::initialise(&cfg)?;

    match run(&service, command) {
        Ok(lines) => {
            for line in lines {
                println!("{line}");
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Executes one subcommand and returns the lines to print.
fn run(service: &StoreService, command: Commands) -> StoreResult<Vec<String>> {
    match command {
        Commands::Commit {
            path,
            user,
            category,
            name,
        } => {
            let namespace = Namespace::with_defaults(user.as_deref(), category.as_deref())?;
            let file_name = match name {
                Some(name) => name,
                None => file_name_of(&path)?,
            };
            let file = File::open(&path).map_err(|e| StoreError::Files(e.into()))?;
            let descriptor = service.commit(&namespace, &file_name, file)?;
            Ok(vec![format!(
                "Committed {} (version {}, {} bytes, sha256 {})",
                descriptor.full_path.display(),
                descriptor.version,
                descriptor.size_bytes,
                descriptor.sha256.as_deref().unwrap_or("-"),
            )])
        }
        Commands::Latest {
            user,
            category,
            file_name,
        } => {
            let namespace = Namespace::new(&user, &category)?;
            let descriptor = service.latest(&namespace, &file_name)?;
            Ok(vec![describe(&descriptor)])
        }
        Commands::Version {
            user,
            category,
            file_name,
            version,
        } => {
            let namespace = Namespace::new(&user, &category)?;
            let descriptor = service.version(&namespace, &file_name, version)?;
            Ok(vec![describe(&descriptor)])
        }
        Commands::List { user, category } => {
            let namespace = Namespace::new(&user, &category)?;
            let files = service.list(&namespace)?;
            if files.is_empty() {
                Ok(vec!["No files found.".into()])
            } else {
                Ok(files)
            }
        }
        Commands::History {
            user,
            category,
            file_name,
        } => {
            let namespace = Namespace::new(&user, &category)?;
            let versions = service.history(&namespace, &file_name)?;
            if versions.is_empty() {
                Ok(vec![format!("No versions of {file_name} found.")])
            } else {
                Ok(versions.iter().map(describe).collect())
            }
        }
    }
}

fn file_name_of(path: &Path) -> StoreResult<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            StoreError::Files(FilesError::InvalidUpload(format!(
                "cannot take a file name from {}",
                path.display()
            )))
        })
}

fn describe(descriptor: &ArtifactDescriptor) -> String {
    format!(
        "v{}: {} ({} bytes, modified {})",
        descriptor.version,
        descriptor.full_path.display(),
        descriptor.size_bytes,
        descriptor.committed_at.to_rfc3339(),
    )
}
