//! Bulk content import/export for Care Resource Hub
//!
//! Loads a whole content tree from a JSON backup, an outline text file, or a
//! CSV sheet and stores it as a new content version. Nothing is written when
//! the input fails to parse.
//!
//! Usage:
//!   content-import import-json backup.json
//!   content-import import-outline content.md --db-path ./data/carehub.db
//!   content-import import-csv content.csv
//!   content-import export-json backup.json

use anyhow::{Context, Result};
use carehub_core::db::{ContentStore, FallbackFile, LibsqlContentStore};
use carehub_core::import::{self, ImportFormat};
use carehub_core::services::PersistenceGateway;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "content-import", version, about = "Bulk import and export of hub content")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Database file holding the content versions
    #[arg(long, global = true, env = "CAREHUB_DB_PATH", default_value = "./data/carehub.db")]
    db_path: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import a JSON document (current, page-keyed, or legacy shape)
    ImportJson { file: PathBuf },
    /// Import an outline file (`# PAGE:` / `## TAB:` / `### SECTION:` / `#### ITEM:`)
    ImportOutline { file: PathBuf },
    /// Import a CSV sheet with columns Page, Tab, Section, Item, Content, Sources
    ImportCsv { file: PathBuf },
    /// Write the latest stored document to a file
    ExportJson { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::ImportJson { file } => import_file(&cli.db_path, ImportFormat::Json, &file).await,
        Command::ImportOutline { file } => {
            import_file(&cli.db_path, ImportFormat::Outline, &file).await
        }
        Command::ImportCsv { file } => import_file(&cli.db_path, ImportFormat::Csv, &file).await,
        Command::ExportJson { file } => export_file(&cli.db_path, &file).await,
    }
}

async fn open_gateway(db_path: &Path) -> Result<PersistenceGateway> {
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let store = LibsqlContentStore::open(db_path.to_path_buf())
        .await
        .with_context(|| format!("Failed to open database at {}", db_path.display()))?;
    tracing::info!("📦 Database: {}", db_path.display());

    let fallback_path = std::env::var("CAREHUB_FALLBACK_PATH")
        .unwrap_or_else(|_| "./data/content.json".to_string());
    let primary: Arc<dyn ContentStore> = Arc::new(store);
    Ok(PersistenceGateway::new(Some(primary), FallbackFile::new(fallback_path)))
}

async fn import_file(db_path: &Path, format: ImportFormat, file: &Path) -> Result<()> {
    let input = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let document = import::parse(format, &input)
        .with_context(|| format!("Failed to parse {}", file.display()))?;
    tracing::info!(
        "📄 Parsed {} ({} pages, {} items)",
        file.display(),
        document.pages.len(),
        document.item_count()
    );

    let gateway = open_gateway(db_path).await?;
    let stored = gateway.import(document).await?;

    for page in stored.pages.values() {
        let sections: usize = page.tabs.iter().map(|tab| tab.sections.len()).sum();
        tracing::info!(
            "   {}: {} tabs, {} sections",
            page.id,
            page.tabs.len(),
            sections
        );
    }
    tracing::info!("✅ Imported {} items", stored.item_count());
    Ok(())
}

async fn export_file(db_path: &Path, file: &Path) -> Result<()> {
    let gateway = open_gateway(db_path).await?;
    let exported = gateway.export().await?;

    let json = serde_json::to_string_pretty(&exported)?;
    tokio::fs::write(file, json)
        .await
        .with_context(|| format!("Failed to write {}", file.display()))?;

    tracing::info!(
        "✅ Exported {} items to {}",
        exported.document.item_count(),
        file.display()
    );
    Ok(())
}
