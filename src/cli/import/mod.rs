//! Import command - loads a JSON catalog document

use std::path::PathBuf;

use clap::Args;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::infrastructure::catalog::{import_file, CatalogBackend, CatalogFactory};
use crate::infrastructure::observability::init_tracing;

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// `{"datasets": [...]}` or a bare array of datasets
    pub file: PathBuf,
}

/// Upserts every dataset in the file into the configured catalog
pub async fn run(args: ImportArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    init_tracing(&config.logging, &config.observability.tracing);

    if config.catalog.backend == CatalogBackend::Memory {
        warn!("Catalog backend is in-memory; imported datasets are discarded on exit");
    }

    let catalog = CatalogFactory::new().create(&config.catalog).await?;
    let summary = import_file(catalog.as_ref(), &args.file).await?;

    info!(
        file = %args.file.display(),
        datasets = summary.datasets,
        sample_sets = summary.sample_sets,
        samples = summary.samples,
        "Import complete"
    );

    Ok(())
}
