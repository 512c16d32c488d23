//! Lecture de diagnostic d'un jeu de données
//!
//! Inspection seule: nombre de features, CRS, driver, schéma et première feature.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::error;
use transit_dataset::{writer::to_geojson_feature, Crs, Schema};

/// Résumé d'un jeu de données
#[derive(Debug, Clone)]
pub struct DatasetSummary {
    pub path: PathBuf,
    pub features: usize,
    pub crs: Crs,
    pub driver: &'static str,
    pub schema: Schema,
    /// Première feature en GeoJSON
    pub first_feature: Option<String>,
}

/// Ouvre le jeu de données en lecture et en extrait le résumé
pub fn inspect_dataset(path: &Path) -> Result<DatasetSummary> {
    let dataset = transit_dataset::open(path)
        .with_context(|| format!("Failed to open dataset: {}", path.display()))?;

    let first_feature = dataset
        .first()
        .map(|feature| serde_json::to_string(&to_geojson_feature(feature)))
        .transpose()
        .context("Failed to serialize first feature")?;

    Ok(DatasetSummary {
        path: path.to_path_buf(),
        features: dataset.len(),
        crs: dataset.crs,
        driver: dataset.driver,
        schema: dataset.schema,
        first_feature,
    })
}

/// Affiche le résumé sur la console; les erreurs sont journalisées, jamais remontées
pub fn print_dataset_summary(path: &Path) -> Option<DatasetSummary> {
    match inspect_dataset(path) {
        Ok(summary) => {
            println!("{}", summary);
            Some(summary)
        }
        Err(e) => {
            error!(path = %path.display(), error = %format!("{:#}", e), "An error occurred");
            None
        }
    }
}

impl fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dataset: {}", self.path.display())?;
        writeln!(f, "Number of features: {}", self.features)?;
        writeln!(f, "CRS: {}", self.crs)?;
        writeln!(f, "Driver: {}", self.driver)?;
        writeln!(f, "Layer schema:")?;
        writeln!(f, "{}", self.schema)?;
        writeln!(f, "First feature:")?;
        write!(f, "{}", self.first_feature.as_deref().unwrap_or("None"))
    }
}
