//! Reprojection d'un jeu de données complet
//!
//! Toutes les features sont reprojetées en mémoire avant l'écriture: une géométrie
//! en échec interrompt l'opération et aucun fichier de sortie n'est créé.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;
use transit_dataset::{Crs, Dataset, Feature};

use crate::reproject::Reprojector;

/// Résumé d'une reprojection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformSummary {
    pub features: usize,
    pub source_epsg: u32,
    pub target_epsg: u32,
}

/// Reprojette toutes les features, dans l'ordre, en conservant schéma et attributs
pub fn reproject_dataset(dataset: &Dataset, reprojector: &Reprojector) -> Result<Dataset> {
    let features = dataset
        .features
        .iter()
        .enumerate()
        .map(|(index, feature)| {
            reprojector
                .transform_geometry(&feature.geometry)
                .map(|geometry| feature.with_geometry(geometry))
                .with_context(|| format!("Failed to reproject feature #{}", index))
        })
        .collect::<Result<Vec<Feature>>>()?;

    Ok(Dataset::with_schema(
        Crs::from_epsg(reprojector.target_epsg()),
        dataset.schema.clone(),
        features,
    ))
}

/// Lit `input`, reprojette vers `target_epsg` et écrit `output`
pub fn transform_file(input: &Path, output: &Path, target_epsg: u32) -> Result<TransformSummary> {
    let source = transit_dataset::open(input)
        .with_context(|| format!("Failed to read dataset: {}", input.display()))?;

    let reprojector = Reprojector::new(source.crs.epsg, target_epsg)?;
    let target = reproject_dataset(&source, &reprojector)?;

    transit_dataset::write(&target, output)
        .with_context(|| format!("Failed to write dataset: {}", output.display()))?;

    info!(
        input = %input.display(),
        output = %output.display(),
        features = target.len(),
        source = %source.crs,
        target = %target.crs,
        "Dataset reprojected"
    );

    Ok(TransformSummary {
        features: target.len(),
        source_epsg: source.crs.epsg,
        target_epsg,
    })
}
