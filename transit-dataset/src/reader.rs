//! Lecture d'un jeu de données GeoJSON
//!
//! Toutes les features sont chargées en mémoire. Une feature sans géométrie ou avec
//! une géométrie non convertible fait échouer la lecture entière.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use geo::Geometry;
use geojson::GeoJson;
use serde_json::Value;
use tracing::debug;

use crate::{Crs, Dataset, DatasetError, Feature};

/// Lit un fichier GeoJSON (FeatureCollection)
pub fn read(path: &Path) -> Result<Dataset, DatasetError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let geojson = GeoJson::from_reader(reader)?;

    let dataset = from_geojson(geojson)?;
    debug!(
        path = %path.display(),
        features = dataset.len(),
        crs = %dataset.crs,
        "Dataset loaded"
    );
    Ok(dataset)
}

/// Lit un jeu de données depuis une chaîne GeoJSON
pub fn read_str(content: &str) -> Result<Dataset, DatasetError> {
    let geojson: GeoJson = content.parse()?;
    from_geojson(geojson)
}

/// Convertit un document GeoJSON en jeu de données
pub fn from_geojson(geojson: GeoJson) -> Result<Dataset, DatasetError> {
    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        GeoJson::Feature(_) => return Err(DatasetError::NotAFeatureCollection("Feature")),
        GeoJson::Geometry(_) => return Err(DatasetError::NotAFeatureCollection("Geometry")),
    };

    let crs = match collection
        .foreign_members
        .as_ref()
        .and_then(|members| members.get("crs"))
    {
        None | Some(Value::Null) => Crs::WGS84,
        Some(member) => Crs::from_geojson_member(member)?,
    };

    let features = collection
        .features
        .into_iter()
        .enumerate()
        .map(|(index, feature)| convert_feature(index, feature))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Dataset::new(crs, features))
}

fn convert_feature(index: usize, feature: geojson::Feature) -> Result<Feature, DatasetError> {
    let geometry = feature
        .geometry
        .ok_or(DatasetError::MissingGeometry { index })?;

    let geometry = Geometry::<f64>::try_from(&geometry.value)
        .map_err(|e| DatasetError::invalid_geometry(index, e.to_string()))?;

    Ok(Feature::new(geometry, feature.properties.unwrap_or_default()))
}
