//! Écriture d'un jeu de données en GeoJSON
//!
//! Écriture en une fois de toutes les features, avec un membre `crs` nommé
//! (`urn:ogc:def:crs:EPSG::<code>`) pour conserver la projection cible.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use geojson::{FeatureCollection, JsonObject};
use tracing::debug;

use crate::{Dataset, DatasetError, Feature};

/// Écrit le jeu de données dans un fichier GeoJSON (écrase le fichier existant)
pub fn write(dataset: &Dataset, path: &Path) -> Result<(), DatasetError> {
    let collection = to_feature_collection(dataset);

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, &collection)?;
    writer.flush()?;

    debug!(
        path = %path.display(),
        features = dataset.len(),
        crs = %dataset.crs,
        "Dataset written"
    );
    Ok(())
}

/// Convertit le jeu de données en FeatureCollection GeoJSON
pub fn to_feature_collection(dataset: &Dataset) -> FeatureCollection {
    let features = dataset.features.iter().map(to_geojson_feature).collect();

    let mut foreign_members = JsonObject::new();
    foreign_members.insert("crs".to_string(), dataset.crs.to_geojson_member());

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: Some(foreign_members),
    }
}

/// Convertit une feature en feature GeoJSON
pub fn to_geojson_feature(feature: &Feature) -> geojson::Feature {
    geojson::Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::new(geojson::Value::from(
            &feature.geometry,
        ))),
        id: None,
        properties: Some(feature.properties.clone()),
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Crs;
    use geo::{Geometry, Point};
    use serde_json::json;

    #[test]
    fn test_feature_collection_has_crs_member() {
        let mut props = JsonObject::new();
        props.insert("OBJECTID".to_string(), json!(1));
        let dataset = Dataset::new(
            Crs::from_epsg(2961),
            vec![Feature::new(Geometry::Point(Point::new(1.0, 2.0)), props)],
        );

        let collection = to_feature_collection(&dataset);
        let json = serde_json::to_value(&collection).unwrap();

        assert_eq!(json["type"], "FeatureCollection");
        assert_eq!(json["crs"]["properties"]["name"], "urn:ogc:def:crs:EPSG::2961");
        assert_eq!(json["features"][0]["properties"]["OBJECTID"], 1);
        assert_eq!(json["features"][0]["geometry"]["type"], "Point");
    }
}
