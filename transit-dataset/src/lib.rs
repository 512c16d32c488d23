//! # transit-dataset
//!
//! Lecture et écriture des jeux de données vectoriels du réseau de transport
//! (lignes et corridors): géométries `geo` + attributs JSON.
//!
//! ## Features
//!
//! - Conteneur GeoJSON (FeatureCollection) avec membre `crs` nommé
//! - Schéma attributaire inféré (GeoJSON n'en porte pas)
//! - Types `geo` pour l'interopérabilité avec l'écosystème Rust géospatial
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::path::Path;
//!
//! let dataset = transit_dataset::open(Path::new("transit.geojson"))?;
//! println!("CRS: {}", dataset.crs);
//! println!("Schema: {}", dataset.schema);
//! println!("{} features", dataset.len());
//! ```

pub mod error;
pub mod reader;
pub mod schema;
pub mod types;
pub mod writer;

pub use error::DatasetError;
pub use schema::{FieldType, Schema};
pub use types::{Crs, Dataset, Feature, DRIVER};

use std::path::Path;

/// Ouvre un jeu de données en lecture
pub fn open(path: &Path) -> Result<Dataset, DatasetError> {
    reader::read(path)
}

/// Écrit un jeu de données (écrase le fichier existant)
pub fn write(dataset: &Dataset, path: &Path) -> Result<(), DatasetError> {
    writer::write(dataset, path)
}
