//! Types d'erreurs pour le crate transit-dataset

use thiserror::Error;

/// Erreurs pouvant survenir lors de la lecture ou de l'écriture d'un jeu de données
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Erreur d'I/O lors de la lecture ou de l'écriture du fichier
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON invalide
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Document GeoJSON invalide
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// Le document n'est pas une FeatureCollection
    #[error("Expected a FeatureCollection, found {0}")]
    NotAFeatureCollection(&'static str),

    /// Feature sans géométrie
    #[error("Feature #{index} has no geometry")]
    MissingGeometry { index: usize },

    /// Géométrie invalide ou non convertible
    #[error("Invalid geometry for feature #{index}: {reason}")]
    InvalidGeometry { index: usize, reason: String },

    /// Système de coordonnées non reconnu
    #[error("Unknown CRS: {0}")]
    UnknownCrs(String),
}

impl DatasetError {
    /// Crée une erreur de géométrie invalide
    pub fn invalid_geometry(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            index,
            reason: reason.into(),
        }
    }
}
