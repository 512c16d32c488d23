//! Configuration du pipeline (fichiers, projection cible, tables PostGIS)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Projection cible par défaut: NAD83(CSRS) / UTM zone 20N
pub const TARGET_EPSG: u32 = 2961;

/// Configuration principale
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Jeu de données source
    pub input: PathBuf,

    /// Jeu de données reprojeté
    pub output: PathBuf,

    /// Code EPSG de la projection cible
    #[serde(default = "default_target_epsg")]
    pub target_epsg: u32,

    /// Schéma PostgreSQL cible
    #[serde(default = "default_schema")]
    pub schema: String,

    /// Mise à jour des tracés de lignes
    pub route: RouteTable,

    /// Insertion des corridors
    pub corridor: CorridorTable,

    /// Insertion des liens ligne/corridor
    pub route_link: RouteLinkTable,
}

/// Table des lignes (UPDATE de la géométrie)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteTable {
    pub table: String,
    pub geometry_column: String,
    /// Seules les lignes où cette colonne est non nulle sont mises à jour
    pub filter_column: String,
}

/// Table des corridors (INSERT identifiant, nom, géométrie)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorridorTable {
    pub table: String,
    pub id_column: String,
    pub name_column: String,
    pub geometry_column: String,
    /// Attribut source de l'identifiant
    pub id_field: String,
    /// Attribut source du nom
    pub name_field: String,
}

/// Table de liaison ligne/corridor (INSERT sans géométrie)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteLinkTable {
    pub table: String,
    pub route_column: String,
    pub corridor_column: String,
    pub route_field: String,
    pub corridor_field: String,
}

fn default_target_epsg() -> u32 {
    TARGET_EPSG
}

fn default_schema() -> String {
    "transit".to_string()
}

impl Config {
    /// Charge une configuration depuis un fichier
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    /// Charge une configuration depuis un preset embarqué
    pub fn from_preset(preset: &str) -> Result<Self> {
        match preset {
            "transit" => Self::load_embedded(include_str!("presets/transit.json")),
            _ => anyhow::bail!("Unknown preset: {}. Use: transit", preset),
        }
    }

    /// Preset embarqué ou chemin vers un fichier JSON
    pub fn resolve(name_or_path: &str) -> Result<Self> {
        let path = Path::new(name_or_path);
        if path.extension().map_or(false, |ext| ext == "json") || path.exists() {
            Self::load(path)
        } else {
            Self::from_preset(name_or_path)
        }
    }

    fn load_embedded(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse embedded config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transit_preset() {
        let config = Config::from_preset("transit").unwrap();
        assert_eq!(config.target_epsg, TARGET_EPSG);
        assert_eq!(config.schema, "transit");
        assert_eq!(config.input, PathBuf::from("transit.geojson"));
        assert_eq!(config.output, PathBuf::from("transit_transformed.geojson"));
        assert_eq!(config.corridor.id_field, "OBJECTID");
        assert_eq!(config.corridor.name_field, "ROUTE_FULL");
        assert_eq!(config.route.filter_column, "route_number_full");
    }

    #[test]
    fn test_unknown_preset() {
        assert!(Config::from_preset("full").is_err());
        assert!(Config::resolve("nope").is_err());
    }

    #[test]
    fn test_load_from_file_with_defaults() {
        let mut value: serde_json::Value =
            serde_json::from_str(include_str!("presets/transit.json")).unwrap();
        let obj = value.as_object_mut().unwrap();
        obj.remove("target_epsg");
        obj.remove("schema");

        let path = std::env::temp_dir().join(format!("transit_config_{}.json", std::process::id()));
        std::fs::write(&path, value.to_string()).unwrap();

        let config = Config::resolve(path.to_str().unwrap()).unwrap();
        assert_eq!(config.target_epsg, 2961);
        assert_eq!(config.schema, "transit");

        std::fs::remove_file(path).ok();
    }
}
