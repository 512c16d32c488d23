//! Types de données pour le crate transit-dataset

use std::fmt;

use geo::Geometry;
use geojson::JsonObject;
use serde_json::{json, Value};

use crate::{DatasetError, Schema};

/// Nom du driver (format conteneur) utilisé pour lire et écrire
pub const DRIVER: &str = "GeoJSON";

/// Une feature: une géométrie et ses attributs
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Géométrie (Point, LineString, Polygon, Multi*, GeometryCollection)
    pub geometry: Geometry,

    /// Attributs de la feature (nom -> valeur)
    pub properties: JsonObject,
}

impl Feature {
    pub fn new(geometry: Geometry, properties: JsonObject) -> Self {
        Self {
            geometry,
            properties,
        }
    }

    /// Copie la feature avec une nouvelle géométrie, attributs inchangés
    pub fn with_geometry(&self, geometry: Geometry) -> Self {
        Self {
            geometry,
            properties: self.properties.clone(),
        }
    }

    /// Récupère un attribut
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }
}

/// Système de coordonnées identifié par son code EPSG
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Crs {
    pub epsg: u32,
}

impl Crs {
    /// WGS84, CRS par défaut d'un GeoJSON sans membre `crs` (RFC 7946)
    pub const WGS84: Crs = Crs { epsg: 4326 };

    pub fn from_epsg(epsg: u32) -> Self {
        Self { epsg }
    }

    /// Parse un nom de CRS
    ///
    /// Formats acceptés: `urn:ogc:def:crs:EPSG::2961`, `urn:ogc:def:crs:EPSG:6.6:2961`,
    /// `EPSG:2961` et `urn:ogc:def:crs:OGC:1.3:CRS84` (= 4326).
    pub fn parse(name: &str) -> Result<Self, DatasetError> {
        let trimmed = name.trim();
        if trimmed.to_ascii_uppercase().ends_with("CRS84") {
            return Ok(Self::WGS84);
        }

        if !trimmed.to_ascii_uppercase().contains("EPSG") {
            return Err(DatasetError::UnknownCrs(name.to_string()));
        }

        trimmed
            .rsplit(':')
            .next()
            .and_then(|code| code.parse::<u32>().ok())
            .map(Self::from_epsg)
            .ok_or_else(|| DatasetError::UnknownCrs(name.to_string()))
    }

    /// Lit le membre `crs` d'une FeatureCollection (`{"type":"name","properties":{"name":...}}`)
    pub fn from_geojson_member(member: &Value) -> Result<Self, DatasetError> {
        let name = member
            .get("properties")
            .and_then(|p| p.get("name"))
            .and_then(Value::as_str)
            .ok_or_else(|| DatasetError::UnknownCrs(member.to_string()))?;
        Self::parse(name)
    }

    /// Nom URN OGC du CRS
    pub fn urn(&self) -> String {
        format!("urn:ogc:def:crs:EPSG::{}", self.epsg)
    }

    /// Membre `crs` à écrire dans une FeatureCollection
    pub fn to_geojson_member(&self) -> Value {
        json!({
            "type": "name",
            "properties": { "name": self.urn() }
        })
    }
}

impl Default for Crs {
    fn default() -> Self {
        Self::WGS84
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg)
    }
}

/// Jeu de données: features ordonnées partageant un CRS et un schéma
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Système de coordonnées de toutes les géométries
    pub crs: Crs,

    /// Schéma attributaire
    pub schema: Schema,

    /// Features dans l'ordre du fichier
    pub features: Vec<Feature>,

    /// Nom du driver
    pub driver: &'static str,
}

impl Dataset {
    /// Construit un jeu de données en inférant le schéma depuis les features
    pub fn new(crs: Crs, features: Vec<Feature>) -> Self {
        let schema = Schema::infer(&features);
        Self {
            crs,
            schema,
            features,
            driver: DRIVER,
        }
    }

    /// Construit un jeu de données avec un schéma imposé
    pub fn with_schema(crs: Crs, schema: Schema, features: Vec<Feature>) -> Self {
        Self {
            crs,
            schema,
            features,
            driver: DRIVER,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn first(&self) -> Option<&Feature> {
        self.features.first()
    }
}
