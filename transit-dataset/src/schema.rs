//! Schéma attributaire inféré depuis les features
//!
//! GeoJSON ne porte pas de schéma: on le déduit des valeurs, dans l'ordre du fichier.
//! La première valeur non nulle fixe le type d'un champ; `int` est élargi en `float`
//! si les deux apparaissent, tout autre mélange devient `str`.

use std::fmt;

use geo::Geometry;
use serde_json::Value;

use crate::Feature;

/// Type d'un champ attributaire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Int,
    Float,
    Str,
    Bool,
}

impl FieldType {
    /// Type d'une valeur JSON (None pour null, objets et tableaux sont traités comme texte)
    fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(_) => Some(Self::Bool),
            Value::Number(n) if n.is_i64() || n.is_u64() => Some(Self::Int),
            Value::Number(_) => Some(Self::Float),
            Value::String(_) | Value::Array(_) | Value::Object(_) => Some(Self::Str),
        }
    }

    fn merge(self, other: Self) -> Self {
        match (self, other) {
            (a, b) if a == b => a,
            (Self::Int, Self::Float) | (Self::Float, Self::Int) => Self::Float,
            _ => Self::Str,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "str",
            Self::Bool => "bool",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Schéma d'un jeu de données
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    /// Type de géométrie commun ("Geometry" si mélangé, "None" si vide)
    pub geometry: String,

    /// Champs attributaires dans l'ordre de première apparition
    pub properties: Vec<(String, FieldType)>,
}

impl Schema {
    /// Infère le schéma d'une liste de features
    pub fn infer(features: &[Feature]) -> Self {
        let mut geometry: Option<&'static str> = None;
        let mut fields: Vec<(String, Option<FieldType>)> = Vec::new();

        for feature in features {
            let name = geometry_type_name(&feature.geometry);
            geometry = match geometry {
                None => Some(name),
                Some(current) if current == name => Some(current),
                Some(_) => Some("Geometry"),
            };

            for (key, value) in &feature.properties {
                let observed = FieldType::of(value);
                match fields.iter_mut().find(|(k, _)| k == key) {
                    Some((_, slot)) => {
                        *slot = match (*slot, observed) {
                            (Some(a), Some(b)) => Some(a.merge(b)),
                            (a, b) => a.or(b),
                        };
                    }
                    None => fields.push((key.clone(), observed)),
                }
            }
        }

        Self {
            geometry: geometry.unwrap_or("None").to_string(),
            properties: fields
                .into_iter()
                .map(|(k, t)| (k, t.unwrap_or(FieldType::Str)))
                .collect(),
        }
    }

    /// Type d'un champ
    pub fn field_type(&self, name: &str) -> Option<FieldType> {
        self.properties
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, t)| *t)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{geometry: {}, properties: {{", self.geometry)?;
        for (i, (name, field_type)) in self.properties.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", name, field_type)?;
        }
        write!(f, "}}}}")
    }
}

/// Nom du type de géométrie, au sens GeoJSON
pub fn geometry_type_name(geometry: &Geometry) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) | Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) | Geometry::Rect(_) | Geometry::Triangle(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, Point};
    use geojson::JsonObject;
    use serde_json::json;

    fn feature(geometry: Geometry, props: Value) -> Feature {
        let properties: JsonObject = props.as_object().cloned().unwrap_or_default();
        Feature::new(geometry, properties)
    }

    #[test]
    fn test_infer_basic_schema() {
        let line = Geometry::LineString(line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)]);
        let features = vec![
            feature(line.clone(), json!({"OBJECTID": 1, "ROUTE_FULL": "12A"})),
            feature(line, json!({"OBJECTID": 2, "ROUTE_FULL": "1"})),
        ];

        let schema = Schema::infer(&features);
        assert_eq!(schema.geometry, "LineString");
        assert_eq!(schema.field_type("OBJECTID"), Some(FieldType::Int));
        assert_eq!(schema.field_type("ROUTE_FULL"), Some(FieldType::Str));
    }

    #[test]
    fn test_infer_widens_and_skips_nulls() {
        let pt = Geometry::Point(Point::new(0.0, 0.0));
        let features = vec![
            feature(pt.clone(), json!({"LENGTH": 3, "NOTE": null})),
            feature(pt.clone(), json!({"LENGTH": 4.5, "NOTE": "x"})),
            feature(pt, json!({"LENGTH": "n/a"})),
        ];

        let schema = Schema::infer(&features);
        assert_eq!(schema.field_type("NOTE"), Some(FieldType::Str));
        assert_eq!(schema.field_type("LENGTH"), Some(FieldType::Str));
    }

    #[test]
    fn test_infer_mixed_geometry() {
        let features = vec![
            feature(Geometry::Point(Point::new(0.0, 0.0)), json!({})),
            feature(
                Geometry::LineString(line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)]),
                json!({}),
            ),
        ];
        assert_eq!(Schema::infer(&features).geometry, "Geometry");
        assert_eq!(Schema::infer(&[]).geometry, "None");
    }

    #[test]
    fn test_display() {
        let schema = Schema {
            geometry: "LineString".to_string(),
            properties: vec![
                ("OBJECTID".to_string(), FieldType::Int),
                ("ROUTE_FULL".to_string(), FieldType::Str),
            ],
        };
        assert_eq!(
            schema.to_string(),
            "{geometry: LineString, properties: {OBJECTID: int, ROUTE_FULL: str}}"
        );
    }
}
