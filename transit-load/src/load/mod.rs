//! Chargement du jeu de données reprojeté dans PostGIS
//!
//! Trois variantes, chacune avec une instruction fixe exécutée une fois par feature:
//! - `update-route`: UPDATE du tracé des lignes (géométrie seule)
//! - `insert-corridor`: INSERT identifiant, nom et géométrie
//! - `insert-route-link`: INSERT ligne/corridor sans géométrie
//!
//! La géométrie est passée en WKT et étiquetée avec le SRID cible par `ST_GeomFromText`.

pub mod session;

use std::path::Path;

use anyhow::{Context, Result};
use geo::Geometry;
use geozero::wkt::WktWriter;
use geozero::GeozeroGeometry;
use serde_json::Value;
use tokio_postgres::Client;
use tracing::info;
use transit_dataset::Feature;

use crate::config::Config;
use crate::report::LoadReport;
pub use session::{LoadSession, ParamType, SqlValue, TableLoad};

/// Variante de chargement
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LoadVariant {
    /// Met à jour le tracé des lignes existantes
    UpdateRoute,
    /// Insère les corridors (identifiant, nom, géométrie)
    InsertCorridor,
    /// Insère les liens ligne/corridor
    InsertRouteLink,
}

impl LoadVariant {
    pub const ALL: [LoadVariant; 3] = [
        LoadVariant::UpdateRoute,
        LoadVariant::InsertCorridor,
        LoadVariant::InsertRouteLink,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LoadVariant::UpdateRoute => "update-route",
            LoadVariant::InsertCorridor => "insert-corridor",
            LoadVariant::InsertRouteLink => "insert-route-link",
        }
    }

    /// Table cible qualifiée (schema.table)
    pub fn table(&self, config: &Config) -> String {
        let table = match self {
            LoadVariant::UpdateRoute => &config.route.table,
            LoadVariant::InsertCorridor => &config.corridor.table,
            LoadVariant::InsertRouteLink => &config.route_link.table,
        };
        format!("{}.{}", config.schema, table)
    }

    /// Instruction SQL de la variante
    pub fn sql(&self, config: &Config) -> String {
        let srid = config.target_epsg;
        let table = self.table(config);
        match self {
            LoadVariant::UpdateRoute => format!(
                "UPDATE {} SET {} = ST_GeomFromText($1::text, {}) WHERE {} IS NOT NULL",
                table, config.route.geometry_column, srid, config.route.filter_column
            ),
            LoadVariant::InsertCorridor => format!(
                "INSERT INTO {} ({}, {}, {}) VALUES ($1::bigint, $2::text, ST_GeomFromText($3::text, {}))",
                table,
                config.corridor.id_column,
                config.corridor.name_column,
                config.corridor.geometry_column,
                srid
            ),
            LoadVariant::InsertRouteLink => format!(
                "INSERT INTO {} ({}, {}) VALUES ($1::text, $2::bigint)",
                table, config.route_link.route_column, config.route_link.corridor_column
            ),
        }
    }

    /// Paramètres de l'instruction pour une feature
    pub fn params(&self, feature: &Feature, index: usize, config: &Config) -> Result<Vec<SqlValue>> {
        match self {
            LoadVariant::UpdateRoute => Ok(vec![SqlValue::Text(geometry_to_wkt(&feature.geometry)?)]),
            LoadVariant::InsertCorridor => Ok(vec![
                int_param(feature, index, &config.corridor.id_field)?,
                text_param(feature, index, &config.corridor.name_field)?,
                SqlValue::Text(geometry_to_wkt(&feature.geometry)?),
            ]),
            LoadVariant::InsertRouteLink => Ok(vec![
                text_param(feature, index, &config.route_link.route_field)?,
                int_param(feature, index, &config.route_link.corridor_field)?,
            ]),
        }
    }
}

impl std::fmt::Display for LoadVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Convertit une géométrie en WKT
pub fn geometry_to_wkt(geometry: &Geometry) -> Result<String> {
    let mut wkt_buf = Vec::new();
    {
        let mut writer = WktWriter::new(&mut wkt_buf);
        geometry
            .process_geom(&mut writer)
            .context("Failed to convert geometry to WKT")?;
    }
    String::from_utf8(wkt_buf).context("WKT output is not valid UTF-8")
}

fn attribute<'a>(feature: &'a Feature, index: usize, field: &str) -> Result<&'a Value> {
    feature
        .property(field)
        .with_context(|| format!("Feature #{} has no attribute '{}'", index, field))
}

/// Attribut en paramètre texte (nombres et booléens convertis)
fn text_param(feature: &Feature, index: usize, field: &str) -> Result<SqlValue> {
    Ok(match attribute(feature, index, field)? {
        Value::Null => SqlValue::Null(ParamType::Text),
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    })
}

/// Attribut en paramètre entier (accepte les flottants entiers et les chaînes numériques)
fn int_param(feature: &Feature, index: usize, field: &str) -> Result<SqlValue> {
    let value = attribute(feature, index, field)?;
    let parsed = match value {
        Value::Null => return Ok(SqlValue::Null(ParamType::Int)),
        Value::Number(n) => match (n.as_i64(), n.as_u64()) {
            (Some(i), _) => Some(i),
            (None, Some(u)) => i64::try_from(u).ok(),
            (None, None) => n
                .as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                .map(|f| f as i64),
        },
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    parsed.map(SqlValue::Int).with_context(|| {
        format!(
            "Attribute '{}' of feature #{} is not an integer: {}",
            field, index, value
        )
    })
}

/// Charge les features dans une session: une instruction par feature, un commit
///
/// À la première erreur (attribut manquant, instruction en échec), la transaction est
/// annulée et l'erreur remontée.
pub async fn load_features<S: LoadSession>(
    session: S,
    variant: LoadVariant,
    features: &[Feature],
    config: &Config,
) -> Result<LoadReport> {
    let sql = variant.sql(config);
    let table = variant.table(config);
    let mut load = TableLoad::begin(session, &table, variant.name());

    for (index, feature) in features.iter().enumerate() {
        let result = match variant.params(feature, index, config) {
            Ok(params) => load.execute(&sql, &params).await,
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            let report = load.rollback(&format!("{:#}", e)).await;
            return Err(e.context(format!(
                "Load into {} rolled back at feature #{} ({} statements discarded)",
                report.table, index, report.statements
            )));
        }
    }

    load.commit().await
}

/// Ouvre le jeu de données reprojeté et le charge dans une transaction
pub async fn load_table(
    client: &mut Client,
    variant: LoadVariant,
    dataset_path: &Path,
    config: &Config,
) -> Result<LoadReport> {
    let dataset = transit_dataset::open(dataset_path)
        .with_context(|| format!("Failed to read dataset: {}", dataset_path.display()))?;

    if dataset.crs.epsg != config.target_epsg {
        anyhow::bail!(
            "Dataset {} is in {}, expected EPSG:{} (run transform first)",
            dataset_path.display(),
            dataset.crs,
            config.target_epsg
        );
    }

    info!(
        path = %dataset_path.display(),
        variant = %variant,
        features = dataset.len(),
        "Loading dataset"
    );

    let transaction = client
        .transaction()
        .await
        .context("Failed to begin transaction")?;

    load_features(transaction, variant, &dataset.features, config).await
}
