//! Définition et implémentation des commandes CLI
//!
//! - `inspect`: diagnostic d'un jeu de données
//! - `transform`: reprojection vers le SRID cible
//! - `load`: chargement d'une variante dans PostGIS
//! - `tables`: liste des tables du schéma cible
//! - `run`: reprojection puis chargements

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use tokio_postgres::Client;
use tracing::info;

use transit_load::db::{self, DatabaseConfig};
use transit_load::report::{save_reports, LoadReport};
use transit_load::{inspect, load, transform, Config, LoadVariant};

#[derive(Subcommand)]
pub enum Commands {
    /// Print feature count, CRS, driver, schema and first feature of a dataset
    Inspect {
        /// Dataset path (défaut : sortie reprojetée de la configuration)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Reproject a dataset to the target SRID
    Transform {
        /// Source dataset (défaut : entrée de la configuration)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output dataset (défaut : sortie de la configuration)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Target SRID (défaut : 2961)
        #[arg(long)]
        srid: Option<u32>,
    },

    /// Load the reprojected dataset into one table
    Load {
        /// Load variant
        #[arg(long, value_enum)]
        variant: LoadVariant,

        /// Reprojected dataset (défaut : sortie de la configuration)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Save the load report as JSON
        #[arg(long)]
        report: Option<PathBuf>,

        #[command(flatten)]
        db: DbArgs,
    },

    /// List the tables of the target schema
    Tables {
        /// Schema (défaut : schéma de la configuration)
        #[arg(long)]
        schema: Option<String>,

        #[command(flatten)]
        db: DbArgs,
    },

    /// Reproject, then load the selected variants in order
    Run {
        /// Load variants (défaut : toutes, dans l'ordre update-route, insert-corridor, insert-route-link)
        #[arg(long, value_enum)]
        variant: Vec<LoadVariant>,

        /// Skip the reprojection step (use the existing output dataset)
        #[arg(long)]
        skip_transform: bool,

        /// Save the load reports as JSON
        #[arg(long)]
        report: Option<PathBuf>,

        #[command(flatten)]
        db: DbArgs,
    },
}

/// Surcharges des paramètres de connexion (défaut : variables d'environnement)
#[derive(Args, Debug, Default)]
pub struct DbArgs {
    /// PostgreSQL host (défaut : env DB_HOST / localhost)
    #[arg(long)]
    host: Option<String>,

    /// PostgreSQL port (défaut : env DB_PORT / 5432)
    #[arg(long)]
    port: Option<u16>,

    /// PostgreSQL database name (défaut : env DB_NAME)
    #[arg(long)]
    database: Option<String>,

    /// PostgreSQL user (défaut : env DB_USER)
    #[arg(long)]
    user: Option<String>,

    /// PostgreSQL password (défaut : env DB_PASSWORD)
    #[arg(long)]
    password: Option<String>,

    /// SSL mode: disable, prefer, require (défaut : env DB_SSLMODE / disable)
    #[arg(long)]
    ssl: Option<String>,
}

/// Exécute une commande
pub async fn run(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Inspect { path } => {
            let path = path.unwrap_or_else(|| config.output.clone());
            inspect::print_dataset_summary(&path);
            Ok(())
        }
        Commands::Transform {
            input,
            output,
            srid,
        } => {
            let input = input.unwrap_or_else(|| config.input.clone());
            let output = output.unwrap_or_else(|| config.output.clone());
            cmd_transform(&input, &output, srid.unwrap_or(config.target_epsg))
        }
        Commands::Load {
            variant,
            path,
            report,
            db,
        } => {
            let path = path.unwrap_or_else(|| config.output.clone());
            let mut client = connect(db).await?;
            let load_report = load::load_table(&mut client, variant, &path, config).await?;
            finish(&[load_report], report.as_deref())
        }
        Commands::Tables { schema, db } => {
            let schema = schema.unwrap_or_else(|| config.schema.clone());
            let client = connect(db).await?;
            cmd_tables(&client, &schema).await
        }
        Commands::Run {
            variant,
            skip_transform,
            report,
            db,
        } => {
            let variants = if variant.is_empty() {
                LoadVariant::ALL.to_vec()
            } else {
                variant
            };
            cmd_run(config, &variants, skip_transform, db, report.as_deref()).await
        }
    }
}

/// Exécute la commande transform
fn cmd_transform(input: &Path, output: &Path, srid: u32) -> Result<()> {
    println!("=== Transform ===");
    println!("Input: {}", input.display());
    println!("Output: {}", output.display());
    println!("Target SRID: {}", srid);

    let summary = transform::transform_file(input, output, srid)?;
    println!(
        "Reprojected {} features from EPSG:{} to EPSG:{}",
        summary.features, summary.source_epsg, summary.target_epsg
    );
    Ok(())
}

/// Exécute la commande tables
async fn cmd_tables(client: &Client, schema: &str) -> Result<()> {
    let tables = db::list_tables(client, schema).await?;
    if tables.is_empty() {
        println!("No tables in schema {}", schema);
    }
    for table in tables {
        println!("{}", table);
    }
    Ok(())
}

/// Exécute la commande run: reprojection puis chargements avec la même connexion
async fn cmd_run(
    config: &Config,
    variants: &[LoadVariant],
    skip_transform: bool,
    db_args: DbArgs,
    report_path: Option<&Path>,
) -> Result<()> {
    if !skip_transform {
        cmd_transform(&config.input, &config.output, config.target_epsg)?;
    }

    let mut client = connect(db_args).await?;

    let mut reports: Vec<LoadReport> = Vec::with_capacity(variants.len());
    for variant in variants {
        info!(variant = %variant, "Running load");
        let report = load::load_table(&mut client, *variant, &config.output, config)
            .await
            .with_context(|| format!("Load {} failed", variant))?;
        reports.push(report);
    }

    finish(&reports, report_path)
}

/// Ouvre la connexion; `connect_db` journalise déjà la cause d'un échec
async fn connect(args: DbArgs) -> Result<Client> {
    let mut db_config = DatabaseConfig::from_env();
    apply_database_overrides(&mut db_config, args);
    println!(
        "Database: {}@{}:{}/{} (SSL: {:?})",
        db_config.user.as_deref().unwrap_or("<unset>"),
        db_config.host,
        db_config.port,
        db_config.dbname_or_unset(),
        db_config.ssl_mode
    );

    match db::connect_db(&db_config).await {
        Some(client) => {
            println!("Connected to PostgreSQL");
            Ok(client)
        }
        None => anyhow::bail!("No database connection"),
    }
}

fn apply_database_overrides(config: &mut DatabaseConfig, args: DbArgs) {
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(database) = args.database {
        config.dbname = Some(database);
    }
    if let Some(user) = args.user {
        config.user = Some(user);
    }
    if let Some(password) = args.password {
        config.password = Some(password);
    }
    if let Some(ssl) = args.ssl.and_then(|s| s.parse().ok()) {
        config.ssl_mode = ssl;
    }
}

fn finish(reports: &[LoadReport], report_path: Option<&Path>) -> Result<()> {
    for report in reports {
        report.display();
    }
    if let Some(path) = report_path {
        save_reports(reports, path)?;
        println!("Report saved to {}", path.display());
    }
    println!("Data loaded successfully!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use transit_load::db::SslMode;

    #[test]
    fn test_apply_database_overrides() {
        let mut config = DatabaseConfig {
            host: "localhost".into(),
            port: 5432,
            dbname: None,
            user: Some("env_user".into()),
            password: None,
            ssl_mode: SslMode::Disable,
        };

        apply_database_overrides(
            &mut config,
            DbArgs {
                host: Some("db.internal".into()),
                database: Some("transit".into()),
                ssl: Some("require".into()),
                ..Default::default()
            },
        );

        assert_eq!(config.host, "db.internal");
        assert_eq!(config.port, 5432);
        assert_eq!(config.dbname.as_deref(), Some("transit"));
        assert_eq!(config.user.as_deref(), Some("env_user"));
        assert!(config.password.is_none());
        assert_eq!(config.ssl_mode, SslMode::Require);
    }
}
