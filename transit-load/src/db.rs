//! Connexion PostgreSQL/PostGIS
//!
//! Une seule connexion par exécution, passée explicitement aux chargeurs.
//! Un échec de connexion est journalisé et se traduit par `None`.

use anyhow::{Context, Result};
use thiserror::Error;
use tokio_postgres::{Client, NoTls};
use tokio_postgres_rustls::MakeRustlsConnect;
use tracing::{debug, error, info};

/// Mode SSL pour la connexion PostgreSQL
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SslMode {
    /// Pas de SSL (défaut)
    #[default]
    Disable,
    /// SSL préféré mais non requis
    Prefer,
    /// SSL requis
    Require,
}

impl std::str::FromStr for SslMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "disable" | "off" | "false" | "no" => Ok(SslMode::Disable),
            "prefer" => Ok(SslMode::Prefer),
            "require" | "on" | "true" | "yes" => Ok(SslMode::Require),
            _ => Err(format!("Invalid SSL mode: {}. Use: disable, prefer, require", s)),
        }
    }
}

/// Paramètre de connexion absent
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("Missing database setting {0}")]
    Missing(&'static str),
}

/// Configuration de la base de données
#[derive(Debug, Clone, Default)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub dbname: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub ssl_mode: SslMode,
}

impl DatabaseConfig {
    /// Charge la configuration depuis les variables d'environnement
    ///
    /// `DB_NAME`, `DB_USER` et `DB_PASSWORD` sont requis à la connexion;
    /// `DB_HOST`, `DB_PORT` et `DB_SSLMODE` sont optionnels.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("DB_HOST").unwrap_or_else(|_| "localhost".into()),
            port: std::env::var("DB_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5432),
            dbname: std::env::var("DB_NAME").ok(),
            user: std::env::var("DB_USER").ok(),
            password: std::env::var("DB_PASSWORD").ok(),
            ssl_mode: std::env::var("DB_SSLMODE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
        }
    }

    /// Nom de la base, pour les logs
    pub fn dbname_or_unset(&self) -> &str {
        self.dbname.as_deref().unwrap_or("<unset>")
    }

    /// Construit la configuration tokio-postgres; échoue si un identifiant manque
    pub fn to_pg_config(&self) -> Result<tokio_postgres::Config, CredentialError> {
        let dbname = self
            .dbname
            .as_deref()
            .ok_or(CredentialError::Missing("DB_NAME"))?;
        let user = self
            .user
            .as_deref()
            .ok_or(CredentialError::Missing("DB_USER"))?;
        let password = self
            .password
            .as_deref()
            .ok_or(CredentialError::Missing("DB_PASSWORD"))?;

        let mut cfg = tokio_postgres::Config::new();
        cfg.host(&self.host)
            .port(self.port)
            .dbname(dbname)
            .user(user)
            .password(password)
            .ssl_mode(match self.ssl_mode {
                SslMode::Disable => tokio_postgres::config::SslMode::Disable,
                SslMode::Prefer => tokio_postgres::config::SslMode::Prefer,
                SslMode::Require => tokio_postgres::config::SslMode::Require,
            });
        Ok(cfg)
    }
}

/// Crée la configuration TLS pour rustls
fn make_tls_connector() -> MakeRustlsConnect {
    let root_store = rustls::RootCertStore::from_iter(
        webpki_roots::TLS_SERVER_ROOTS.iter().cloned()
    );

    let config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    MakeRustlsConnect::new(config)
}

/// Ouvre la connexion à la base
///
/// Ne remonte jamais d'erreur: l'échec est journalisé et `None` est retourné.
/// L'appelant doit vérifier le résultat avant usage.
pub async fn connect_db(config: &DatabaseConfig) -> Option<Client> {
    match try_connect(config).await {
        Ok(client) => {
            info!(
                dbname = config.dbname_or_unset(),
                host = %config.host,
                port = config.port,
                "Connected to the database"
            );
            Some(client)
        }
        Err(e) => {
            error!(
                dbname = config.dbname_or_unset(),
                error = %format!("{:#}", e),
                "Error connecting to the database"
            );
            None
        }
    }
}

async fn try_connect(config: &DatabaseConfig) -> Result<Client> {
    let pg_config = config.to_pg_config()?;
    debug!(host = %config.host, port = config.port, ssl = ?config.ssl_mode, "Connecting");

    match config.ssl_mode {
        SslMode::Disable => {
            let (client, connection) = pg_config
                .connect(NoTls)
                .await
                .context("Failed to connect to PostgreSQL")?;
            tokio::spawn(async move {
                if let Err(e) = connection.await {
                    error!(error = %e, "PostgreSQL connection error");
                }
            });
            Ok(client)
        }
        SslMode::Prefer | SslMode::Require => {
            let (client, connection) = pg_config
                .connect(make_tls_connector())
                .await
                .context("Failed to connect to PostgreSQL with TLS")?;
            tokio::spawn(async move {
                if let Err(e) = connection.await {
                    error!(error = %e, "PostgreSQL connection error");
                }
            });
            Ok(client)
        }
    }
}

/// Liste les tables d'un schéma
pub async fn list_tables(client: &Client, schema: &str) -> Result<Vec<String>> {
    let rows = client
        .query(
            "SELECT table_name::text FROM information_schema.tables \
             WHERE table_schema = $1 ORDER BY table_name",
            &[&schema],
        )
        .await
        .with_context(|| format!("Failed to list tables of schema {}", schema))?;

    Ok(rows.iter().map(|row| row.get::<_, String>(0)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_config() -> DatabaseConfig {
        DatabaseConfig {
            host: "localhost".into(),
            port: 5432,
            dbname: Some("transit".into()),
            user: Some("postgres".into()),
            password: Some("secret".into()),
            ssl_mode: SslMode::Disable,
        }
    }

    #[test]
    fn test_ssl_mode_parse() {
        assert_eq!("off".parse::<SslMode>().unwrap(), SslMode::Disable);
        assert_eq!("Prefer".parse::<SslMode>().unwrap(), SslMode::Prefer);
        assert_eq!("require".parse::<SslMode>().unwrap(), SslMode::Require);
        assert!("verify-full".parse::<SslMode>().is_err());
    }

    #[test]
    fn test_pg_config_complete() {
        let cfg = full_config().to_pg_config().unwrap();
        assert_eq!(cfg.get_dbname(), Some("transit"));
        assert_eq!(cfg.get_user(), Some("postgres"));
        assert_eq!(cfg.get_ports(), &[5432]);
    }

    #[test]
    fn test_pg_config_missing_credentials() {
        let mut config = full_config();
        config.dbname = None;
        assert_eq!(
            config.to_pg_config().unwrap_err(),
            CredentialError::Missing("DB_NAME")
        );

        let mut config = full_config();
        config.password = None;
        assert_eq!(
            config.to_pg_config().unwrap_err(),
            CredentialError::Missing("DB_PASSWORD")
        );
    }

    #[tokio::test]
    async fn test_connect_without_credentials_returns_none() {
        let config = DatabaseConfig {
            host: "localhost".into(),
            port: 5432,
            ..Default::default()
        };
        assert!(connect_db(&config).await.is_none());
    }
}
