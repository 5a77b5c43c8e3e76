use sqlx::postgres::PgConnectOptions;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Default width of one listing row
pub const DEFAULT_LISTING_COLUMNS: usize = 4;

/// Default upload body limit (20 MB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub database: PgConnectOptions,
    pub table_name: String,
    pub upload_dir: PathBuf,
    pub upload_password: String,
    pub access_password: String,
    pub hash_salt: String,
    pub base_url: String,
    pub server_port: u16,
    pub max_upload_bytes: usize,
    pub listing_columns: usize,
    pub listing_show_partial_row: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        Ok(Config {
            database: database_from_env()?,
            table_name: env::var("TABLE_NAME").unwrap_or_else(|_| "screenshots".to_string()),
            upload_dir: env::var("UPLOAD_DIR")
                .unwrap_or_else(|_| "uploads".to_string())
                .into(),
            upload_password: env::var("UPLOAD_PASSWORD")
                .map_err(|_| anyhow::anyhow!("UPLOAD_PASSWORD must be set"))?,
            access_password: env::var("ACCESS_PASSWORD")
                .map_err(|_| anyhow::anyhow!("ACCESS_PASSWORD must be set"))?,
            hash_salt: env::var("HASH_SALT")
                .map_err(|_| anyhow::anyhow!("HASH_SALT must be set"))?,
            base_url: env::var("BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid SERVER_PORT: {}", e))?,
            max_upload_bytes: match env::var("MAX_UPLOAD_BYTES") {
                Ok(value) => value
                    .parse()
                    .map_err(|e| anyhow::anyhow!("Invalid MAX_UPLOAD_BYTES: {}", e))?,
                Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
            },
            listing_columns: match env::var("LISTING_COLUMNS") {
                Ok(value) => value
                    .parse()
                    .map_err(|e| anyhow::anyhow!("Invalid LISTING_COLUMNS: {}", e))?,
                Err(_) => DEFAULT_LISTING_COLUMNS,
            },
            listing_show_partial_row: match env::var("LISTING_SHOW_PARTIAL_ROW") {
                Ok(value) => parse_flag(&value)?,
                Err(_) => false,
            },
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.upload_password.is_empty() {
            return Err(anyhow::anyhow!("UPLOAD_PASSWORD must not be empty"));
        }
        if self.access_password.is_empty() {
            return Err(anyhow::anyhow!("ACCESS_PASSWORD must not be empty"));
        }
        if self.hash_salt.is_empty() {
            return Err(anyhow::anyhow!("HASH_SALT must not be empty"));
        }
        if !is_sql_identifier(&self.table_name) {
            return Err(anyhow::anyhow!(
                "TABLE_NAME must contain only ASCII letters, digits and underscores: {}",
                self.table_name
            ));
        }
        if self.listing_columns == 0 {
            return Err(anyhow::anyhow!("LISTING_COLUMNS must be at least 1"));
        }
        if self.max_upload_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_BYTES must be at least 1"));
        }
        Ok(())
    }

    /// Public URL of a screenshot page or file under `/ss/`
    pub fn public_url(&self, name: &str) -> String {
        format!("{}/ss/{}", self.base_url.trim_end_matches('/'), name)
    }
}

/// Prefer DATABASE_URL, otherwise connect with the DB_* parts
fn database_from_env() -> Result<PgConnectOptions, anyhow::Error> {
    if let Ok(url) = env::var("DATABASE_URL") {
        return PgConnectOptions::from_str(&url)
            .map_err(|e| anyhow::anyhow!("Invalid DATABASE_URL: {}", e));
    }

    let user = env::var("DB_USER")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL or DB_USER must be set"))?;
    let host = env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string());
    let password = env::var("DB_PASSWORD").unwrap_or_default();
    let name = env::var("DB_NAME").unwrap_or_else(|_| "screenshots".to_string());

    Ok(connect_options_from_parts(&host, &user, &password, &name))
}

/// Credentials are passed as-is and never go through URL parsing
pub fn connect_options_from_parts(
    host: &str,
    user: &str,
    password: &str,
    name: &str,
) -> PgConnectOptions {
    let options = PgConnectOptions::new()
        .host(host)
        .username(user)
        .database(name);

    if password.is_empty() {
        options
    } else {
        options.password(password)
    }
}

fn parse_flag(value: &str) -> Result<bool, anyhow::Error> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(anyhow::anyhow!("Invalid boolean flag: {}", value)),
    }
}

fn is_sql_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
