use std::{env, path::PathBuf, time::Duration};
use thiserror::Error;

use crate::services::document::{
    substitution::DEFAULT_SENTINEL_WINDOW, SubstitutionOptions, TemplateLocation, TemplateSpec,
};

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;
const TOURS_PATH: &str = "data/tours.json";
const CONTRACT_TEMPLATE: &str = "templates/contract.docx";
const INVOICE_TEMPLATE: &str = "templates/invoice.docx";
const FETCH_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} is not a valid template location: {reason}")]
    InvalidTemplate { name: &'static str, reason: String },
}

/// Where tour rate cards come from.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogSource {
    Mongo(String),
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub catalog: CatalogSource,
    pub templates: Vec<TemplateSpec>,
    pub fetch_timeout: Option<Duration>,
    pub substitution: SubstitutionOptions,
    pub allowed_origin: Option<String>,
}

fn var_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn template(
    key: &str,
    name: &'static str,
    default_location: &str,
    file_name_var: &str,
    default_file_name: &str,
) -> Result<TemplateSpec, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default_location.to_string());
    let location = TemplateLocation::parse(&raw).map_err(|e| ConfigError::InvalidTemplate {
        name,
        reason: e.to_string(),
    })?;
    Ok(TemplateSpec {
        key: key.to_string(),
        location,
        file_name: env::var(file_name_var).unwrap_or_else(|_| default_file_name.to_string()),
    })
}

impl Config {
    /// Build the configuration from environment variables, with defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let catalog = match env::var("MONGODB_URI") {
            Ok(uri) if !uri.trim().is_empty() => CatalogSource::Mongo(uri),
            _ => CatalogSource::File(PathBuf::from(
                env::var("TOURS_PATH").unwrap_or_else(|_| TOURS_PATH.to_string()),
            )),
        };

        let templates = vec![
            template(
                "contract",
                "CONTRACT_TEMPLATE",
                CONTRACT_TEMPLATE,
                "CONTRACT_FILE_NAME",
                "Contract.docx",
            )?,
            template(
                "invoice",
                "INVOICE_TEMPLATE",
                INVOICE_TEMPLATE,
                "INVOICE_FILE_NAME",
                "Invoice.docx",
            )?,
        ];

        // 0 disables the client-side timeout
        let fetch_timeout = match var_or("TEMPLATE_FETCH_TIMEOUT_SECS", FETCH_TIMEOUT_SECS) {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| HOST.to_string()),
            port: var_or("PORT", PORT),
            catalog,
            templates,
            fetch_timeout,
            substitution: SubstitutionOptions {
                sentinel_window: var_or("SENTINEL_WINDOW", DEFAULT_SENTINEL_WINDOW),
            },
            allowed_origin: env::var("ALLOWED_ORIGIN").ok().filter(|o| !o.trim().is_empty()),
        })
    }
}
