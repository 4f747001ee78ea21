//! Gateway context and configuration
//!
//! A [`GatewayContext`] bundles the connection a gateway talks to with its
//! tunables. Contexts are normally passed to gateway constructors directly;
//! applications that prefer a process-wide default can register one here
//! and construct gateways with `TableGateway::open_default`.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::collaborators::Connection;
use crate::errors::{GatewayError, Result};

/// Name of the context `default_context` resolves
pub const DEFAULT_CONTEXT: &str = "default";

fn default_page_size() -> usize {
    100
}

/// Gateway tunables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GatewayConfig {
    /// Rows fetched per page by lazy iterators
    pub page_size: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

impl GatewayConfig {
    /// Parse and validate a TOML document; absent keys take defaults
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` on malformed TOML or invalid values.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| GatewayError::invalid_configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// `InvalidConfiguration` on malformed values.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| GatewayError::invalid_configuration(e.to_string()))
    }

    /// # Errors
    ///
    /// `InvalidConfiguration` if `page_size` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(GatewayError::invalid_configuration(
                "page_size must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// Connection plus configuration shared by the gateways built from it
#[derive(Clone)]
pub struct GatewayContext {
    connection: Arc<dyn Connection>,
    config: GatewayConfig,
}

impl GatewayContext {
    pub fn new(connection: Arc<dyn Connection>) -> Self {
        Self {
            connection,
            config: GatewayConfig::default(),
        }
    }

    /// # Errors
    ///
    /// `InvalidConfiguration` if `config` does not validate.
    pub fn with_config(connection: Arc<dyn Connection>, config: GatewayConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { connection, config })
    }

    pub fn connection(&self) -> &dyn Connection {
        self.connection.as_ref()
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

impl std::fmt::Debug for GatewayContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

// ========== Default context holder ==========

static CONTEXTS: OnceLock<RwLock<HashMap<String, GatewayContext>>> = OnceLock::new();

fn contexts() -> &'static RwLock<HashMap<String, GatewayContext>> {
    CONTEXTS.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Register the context `default_context` returns
pub fn set_default(context: GatewayContext) {
    set_named(DEFAULT_CONTEXT, context);
}

/// Register a context under `name`, replacing any previous one
pub fn set_named(name: &str, context: GatewayContext) {
    contexts()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(name.to_string(), context);
}

/// # Errors
///
/// `NotConfigured` if no default context is registered.
pub fn default_context() -> Result<GatewayContext> {
    named_context(DEFAULT_CONTEXT)
}

/// # Errors
///
/// `NotConfigured` if nothing is registered under `name`.
pub fn named_context(name: &str) -> Result<GatewayContext> {
    contexts()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(name)
        .cloned()
        .ok_or_else(|| GatewayError::NotConfigured {
            name: name.to_string(),
        })
}

pub fn clear_default() {
    clear_named(DEFAULT_CONTEXT);
}

pub fn clear_named(name: &str) {
    contexts()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(name);
}
