//! Logging initialization module

use std::str::FromStr;
use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

use crate::errors::GatewayError;

/// Environment variable selecting the profile for [`init_from_env`]
pub const PROFILE_ENV: &str = "ROWGATE_LOG_PROFILE";

const DEVELOPMENT_FILTER: &str = "rowgate_core=debug,rowgate_store=debug";
const PRODUCTION_FILTER: &str = "rowgate_core=info,rowgate_store=info";

/// Logging profile configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output for development
    Development,
    /// JSON structured output for production
    Production,
    /// Test capture mode for deterministic testing
    Test,
}

impl FromStr for Profile {
    type Err = GatewayError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Profile::Development),
            "production" | "prod" => Ok(Profile::Production),
            "test" => Ok(Profile::Test),
            other => Err(GatewayError::invalid_configuration(format!(
                "unknown logging profile '{}'",
                other
            ))),
        }
    }
}

static INIT_ONCE: Once = Once::new();

/// Initialize the logging facility
///
/// Call once at application startup; later calls are no-ops. `RUST_LOG`
/// overrides the profile's default filter.
///
/// - **Development**: human-readable logs at debug level
/// - **Production**: JSON structured logs at info level
/// - **Test**: bare registry; use `init_test_capture()` to record events
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| match profile {
        Profile::Development => {
            tracing_subscriber::fmt()
                .with_env_filter(filter_or(DEVELOPMENT_FILTER))
                .init();
        }
        Profile::Production => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter_or(PRODUCTION_FILTER))
                .init();
        }
        Profile::Test => {
            tracing_subscriber::registry().init();
        }
    });
}

/// Initialize from `ROWGATE_LOG_PROFILE`, falling back to `Development`
///
/// # Errors
///
/// Returns `InvalidConfiguration` when the variable names no known profile.
pub fn init_from_env() -> Result<Profile, GatewayError> {
    let profile = match std::env::var(PROFILE_ENV) {
        Ok(value) => value.parse()?,
        Err(_) => Profile::Development,
    };
    init(profile);
    Ok(profile)
}

fn filter_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_idempotent() {
        init(Profile::Test);
        init(Profile::Test);
    }

    #[test]
    fn test_profile_parsing() {
        assert_eq!("prod".parse::<Profile>().unwrap(), Profile::Production);
        assert_eq!(" Development ".parse::<Profile>().unwrap(), Profile::Development);
        assert_eq!("test".parse::<Profile>().unwrap(), Profile::Test);
    }

    #[test]
    fn test_unknown_profile_is_configuration_error() {
        let err = "verbose".parse::<Profile>().unwrap_err();
        assert!(matches!(err, GatewayError::InvalidConfiguration { .. }));
    }
}
