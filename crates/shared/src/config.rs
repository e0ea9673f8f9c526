//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Commission policy configuration.
    #[serde(default)]
    pub commission: CommissionSettings,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Commission policy configuration.
///
/// Rates are percentages of a plot's total amount. The upline list is ordered
/// by level, so its length is the maximum referral depth that earns a share.
#[derive(Debug, Clone, Deserialize)]
pub struct CommissionSettings {
    /// Paid percentage at which a booked plot becomes sold and commission
    /// distribution runs.
    #[serde(default = "default_sale_trigger_percent")]
    pub sale_trigger_percent: Decimal,
    /// Paid percentage at or above which a booking can no longer be cancelled.
    #[serde(default = "default_cancellation_limit_percent")]
    pub cancellation_limit_percent: Decimal,
    /// Rate credited to the selling broker.
    #[serde(default = "default_direct_rate_percent")]
    pub direct_rate_percent: Decimal,
    /// Rates credited up the referral chain, one entry per level.
    #[serde(default = "default_upline_rate_percents")]
    pub upline_rate_percents: Vec<Decimal>,
}

fn default_sale_trigger_percent() -> Decimal {
    Decimal::new(50, 0)
}

fn default_cancellation_limit_percent() -> Decimal {
    Decimal::new(50, 0)
}

fn default_direct_rate_percent() -> Decimal {
    Decimal::new(6, 0)
}

fn default_upline_rate_percents() -> Vec<Decimal> {
    vec![Decimal::new(2, 0), Decimal::new(5, 1)]
}

impl Default for CommissionSettings {
    fn default() -> Self {
        Self {
            sale_trigger_percent: default_sale_trigger_percent(),
            cancellation_limit_percent: default_cancellation_limit_percent(),
            direct_rate_percent: default_direct_rate_percent(),
            upline_rate_percents: default_upline_rate_percents(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("PLOTBOOK").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_commission_defaults() {
        let settings = CommissionSettings::default();
        assert_eq!(settings.sale_trigger_percent, dec!(50));
        assert_eq!(settings.cancellation_limit_percent, dec!(50));
        assert_eq!(settings.direct_rate_percent, dec!(6));
        assert_eq!(settings.upline_rate_percents, vec![dec!(2), dec!(0.5)]);
    }

    #[test]
    fn test_server_defaults() {
        assert_eq!(default_host(), "0.0.0.0");
        assert_eq!(default_port(), 8080);
    }
}
