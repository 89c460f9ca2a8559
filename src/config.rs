use std::{env, fmt::Display, str::FromStr};

use thiserror::Error;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;
const NOTIFICATION_FROM: &str = "Sri Lanka Travel <onboarding@resend.dev>";
const DAILY_DISTANCE_KM: &str = "100";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid {key} value: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub mongodb_uri: String,
    pub jwt_secret: String,
    pub resend_api_key: Option<String>,
    pub admin_email: Option<String>,
    pub notification_from: String,
    pub openweather_api_key: Option<String>,
    pub ors_api_key: Option<String>,
    pub daily_distance_km: f64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let daily_distance_km: f64 = try_load("DAILY_DISTANCE_KM", DAILY_DISTANCE_KM)?;
        if !daily_distance_km.is_finite() || daily_distance_km <= 0.0 {
            return Err(ConfigError::Invalid {
                key: "DAILY_DISTANCE_KM",
                message: "must be a positive number".to_string(),
            });
        }

        Ok(Self {
            host: optional("HOST").unwrap_or_else(|| HOST.to_string()),
            port: try_load("PORT", &PORT.to_string())?,
            mongodb_uri: required("MONGODB_URI")?,
            jwt_secret: required("JWT_SECRET")?,
            resend_api_key: optional("RESEND_API_KEY"),
            admin_email: optional("ADMIN_EMAIL"),
            notification_from: optional("NOTIFICATION_FROM")
                .unwrap_or_else(|| NOTIFICATION_FROM.to_string()),
            openweather_api_key: optional("OPENWEATHER_API_KEY"),
            ors_api_key: optional("ORS_API_KEY"),
            daily_distance_km,
        })
    }
}

/// Set and non-blank.
fn optional(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    optional(key).ok_or(ConfigError::Missing(key))
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let raw = optional(key).unwrap_or_else(|| {
        log::info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const KEYS: [&str; 5] = ["MONGODB_URI", "JWT_SECRET", "PORT", "DAILY_DISTANCE_KM", "ADMIN_EMAIL"];

    fn clear() {
        for key in KEYS {
            env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_defaults_and_required_values() {
        clear();
        assert!(matches!(
            AppConfig::from_env(),
            Err(ConfigError::Missing("MONGODB_URI"))
        ));

        env::set_var("MONGODB_URI", "mongodb://localhost:27017");
        env::set_var("JWT_SECRET", "secret");
        env::set_var("ADMIN_EMAIL", "   ");

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.daily_distance_km, 100.0);
        assert_eq!(config.admin_email, None);
        clear();
    }

    #[test]
    #[serial]
    fn test_invalid_values_are_rejected() {
        clear();
        env::set_var("MONGODB_URI", "mongodb://localhost:27017");
        env::set_var("JWT_SECRET", "secret");

        env::set_var("PORT", "eighty");
        assert!(matches!(
            AppConfig::from_env(),
            Err(ConfigError::Invalid { key: "PORT", .. })
        ));
        env::remove_var("PORT");

        env::set_var("DAILY_DISTANCE_KM", "-5");
        assert!(matches!(
            AppConfig::from_env(),
            Err(ConfigError::Invalid {
                key: "DAILY_DISTANCE_KM",
                ..
            })
        ));
        clear();
    }
}
