use std::env;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
    pub jwt_secret: String,
    pub jwt_expiration_secs: u64,
    pub jwt_refresh_secret: String,
    pub jwt_refresh_expiration_secs: u64,
    pub cors_origin: String,
    pub rate_limit_window_secs: u64,
    pub rate_limit_requests: u32,
    pub bcrypt_cost: u32,
}

const DEFAULT_JWT_EXPIRATION: &str = "7d";
const DEFAULT_JWT_REFRESH_EXPIRATION: &str = "30d";
// 令牌寿命上限：10 年
const MAX_TOKEN_LIFETIME_SECS: u64 = 3650 * 86_400;

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let jwt_expiration = optional("JWT_EXPIRES_IN")
            .unwrap_or_else(|| DEFAULT_JWT_EXPIRATION.to_string());
        let jwt_refresh_expiration = optional("JWT_REFRESH_EXPIRES_IN")
            .unwrap_or_else(|| DEFAULT_JWT_REFRESH_EXPIRATION.to_string());

        Ok(Config {
            database_url: required("DATABASE_URL")?,
            redis_url: required("REDIS_URL")?,
            server_host: optional("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            server_port: parsed("SERVER_PORT", 3000)?,
            api_base_uri: optional("API_BASE_URI").unwrap_or_else(|| "/api".into()),
            jwt_secret: required("JWT_SECRET")?,
            jwt_expiration_secs: token_lifetime_secs("JWT_EXPIRES_IN", &jwt_expiration)?,
            jwt_refresh_secret: required("JWT_REFRESH_SECRET")?,
            jwt_refresh_expiration_secs: token_lifetime_secs(
                "JWT_REFRESH_EXPIRES_IN",
                &jwt_refresh_expiration,
            )?,
            cors_origin: optional("CORS_ORIGIN").unwrap_or_else(|| "*".into()),
            rate_limit_window_secs: parsed("RATE_LIMIT_WINDOW", 60)?,
            rate_limit_requests: parsed("RATE_LIMIT_REQUESTS", 100)?,
            bcrypt_cost: parsed("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
        })
    }

    pub fn jwt_expiration(&self) -> Duration {
        Duration::from_secs(self.jwt_expiration_secs)
    }

    pub fn jwt_refresh_expiration(&self) -> Duration {
        Duration::from_secs(self.jwt_refresh_expiration_secs)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::Missing(name))
}

fn parsed<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

/// 解析令牌寿命，拒绝 0 和超过上限的值
pub fn token_lifetime_secs(name: &'static str, raw: &str) -> Result<u64, ConfigError> {
    parse_duration_secs(raw)
        .filter(|secs| (1..=MAX_TOKEN_LIFETIME_SECS).contains(secs))
        .ok_or_else(|| ConfigError::Invalid {
            name,
            value: raw.to_string(),
        })
}

/// 解析 `90`、`45s`、`15m`、`12h`、`7d` 形式的时长，返回秒数
pub fn parse_duration_secs(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    let (digits, unit) = match raw.char_indices().find(|(_, c)| !c.is_ascii_digit()) {
        Some((idx, _)) => raw.split_at(idx),
        None => (raw, "s"),
    };
    let value: u64 = digits.parse().ok()?;
    let multiplier = match unit {
        "s" => 1,
        "m" => 60,
        "h" => 3600,
        "d" => 86_400,
        _ => return None,
    };
    value.checked_mul(multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_duration_suffixes() {
        assert_eq!(parse_duration_secs("7d"), Some(7 * 86_400));
        assert_eq!(parse_duration_secs("30d"), Some(30 * 86_400));
        assert_eq!(parse_duration_secs("12h"), Some(12 * 3600));
        assert_eq!(parse_duration_secs("15m"), Some(900));
        assert_eq!(parse_duration_secs("45s"), Some(45));
        assert_eq!(parse_duration_secs("90"), Some(90));
    }

    #[test]
    fn token_lifetime_accepts_defaults() {
        assert_eq!(token_lifetime_secs("JWT_EXPIRES_IN", "7d").unwrap(), 7 * 86_400);
        assert_eq!(
            token_lifetime_secs("JWT_REFRESH_EXPIRES_IN", "30d").unwrap(),
            30 * 86_400
        );
        assert_eq!(
            token_lifetime_secs("JWT_EXPIRES_IN", "3650d").unwrap(),
            MAX_TOKEN_LIFETIME_SECS
        );
    }

    #[test]
    fn token_lifetime_rejects_zero_and_oversized_values() {
        for raw in ["0", "0d", "3651d", "100000000000d", "abc"] {
            let err = token_lifetime_secs("JWT_EXPIRES_IN", raw).unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { name: "JWT_EXPIRES_IN", ref value } if value == raw),
                "accepted {raw:?}"
            );
        }
    }

    #[test]
    fn rejects_unknown_duration_units() {
        assert_eq!(parse_duration_secs("3w"), None);
        assert_eq!(parse_duration_secs("d"), None);
        assert_eq!(parse_duration_secs(""), None);
    }
}
