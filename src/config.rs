use std::net::SocketAddr;

use anyhow::Context;
use serde::Deserialize;

/// Longest accepted session lifetime (one year).
pub const MAX_JWT_TTL_MINUTES: i64 = 60 * 24 * 365;

const DEFAULT_JWT_TTL_MINUTES: i64 = 60 * 24;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt: JwtConfig,
    pub host: String,
    pub port: u16,
    /// Allowed browser origin; `None` means any origin (development).
    pub cors_origin: Option<String>,
}

fn parse_ttl_minutes(raw: Option<String>) -> anyhow::Result<i64> {
    let Some(raw) = raw.filter(|v| !v.trim().is_empty()) else {
        return Ok(DEFAULT_JWT_TTL_MINUTES);
    };
    let minutes: i64 = raw
        .trim()
        .parse()
        .with_context(|| format!("JWT_TTL_MINUTES is not a number: {raw}"))?;
    anyhow::ensure!(
        (1..=MAX_JWT_TTL_MINUTES).contains(&minutes),
        "JWT_TTL_MINUTES must be between 1 and {MAX_JWT_TTL_MINUTES}, got {minutes}"
    );
    Ok(minutes)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let database_max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "event-planner".into()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "event-planner-users".into()),
            ttl_minutes: parse_ttl_minutes(std::env::var("JWT_TTL_MINUTES").ok())?,
        };
        let host = std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = std::env::var("APP_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(5000);
        let cors_origin = std::env::var("CORS_ORIGIN").ok().filter(|v| !v.is_empty());

        Ok(Self {
            database_url,
            database_max_connections,
            jwt,
            host,
            port,
            cors_origin,
        })
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AppConfig {
        AppConfig {
            database_url: "postgres://localhost/events".into(),
            database_max_connections: 5,
            jwt: JwtConfig {
                secret: "s".into(),
                issuer: "i".into(),
                audience: "a".into(),
                ttl_minutes: 1,
            },
            host: "127.0.0.1".into(),
            port: 5000,
            cors_origin: None,
        }
    }

    #[test]
    fn bind_addr_parses_host_and_port() {
        let addr = sample().bind_addr().expect("valid addr");
        assert_eq!(addr.port(), 5000);
        assert!(addr.ip().is_loopback());
    }

    #[test]
    fn ttl_defaults_to_one_day() {
        assert_eq!(parse_ttl_minutes(None).unwrap(), 60 * 24);
        assert_eq!(parse_ttl_minutes(Some(" ".into())).unwrap(), 60 * 24);
        assert_eq!(parse_ttl_minutes(Some(" 90 ".into())).unwrap(), 90);
    }

    #[test]
    fn ttl_outside_range_is_rejected() {
        for raw in ["0", "-5", "abc", "9223372036854775807", "99999999999999999999"] {
            assert!(parse_ttl_minutes(Some(raw.into())).is_err(), "{raw}");
        }
        let max = MAX_JWT_TTL_MINUTES.to_string();
        assert_eq!(parse_ttl_minutes(Some(max)).unwrap(), MAX_JWT_TTL_MINUTES);
    }

    #[test]
    fn bind_addr_rejects_garbage_host() {
        let mut cfg = sample();
        cfg.host = "not a host".into();
        assert!(cfg.bind_addr().is_err());
    }
}
