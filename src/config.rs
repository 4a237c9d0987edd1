use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

use crate::service::balance::DEFAULT_ANNUAL_ALLOWANCE;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,

    // Rate limiting
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    // Leave policy
    pub annual_leave_allowance: i64,
    pub serialize_leave_writes: bool,

    pub log_dir: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,

            rate_protected_per_min: parsed("RATE_PROTECTED_PER_MIN", 1000)?,

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),

            annual_leave_allowance: parsed("ANNUAL_LEAVE_ALLOWANCE", DEFAULT_ANNUAL_ALLOWANCE)?,
            serialize_leave_writes: parsed("SERIALIZE_LEAVE_WRITES", true)?,

            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
        })
    }
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn parsed<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsed_falls_back_and_reports_garbage() {
        assert_eq!(
            parsed::<i64>("HRM_LEAVE_TEST_UNSET_VALUE", 20).expect("default"),
            20
        );

        // SAFETY: the key is unique to this test.
        unsafe { env::set_var("HRM_LEAVE_TEST_BAD_VALUE", "twenty") };
        assert!(parsed::<i64>("HRM_LEAVE_TEST_BAD_VALUE", 20).is_err());

        unsafe { env::set_var("HRM_LEAVE_TEST_BOOL_VALUE", " false ") };
        assert!(!parsed::<bool>("HRM_LEAVE_TEST_BOOL_VALUE", true).expect("bool"));
    }
}
