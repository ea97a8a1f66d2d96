use secrecy::SecretString;
use std::env;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn from_env() -> Self {
        match env::var("APP_ENV").as_deref() {
            Ok("production") => Environment::Production,
            _ => Environment::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_conn_string: String,
    pub mongo_db_name: String,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub client_origin: String,
    pub jwt_access_secret: SecretString,
    pub jwt_refresh_secret: SecretString,
    pub access_token_ttl_minutes: i64,
    pub refresh_token_ttl_days: i64,
    pub bcrypt_cost: u32,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            mongo_conn_string: env::var("MONGO_CONN_STRING")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            mongo_db_name: env::var("MONGO_DB_NAME")
                .unwrap_or_else(|_| "mathsprint-local".to_string()),
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            web_server_port: env::var("WEB_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(4000),
            client_origin: env::var("CLIENT_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            jwt_access_secret: SecretString::from(
                env::var("JWT_ACCESS_SECRET")
                    .unwrap_or_else(|_| "dev_access_secret_change_in_production".to_string()),
            ),
            jwt_refresh_secret: SecretString::from(
                env::var("JWT_REFRESH_SECRET")
                    .unwrap_or_else(|_| "dev_refresh_secret_change_in_production".to_string()),
            ),
            access_token_ttl_minutes: env::var("ACCESS_TOKEN_TTL_MINUTES")
                .ok()
                .and_then(|m| m.parse().ok())
                .unwrap_or(15),
            refresh_token_ttl_days: env::var("REFRESH_TOKEN_TTL_DAYS")
                .ok()
                .and_then(|d| d.parse().ok())
                .unwrap_or(7),
            bcrypt_cost: env::var("BCRYPT_COST")
                .ok()
                .and_then(|c| c.parse().ok())
                .unwrap_or(bcrypt::DEFAULT_COST),
            environment: Environment::from_env(),
        }
    }

    /// Validate that production-critical configuration is set
    /// Panics if required secrets are using default values
    pub fn validate_for_production(&self) {
        use secrecy::ExposeSecret;

        let access_secret = self.jwt_access_secret.expose_secret();
        let refresh_secret = self.jwt_refresh_secret.expose_secret();

        if access_secret == "dev_access_secret_change_in_production" {
            panic!(
                "FATAL: JWT_ACCESS_SECRET is using default value! Set JWT_ACCESS_SECRET environment variable to a secure random string."
            );
        }

        if access_secret.len() < 32 {
            panic!(
                "FATAL: JWT_ACCESS_SECRET is too short ({}). Must be at least 32 characters for security.",
                access_secret.len()
            );
        }

        if refresh_secret == "dev_refresh_secret_change_in_production" {
            panic!(
                "FATAL: JWT_REFRESH_SECRET is using default value! Set JWT_REFRESH_SECRET environment variable."
            );
        }

        if refresh_secret.len() < 32 {
            panic!(
                "FATAL: JWT_REFRESH_SECRET is too short ({}). Must be at least 32 characters for security.",
                refresh_secret.len()
            );
        }

        if access_secret == refresh_secret {
            panic!("FATAL: JWT_ACCESS_SECRET and JWT_REFRESH_SECRET must be distinct secrets.");
        }
    }

    pub fn test_config() -> Self {
        Self {
            mongo_conn_string: "mongodb://localhost:27017".to_string(),
            mongo_db_name: "mathsprint-test".to_string(),
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 4000,
            client_origin: "http://localhost:3000".to_string(),
            jwt_access_secret: SecretString::from("test_access_secret_key".to_string()),
            jwt_refresh_secret: SecretString::from("test_refresh_secret_key".to_string()),
            access_token_ttl_minutes: 15,
            refresh_token_ttl_days: 7,
            // Low cost keeps test hashing fast; production uses bcrypt::DEFAULT_COST.
            bcrypt_cost: 4,
            environment: Environment::Development,
        }
    }
}
