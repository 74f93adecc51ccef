use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_ttl_minutes: i64,
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn parsed_var<T>(name: &str, default: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    std::env::var(name)
        .unwrap_or_else(|_| default.into())
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid {}: {}", name, e))
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into());
        let port = parsed_var("PORT", "8080")?;
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;
        let database_max_connections = parsed_var("DATABASE_MAX_CONNECTIONS", "20")?;
        let jwt_secret =
            std::env::var("JWT_SECRET").map_err(|_| anyhow::anyhow!("JWT_SECRET must be set"))?;
        let jwt_ttl_minutes = parsed_var("JWT_TTL_MINUTES", "1440")?;
        let cors_origins = parse_origins(&std::env::var("CORS_ORIGINS").unwrap_or_default());

        Ok(Self {
            host,
            port,
            database_url,
            database_max_connections,
            jwt_secret,
            jwt_ttl_minutes,
            cors_origins,
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
