use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

/// Credentials for the administrator created at startup when none exists.
#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapAdminConfig {
    pub login: String,
    pub name: String,
    pub password: String,
    pub gender: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub admin: BootstrapAdminConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "userhub".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "userhub-users".into()),
        };
        let admin = BootstrapAdminConfig {
            login: std::env::var("ADMIN_LOGIN").unwrap_or_else(|_| "admin".into()),
            name: std::env::var("ADMIN_NAME").unwrap_or_else(|_| "Administrator".into()),
            password: std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin".into()),
            gender: std::env::var("ADMIN_GENDER")
                .ok()
                .and_then(|v| v.parse::<i32>().ok())
                .unwrap_or(2),
        };
        Ok(Self {
            database_url,
            jwt,
            admin,
        })
    }
}
