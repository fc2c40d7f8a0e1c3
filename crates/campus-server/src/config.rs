use campus_core::AppError;

/// Server process configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address, e.g. `0.0.0.0:8080`.
    pub addr: String,
    /// Environment tag used in startup logs (`dev`, `prod`, ...).
    pub env: String,
    /// Secret for signing bearer tokens. Required, there is no
    /// built-in default key.
    pub jwt_secret: String,
}

impl ServerConfig {
    /// Read configuration from environment variables.
    ///
    /// - `CAMPUS_ADDR` (optional, defaults to `0.0.0.0:8080`)
    /// - `CAMPUS_ENV` (optional, defaults to `dev`)
    /// - `CAMPUS_JWT_SECRET` (required)
    pub fn from_env() -> Result<Self, AppError> {
        let addr = std::env::var("CAMPUS_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let env = std::env::var("CAMPUS_ENV").unwrap_or_else(|_| "dev".to_string());
        let jwt_secret = std::env::var("CAMPUS_JWT_SECRET").map_err(|_| {
            AppError::Config("CAMPUS_JWT_SECRET not set. Required for token signing.".into())
        })?;

        Ok(Self {
            addr,
            env,
            jwt_secret,
        })
    }
}
