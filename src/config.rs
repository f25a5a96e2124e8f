use std::env;

/// Image host account credentials, read once at startup and handed to the
/// client constructor. The upload API is Cloudinary-compatible.
#[derive(Debug, Clone)]
pub struct ImageHostConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub image_host: ImageHostConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        // Missing credentials leave uploads failing (and logged), which is
        // non-fatal to entity operations; the server still boots.
        let image_host = ImageHostConfig {
            cloud_name: env::var("CLOUDINARY_CLOUD_NAME").unwrap_or_default(),
            api_key: env::var("CLOUDINARY_API_KEY").unwrap_or_default(),
            api_secret: env::var("CLOUDINARY_API_SECRET").unwrap_or_default(),
        };
        Ok(Self {
            port,
            database_url,
            host,
            image_host,
        })
    }
}
