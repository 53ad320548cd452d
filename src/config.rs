use serde::Deserialize;

/// Number of UBO slots configured on the marketplace when `MAX_UBOS` is unset.
pub const DEFAULT_MAX_UBOS: u32 = 4;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub max_ubos: u32,
    pub mirakl_base_url: String,
    pub mirakl_api_key: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: std::env::var("DB_URL")
                .or_else(|_| std::env::var("DATABASE_URL"))
                .map_err(|_| {
                    anyhow::anyhow!("DB_URL or DATABASE_URL environment variable required")
                })
                .and_then(|url| {
                    if url.trim().is_empty() {
                        anyhow::bail!("DB_URL cannot be empty");
                    }
                    if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                        anyhow::bail!("DB_URL must start with postgresql:// or postgres://");
                    }
                    Ok(url)
                })?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            max_ubos: parse_max_ubos(std::env::var("MAX_UBOS").ok().as_deref())?,
            mirakl_base_url: std::env::var("MIRAKL_BASE_URL")
                .map_err(|_| anyhow::anyhow!("MIRAKL_BASE_URL environment variable required"))
                .and_then(|url| {
                    if url.trim().is_empty() {
                        anyhow::bail!("MIRAKL_BASE_URL cannot be empty");
                    }
                    if !url.starts_with("http://") && !url.starts_with("https://") {
                        anyhow::bail!("MIRAKL_BASE_URL must start with http:// or https://");
                    }
                    Ok(url.trim_end_matches('/').to_string())
                })?,
            mirakl_api_key: std::env::var("MIRAKL_API_KEY")
                .map_err(|_| anyhow::anyhow!("MIRAKL_API_KEY environment variable required"))
                .and_then(|key| {
                    if key.trim().is_empty() {
                        anyhow::bail!("MIRAKL_API_KEY cannot be empty");
                    }
                    Ok(key)
                })?,
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!(
            "Database URL: {}...",
            &config.database_url[..20.min(config.database_url.len())]
        );
        tracing::debug!("Mirakl Base URL: {}", config.mirakl_base_url);
        tracing::info!("Max UBOs per shop: {}", config.max_ubos);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}

/// Parses the `MAX_UBOS` setting, falling back to [`DEFAULT_MAX_UBOS`] when unset or blank.
pub fn parse_max_ubos(raw: Option<&str>) -> anyhow::Result<u32> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(DEFAULT_MAX_UBOS);
    };

    let max_ubos: u32 = raw
        .parse()
        .map_err(|_| anyhow::anyhow!("MAX_UBOS must be a positive integer, got '{}'", raw))?;
    if max_ubos < 1 {
        anyhow::bail!("MAX_UBOS must be at least 1, got {}", max_ubos);
    }

    Ok(max_ubos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_ubos_defaults_to_four() {
        assert_eq!(parse_max_ubos(None).unwrap(), 4);
        assert_eq!(parse_max_ubos(Some("  ")).unwrap(), 4);
    }

    #[test]
    fn test_max_ubos_parsed() {
        assert_eq!(parse_max_ubos(Some("6")).unwrap(), 6);
        assert_eq!(parse_max_ubos(Some(" 1 ")).unwrap(), 1);
    }

    #[test]
    fn test_max_ubos_rejects_zero_and_garbage() {
        assert!(parse_max_ubos(Some("0")).is_err());
        assert!(parse_max_ubos(Some("-2")).is_err());
        assert!(parse_max_ubos(Some("four")).is_err());
    }
}
