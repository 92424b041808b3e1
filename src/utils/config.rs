use std::env;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::view::{
    cart_panel::PanelSettings,
    order_message::{MessagingTarget, OrderTemplate, DEFAULT_MESSAGING_URL, DEFAULT_RECIPIENT},
};

#[derive(Debug, Clone)]
pub struct Config {
    pub messaging_url: String,
    pub order_recipient: String,
    pub close_delay_ms: u64,
    pub catalog_path: Option<PathBuf>,
    pub log_level: String,
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            messaging_url: DEFAULT_MESSAGING_URL.to_string(),
            order_recipient: DEFAULT_RECIPIENT.to_string(),
            close_delay_ms: 300,
            catalog_path: None,
            log_level: "info".to_string(),
            environment: "development".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        let defaults = Config::default();

        let close_delay_ms = match env::var("CART_CLOSE_DELAY_MS") {
            Ok(value) => value.trim().parse::<u64>().map_err(|_| {
                anyhow::anyhow!("CART_CLOSE_DELAY_MS must be a whole number of milliseconds")
            })?,
            Err(_) => defaults.close_delay_ms,
        };

        let config = Config {
            messaging_url: env::var("CART_MESSAGING_URL").unwrap_or(defaults.messaging_url),
            order_recipient: env::var("CART_ORDER_RECIPIENT").unwrap_or(defaults.order_recipient),
            close_delay_ms,
            catalog_path: env::var("CART_CATALOG")
                .ok()
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            environment: env::var("APP_ENV").unwrap_or(defaults.environment),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        let url = Url::parse(&self.messaging_url)
            .map_err(|e| anyhow::anyhow!("CART_MESSAGING_URL is not a valid URL: {}", e))?;

        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(anyhow::anyhow!(
                "CART_MESSAGING_URL must start with 'https://' or 'http://'"
            ));
        }

        if self.order_recipient.is_empty()
            || !self.order_recipient.chars().all(|c| c.is_ascii_digit())
        {
            return Err(anyhow::anyhow!(
                "CART_ORDER_RECIPIENT must be a phone number made of digits only"
            ));
        }

        if self.is_production() && self.order_recipient == DEFAULT_RECIPIENT {
            return Err(anyhow::anyhow!(
                "CART_ORDER_RECIPIENT is not set in production"
            ));
        }

        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn close_delay(&self) -> Duration {
        Duration::from_millis(self.close_delay_ms)
    }

    pub fn messaging_target(&self) -> anyhow::Result<MessagingTarget> {
        let base_url = Url::parse(&self.messaging_url)?;
        Ok(MessagingTarget::new(base_url, self.order_recipient.clone()))
    }

    pub fn panel_settings(&self) -> anyhow::Result<PanelSettings> {
        Ok(PanelSettings {
            close_delay: self.close_delay(),
            target: self.messaging_target()?,
            template: OrderTemplate::default(),
        })
    }
}
