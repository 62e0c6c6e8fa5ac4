use std::env;

use gateway_tools::{MomoConfig, SePayConfig, VietQrConfig, VnPayConfig};
use log::*;

const DEFAULT_GNP_HOST: &str = "127.0.0.1";
const DEFAULT_GNP_PORT: u16 = 8360;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Storefront base URL. VNPay return redirects land on `{frontend_url}/payment/result`.
    pub frontend_url: String,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address, rather than
    /// the connection's remote address.
    pub use_x_forwarded_for: bool,
    /// If true, the Forwarded header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_forwarded: bool,
    pub momo: MomoConfig,
    pub vnpay: VnPayConfig,
    pub sepay: SePayConfig,
    pub vietqr: VietQrConfig,
    pub mail: MailConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_GNP_HOST.to_string(),
            port: DEFAULT_GNP_PORT,
            database_url: String::default(),
            frontend_url: String::default(),
            use_x_forwarded_for: false,
            use_forwarded: false,
            momo: MomoConfig::default(),
            vnpay: VnPayConfig::default(),
            sepay: SePayConfig::default(),
            vietqr: VietQrConfig::default(),
            mail: MailConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("GNP_HOST").ok().unwrap_or_else(|| DEFAULT_GNP_HOST.into());
        let port = env::var("GNP_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for GNP_PORT. {e} Using the default, {DEFAULT_GNP_PORT}, instead."
                    );
                    DEFAULT_GNP_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_GNP_PORT);
        let database_url = env::var("GNP_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ GNP_DATABASE_URL is not set. Please set it to the URL for the GiftNest database.");
            String::default()
        });
        let frontend_url = env::var("GNP_FRONTEND_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ GNP_FRONTEND_URL is not set. VNPay return redirects will not reach the storefront.");
            String::default()
        });
        let use_x_forwarded_for =
            env::var("GNP_USE_X_FORWARDED_FOR").map(|s| &s == "1" || &s == "true").unwrap_or(false);
        let use_forwarded = env::var("GNP_USE_FORWARDED").map(|s| &s == "1" || &s == "true").unwrap_or(false);
        Self {
            host,
            port,
            database_url,
            frontend_url,
            use_x_forwarded_for,
            use_forwarded,
            momo: MomoConfig::new_from_env_or_default(),
            vnpay: VnPayConfig::new_from_env_or_default(),
            sepay: SePayConfig::new_from_env_or_default(),
            vietqr: VietQrConfig::new_from_env_or_default(),
            mail: MailConfig::from_env_or_default(),
        }
    }
}

//-------------------------------------------------  MailConfig  ------------------------------------------------------
/// Where order-confirmation emails go. The server does not speak SMTP itself; it POSTs a JSON payload to a
/// mail webhook and lets that service do the delivery.
#[derive(Clone, Debug, Default)]
pub struct MailConfig {
    pub webhook_url: String,
}

impl MailConfig {
    pub fn from_env_or_default() -> Self {
        let webhook_url = env::var("GNP_MAIL_WEBHOOK_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ GNP_MAIL_WEBHOOK_URL is not set. Order confirmation emails will not be sent.");
            String::default()
        });
        Self { webhook_url }
    }

    pub fn is_configured(&self) -> bool {
        !self.webhook_url.is_empty()
    }
}

//-------------------------------------------------  ServerOptions  ---------------------------------------------------
/// A subset of the server configuration that is used to configure the server's behaviour. Generally we try
/// to keep this as small as possible, and exclude secrets to avoid passing sensitive information around the
/// system.
#[derive(Clone, Debug)]
pub struct ServerOptions {
    pub use_x_forwarded_for: bool,
    pub use_forwarded: bool,
    pub frontend_url: String,
}

impl ServerOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            use_x_forwarded_for: config.use_x_forwarded_for,
            use_forwarded: config.use_forwarded,
            frontend_url: config.frontend_url.clone(),
        }
    }
}
