use std::net::SocketAddr;
use std::time::Duration;

use clap::{ArgAction, Parser};
use wa_relay_core::{DEFAULT_COUNTRY_CODE, DEFAULT_PING_COMMAND, DEFAULT_PING_REPLY};

/// Runtime settings, read from flags with environment fallbacks.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "HTTP relay for sending WhatsApp text messages")]
pub struct RelayConfig {
    /// Address the HTTP server listens on
    #[arg(long, env = "RELAY_BIND", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// Base URL of the browser automation bridge
    #[arg(long, env = "RELAY_BRIDGE_URL", default_value = "http://127.0.0.1:3000")]
    pub bridge_url: String,

    /// Shared token for bridge calls and the session events webhook
    #[arg(long, env = "RELAY_BRIDGE_TOKEN")]
    pub bridge_token: Option<String>,

    /// Name of the cached session the bridge should resume
    #[arg(long, env = "RELAY_CLIENT_ID", default_value = "default")]
    pub client_id: String,

    /// URL the bridge uses to reach this relay
    #[arg(long, env = "RELAY_PUBLIC_URL", default_value = "http://127.0.0.1:8080")]
    pub public_url: String,

    /// Run the bridge browser headless
    #[arg(long, env = "RELAY_HEADLESS", default_value_t = true, action = ArgAction::Set)]
    pub headless: bool,

    /// Per-call timeout for registration checks and sends
    #[arg(long, env = "RELAY_BRIDGE_TIMEOUT_SECS", default_value_t = 30)]
    pub bridge_timeout_secs: u64,

    /// Country code that replaces a leading trunk `0`
    #[arg(long, env = "RELAY_COUNTRY_CODE", default_value = DEFAULT_COUNTRY_CODE)]
    pub country_code: String,

    #[arg(long, env = "RELAY_PING_COMMAND", default_value = DEFAULT_PING_COMMAND)]
    pub ping_command: String,

    #[arg(long, env = "RELAY_PING_REPLY", default_value = DEFAULT_PING_REPLY)]
    pub ping_reply: String,

    /// Record sends in memory instead of talking to a bridge
    #[arg(long, env = "RELAY_DRY_RUN")]
    pub dry_run: bool,
}

impl RelayConfig {
    /// Endpoint the bridge posts session events to.
    pub fn webhook_url(&self) -> String {
        format!("{}/session/events", self.public_url.trim_end_matches('/'))
    }

    pub fn bridge_timeout(&self) -> Duration {
        Duration::from_secs(self.bridge_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_deployment() {
        let cfg = RelayConfig::try_parse_from(["wa-relay"]).unwrap();
        assert_eq!(cfg.bind.port(), 8080);
        assert_eq!(cfg.client_id, "default");
        assert!(cfg.headless);
        assert!(!cfg.dry_run);
        assert_eq!(cfg.country_code, "62");
        assert_eq!(cfg.ping_command, "!ping");
        assert_eq!(cfg.ping_reply, "pong : ");
        assert_eq!(cfg.bridge_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn webhook_url_joins_public_url() {
        let cfg = RelayConfig::try_parse_from([
            "wa-relay",
            "--public-url",
            "https://relay.example.com/",
            "--headless",
            "false",
        ])
        .unwrap();
        assert_eq!(cfg.webhook_url(), "https://relay.example.com/session/events");
        assert!(!cfg.headless);
    }

    #[test]
    fn rejects_bad_bind_address() {
        assert!(RelayConfig::try_parse_from(["wa-relay", "--bind", "not-an-addr"]).is_err());
    }
}
