use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

#[derive(Clone)]
pub struct TelegramClient {
    http: Client,
    api_base: String,
    token: String,
    chat_id: String,
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("api_base", &self.api_base)
            .field("chat_id", &self.chat_id)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

impl TelegramClient {
    pub fn new(api_base: String, token: String, chat_id: String) -> Self {
        Self {
            http: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_base,
            token,
            chat_id,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_base.trim_end_matches('/'),
            self.token
        )
    }

    pub async fn send(&self, text: &str) -> Result<()> {
        let body = SendRequest {
            chat_id: &self.chat_id,
            text,
            parse_mode: "HTML",
        };

        // The URL carries the bot token; keep it out of error messages
        let resp = self
            .http
            .post(self.endpoint())
            .json(&body)
            .send()
            .await
            .map_err(|e| e.without_url())
            .context("Telegram API request failed")?;

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            anyhow::bail!("Telegram API non-2xx: {status} body={text}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> TelegramClient {
        TelegramClient::new(
            "https://api.telegram.org/".to_string(),
            "123:abc".to_string(),
            "-100200".to_string(),
        )
    }

    #[test]
    fn test_endpoint() {
        assert_eq!(
            client().endpoint(),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }

    #[test]
    fn test_debug_hides_token() {
        let debug = format!("{:?}", client());
        assert!(debug.contains("-100200"));
        assert!(!debug.contains("123:abc"));
    }

    #[test]
    fn test_send_request_body() {
        let body = SendRequest {
            chat_id: "-100200",
            text: "<b>hi</b>",
            parse_mode: "HTML",
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({ "chat_id": "-100200", "text": "<b>hi</b>", "parse_mode": "HTML" })
        );
    }
}
