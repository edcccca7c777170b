// Telegram bot notifier

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument};

const SEND_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Telegram bot token or chat id is not configured")]
    NotConfigured,
    #[error("Telegram rejected the message with status {0}")]
    Rejected(reqwest::StatusCode),
    // ! Built with `without_url` so the bot token never reaches the logs
    #[error("Telegram request failed: {0}")]
    Transport(reqwest::Error),
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Clone)]
pub struct TelegramNotifier {
    client: reqwest::Client,
    api_url: String,
    bot_token: Option<String>,
    chat_id: Option<String>,
}

impl std::fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("api_url", &self.api_url)
            .field("configured", &self.is_configured())
            .finish()
    }
}

impl TelegramNotifier {
    pub fn new(
        client: reqwest::Client,
        api_url: impl Into<String>,
        bot_token: Option<String>,
        chat_id: Option<String>,
    ) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            bot_token,
            chat_id,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.bot_token.is_some() && self.chat_id.is_some()
    }

    /// Sends a plain text message to the configured chat
    #[instrument(skip_all)]
    pub async fn send_message(&self, text: &str) -> Result<(), NotifyError> {
        let (Some(token), Some(chat_id)) = (&self.bot_token, &self.chat_id) else {
            return Err(NotifyError::NotConfigured);
        };

        let url = format!("{}/bot{}/sendMessage", self.api_url, token);

        let response = self
            .client
            .post(&url)
            .timeout(SEND_TIMEOUT)
            .json(&SendMessage { chat_id: chat_id.as_str(), text })
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.without_url()))?;

        if !response.status().is_success() {
            return Err(NotifyError::Rejected(response.status()));
        }

        info!("Telegram message delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn missing_credentials_short_circuit() {
        let notifier = TelegramNotifier::new(reqwest::Client::new(), "http://127.0.0.1:1", None, Some("1".into()));

        assert!(!notifier.is_configured());
        assert!(matches!(
            notifier.send_message("hi").await,
            Err(NotifyError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn posts_chat_id_and_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/botTOKEN/sendMessage"))
            .and(body_json(serde_json::json!({ "chat_id": "-42", "text": "hello" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ok": true })))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = TelegramNotifier::new(
            reqwest::Client::new(),
            server.uri(),
            Some("TOKEN".into()),
            Some("-42".into()),
        );

        notifier.send_message("hello").await.unwrap();
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let notifier = TelegramNotifier::new(
            reqwest::Client::new(),
            server.uri(),
            Some("BAD".into()),
            Some("-42".into()),
        );

        assert!(matches!(
            notifier.send_message("hello").await,
            Err(NotifyError::Rejected(status)) if status.as_u16() == 401
        ));
    }
}
