use anyhow::{Context, Result};

use crate::api::ApiClient;
use crate::view::{ChatMessage, ChatView};

/// Drives the conversation: echoes the user's line, round-trips it to the
/// server, and renders the reply.
pub struct ChatController<V> {
    client: ApiClient,
    view: V,
}

impl<V: ChatView> ChatController<V> {
    pub fn new(client: ApiClient, view: V) -> Self {
        Self { client, view }
    }

    /// Sends one line of user input. Whitespace-only input is dropped without
    /// touching the view or the network.
    pub async fn send(&mut self, input: &str) -> Result<()> {
        let message = input.trim();
        if message.is_empty() {
            return Ok(());
        }

        // The user's line goes up before the request is even issued.
        self.view.message(&ChatMessage::user(message));

        let reply = self
            .client
            .send_message(message)
            .await
            .context("Chat round-trip failed")?;

        match reply.response {
            Some(text) => self.view.message(&ChatMessage::bot(text)),
            None => log::warn!("chat response carried no `response` field; nothing to render"),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Default)]
    struct RecordingView {
        lines: Vec<String>,
    }

    impl ChatView for RecordingView {
        fn message(&mut self, message: &ChatMessage) {
            self.lines.push(format!("{}: {}", message.role, message.text));
        }
    }

    #[tokio::test]
    async fn whitespace_only_input_issues_no_request_and_renders_nothing() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut controller =
            ChatController::new(ApiClient::new(&server.uri()), RecordingView::default());

        controller.send("   \t  ").await.unwrap();

        assert!(controller.view.lines.is_empty());
    }

    #[tokio::test]
    async fn a_message_is_echoed_and_the_reply_rendered_after_it() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "response": "hi there" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut controller =
            ChatController::new(ApiClient::new(&server.uri()), RecordingView::default());

        controller.send("hello").await.unwrap();

        assert_eq!(controller.view.lines, ["You: hello", "Bot: hi there"]);
    }

    #[tokio::test]
    async fn a_reply_without_a_response_field_renders_no_bot_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let mut controller =
            ChatController::new(ApiClient::new(&server.uri()), RecordingView::default());

        controller.send("hello").await.unwrap();

        assert_eq!(controller.view.lines, ["You: hello"]);
    }

    #[tokio::test]
    async fn a_transport_failure_surfaces_as_an_error_after_the_echo() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let mut controller =
            ChatController::new(ApiClient::new(&server.uri()), RecordingView::default());

        let result = controller.send("hello").await;

        assert!(result.is_err());
        assert_eq!(controller.view.lines, ["You: hello"]);
    }
}
