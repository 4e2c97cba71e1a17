//! Chat session state
//!
//! Owns the provider-facing message history and the display transcript.
//! Created per REPL run and passed around explicitly.

use anyhow::Result;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;

use super::provider::{ChatRequest, Message, Provider, StreamEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    You,
    Bot,
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::You => f.write_str("You"),
            Self::Bot => f.write_str("Bot"),
        }
    }
}

/// One line of the displayed history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub speaker: Speaker,
    pub text: String,
}

pub struct ChatSession {
    provider: Arc<dyn Provider>,
    system: Option<String>,
    messages: Vec<Message>,
    transcript: Vec<ChatTurn>,
}

impl ChatSession {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            system: None,
            messages: Vec::new(),
            transcript: Vec::new(),
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Request for `input` carrying every committed exchange
    pub fn request(&self, input: &str) -> ChatRequest {
        ChatRequest {
            system: self.system.clone(),
            messages: self.messages.clone(),
            input: input.to_string(),
        }
    }

    /// Start a streamed reply. Nothing is recorded until [`commit`](Self::commit).
    pub async fn send_stream(&self, input: &str) -> Result<mpsc::Receiver<StreamEvent>> {
        self.provider.create_stream(self.request(input)).await
    }

    /// Send and record a complete (non-streamed) reply
    pub async fn send(&mut self, input: &str) -> Result<String> {
        let response = self.provider.create(self.request(input)).await?;
        self.commit(input, std::slice::from_ref(&response.text));
        Ok(response.text)
    }

    /// Record a finished exchange. Each streamed chunk becomes its own
    /// transcript line; the provider history gets the joined reply.
    pub fn commit(&mut self, input: &str, chunks: &[String]) {
        self.transcript.push(ChatTurn {
            speaker: Speaker::You,
            text: input.to_string(),
        });
        self.transcript.extend(chunks.iter().map(|chunk| ChatTurn {
            speaker: Speaker::Bot,
            text: chunk.clone(),
        }));

        self.messages.push(Message::user(input));
        self.messages.push(Message::assistant(chunks.concat()));
    }

    pub fn transcript(&self) -> &[ChatTurn] {
        &self.transcript
    }

    /// Number of committed exchanges
    pub fn exchanges(&self) -> usize {
        self.messages.len() / 2
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.transcript.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::provider::{ChatResponse, MessageRole};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Echoes the input and remembers every request it saw
    #[derive(Default)]
    struct EchoProvider {
        seen: Mutex<Vec<ChatRequest>>,
    }

    #[async_trait]
    impl Provider for EchoProvider {
        async fn create_stream(&self, request: ChatRequest) -> Result<mpsc::Receiver<StreamEvent>> {
            let (tx, rx) = mpsc::channel(4);
            let input = request.input.clone();
            self.seen.lock().unwrap().push(request);
            tx.send(StreamEvent::TextDelta(input)).await?;
            tx.send(StreamEvent::Done).await?;
            Ok(rx)
        }

        async fn create(&self, request: ChatRequest) -> Result<ChatResponse> {
            let text = format!("echo: {}", request.input);
            self.seen.lock().unwrap().push(request);
            Ok(ChatResponse { text, usage: None })
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    #[test]
    fn test_commit_records_chunks_separately() {
        let mut session = ChatSession::new(Arc::new(EchoProvider::default()));
        session.commit("hi", &["Hel".to_string(), "lo".to_string()]);

        let lines: Vec<String> = session
            .transcript()
            .iter()
            .map(|t| format!("{}: {}", t.speaker, t.text))
            .collect();
        assert_eq!(lines, vec!["You: hi", "Bot: Hel", "Bot: lo"]);

        let request = session.request("next");
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[1].role, MessageRole::Assistant);
        assert_eq!(request.messages[1].content, "Hello");
    }

    #[tokio::test]
    async fn test_send_carries_history() {
        let provider = Arc::new(EchoProvider::default());
        let mut session = ChatSession::new(provider.clone()).with_system("be brief");

        assert_eq!(session.send("one").await.unwrap(), "echo: one");
        session.send("two").await.unwrap();

        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen[1].messages, vec![Message::user("one"), Message::assistant("echo: one")]);
        assert_eq!(seen[1].system.as_deref(), Some("be brief"));
        assert_eq!(session.exchanges(), 2);
    }

    #[tokio::test]
    async fn test_stream_does_not_record_until_commit() {
        let mut session = ChatSession::new(Arc::new(EchoProvider::default()));
        let mut rx = session.send_stream("hey").await.unwrap();
        assert_eq!(rx.recv().await, Some(StreamEvent::TextDelta("hey".into())));
        assert!(session.transcript().is_empty());

        session.commit("hey", &["hey".to_string()]);
        assert_eq!(session.exchanges(), 1);

        session.clear();
        assert!(session.transcript().is_empty());
        assert_eq!(session.exchanges(), 0);
    }
}
