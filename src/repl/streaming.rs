//! Stream processing for the REPL
//!
//! Handles incoming stream events, printing text deltas as they arrive.

use anyhow::Result;
use std::io::{self, Write};
use tokio::sync::mpsc;

use crate::chat::provider::{StreamEvent, Usage};

/// Result of processing a stream
#[derive(Debug, Default, PartialEq)]
pub struct StreamResult {
    /// Text chunks in arrival order
    pub chunks: Vec<String>,
    pub usage: Option<Usage>,
    /// Provider or transport failure
    pub error: Option<String>,
    /// Ctrl-C pressed mid-stream
    pub cancelled: bool,
}

impl StreamResult {
    /// Reply finished cleanly and can be recorded
    pub fn is_complete(&self) -> bool {
        self.error.is_none() && !self.cancelled
    }
}

/// Print a stream to `out`, collecting chunks
pub async fn process_stream<W: Write>(
    rx: &mut mpsc::Receiver<StreamEvent>,
    out: &mut W,
) -> Result<StreamResult> {
    let mut result = StreamResult::default();

    loop {
        tokio::select! {
            event = rx.recv() => {
                match event {
                    Some(StreamEvent::TextDelta(delta)) => {
                        writeln!(out, "{}", delta)?;
                        out.flush()?;
                        result.chunks.push(delta);
                    }
                    Some(StreamEvent::Usage(usage)) => {
                        result.usage = Some(usage);
                    }
                    Some(StreamEvent::Error(e)) => {
                        result.error = Some(e);
                        break;
                    }
                    Some(StreamEvent::Done) | None => break,
                }
            }
            Ok(()) = tokio::signal::ctrl_c() => {
                writeln!(out, "\n  [cancelled]")?;
                result.cancelled = true;
                break;
            }
        }
    }

    Ok(result)
}

/// Print a stream to stdout
pub async fn print_stream(rx: &mut mpsc::Receiver<StreamEvent>) -> Result<StreamResult> {
    process_stream(rx, &mut io::stdout()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_collects_chunks_until_done() {
        let (tx, mut rx) = mpsc::channel(8);
        tx.send(StreamEvent::TextDelta("Hel".into())).await.unwrap();
        tx.send(StreamEvent::TextDelta("lo".into())).await.unwrap();
        tx.send(StreamEvent::Usage(Usage { input_tokens: 1, output_tokens: 2 })).await.unwrap();
        tx.send(StreamEvent::Done).await.unwrap();

        let mut out = Vec::new();
        let result = process_stream(&mut rx, &mut out).await.unwrap();

        assert_eq!(result.chunks, vec!["Hel", "lo"]);
        assert_eq!(result.usage, Some(Usage { input_tokens: 1, output_tokens: 2 }));
        assert!(result.is_complete());
        assert_eq!(String::from_utf8(out).unwrap(), "Hel\nlo\n");
    }

    #[tokio::test]
    async fn test_error_stops_stream() {
        let (tx, mut rx) = mpsc::channel(8);
        tx.send(StreamEvent::TextDelta("partial".into())).await.unwrap();
        tx.send(StreamEvent::Error("Gemini API error: 429".into())).await.unwrap();
        tx.send(StreamEvent::TextDelta("never".into())).await.unwrap();

        let mut out = Vec::new();
        let result = process_stream(&mut rx, &mut out).await.unwrap();

        assert_eq!(result.chunks, vec!["partial"]);
        assert_eq!(result.error.as_deref(), Some("Gemini API error: 429"));
        assert!(!result.is_complete());
    }

    #[tokio::test]
    async fn test_closed_channel_ends_stream() {
        let (tx, mut rx) = mpsc::channel::<StreamEvent>(1);
        drop(tx);
        let result = process_stream(&mut rx, &mut Vec::new()).await.unwrap();
        assert!(result.chunks.is_empty());
        assert!(result.is_complete());
    }
}
