//! Interactive chat REPL
//!
//! Provides a readline-based interface with:
//! - Command history
//! - Streaming response display
//! - Session history view (`/history`)

pub mod colors;
pub mod streaming;

use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{error, warn};

use crate::chat::ChatSession;
use colors::ansi::*;

/// Slash commands understood by the REPL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    History,
    Clear,
    Quit,
    Unknown(String),
}

impl Command {
    /// Parse a `/command` line; returns `None` for regular chat input
    pub fn parse(line: &str) -> Option<Self> {
        let cmd = line.trim().strip_prefix('/')?;
        Some(match cmd.split_whitespace().next().unwrap_or("") {
            "help" | "?" => Self::Help,
            "history" => Self::History,
            "clear" => Self::Clear,
            "quit" | "exit" | "q" => Self::Quit,
            other => Self::Unknown(other.to_string()),
        })
    }
}

pub struct Repl {
    editor: DefaultEditor,
    session: ChatSession,
}

impl Repl {
    pub fn new(session: ChatSession) -> Result<Self> {
        let mut editor = DefaultEditor::new()?;

        // History file in ~/.screener/chat_history
        let history_path = crate::config::config_dir().join("chat_history");
        let _ = editor.load_history(&history_path);

        Ok(Self { editor, session })
    }

    pub async fn run(&mut self) -> Result<()> {
        println!();
        println!("{}{}  Chat Bot{}  {}", BOLD, MAGENTA, RESET, colors::status(self.session.provider_name()));
        println!("{}", colors::separator(50));
        println!("{}", colors::status("Type a question, /history to review, /quit to leave"));
        println!();

        loop {
            let line = match self.editor.readline(&colors::prompt()) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    error!("Readline error: {:?}", err);
                    break;
                }
            };

            let input = line.trim();
            if input.is_empty() {
                continue;
            }
            let _ = self.editor.add_history_entry(input);

            match Command::parse(input) {
                Some(Command::Quit) => break,
                Some(Command::Help) => print_help(),
                Some(Command::History) => self.print_history(),
                Some(Command::Clear) => {
                    self.session.clear();
                    println!("{}", colors::success("History cleared"));
                }
                Some(Command::Unknown(cmd)) => {
                    println!("{}", colors::warning(&format!("Unknown command: /{}", cmd)));
                }
                None => self.ask(input).await?,
            }
        }

        self.save_history();
        Ok(())
    }

    async fn ask(&mut self, input: &str) -> Result<()> {
        let mut rx = match self.session.send_stream(input).await {
            Ok(rx) => rx,
            Err(e) => {
                println!("{}", colors::error(&format!("Error occurred: {}", e)));
                return Ok(());
            }
        };

        println!();
        println!("{}", colors::header("The Response is"));
        let result = streaming::print_stream(&mut rx).await?;

        if let Some(e) = &result.error {
            println!("{}", colors::error(&format!("Error occurred: {}", e)));
        }
        if result.is_complete() {
            self.session.commit(input, &result.chunks);
        } else {
            warn!("Reply not recorded (error or cancelled)");
        }
        println!();
        Ok(())
    }

    fn print_history(&self) {
        println!(
            "{}",
            colors::header(&format!("Chat History ({} exchanges)", self.session.exchanges()))
        );
        if self.session.transcript().is_empty() {
            println!("{}", colors::status("  (empty)"));
            return;
        }
        for turn in self.session.transcript() {
            println!("{}: {}", colors::speaker(&turn.speaker.to_string()), turn.text);
        }
    }

    fn save_history(&mut self) {
        let dir = crate::config::config_dir();
        if std::fs::create_dir_all(&dir).is_ok() {
            let _ = self.editor.save_history(&dir.join("chat_history"));
        }
    }
}

fn print_help() {
    println!("{}", colors::header("Commands"));
    println!("  /history   show this session's chat history");
    println!("  /clear     forget the conversation so far");
    println!("  /quit      leave the chat");
}
