use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt::Write as _;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use super::command::{ReplCommand, HELP};
use crate::error::{AppError, AppResult, RenderError, SessionError};
use crate::export::{export_session, preview};
use crate::gateway::ChatGateway;
use crate::graph::GraphCanvas;
use crate::reveal::{GlyphStyle, RevealFrame, TokioScheduler, Typewriter};
use crate::session::{Action, Dialogue, SystemClock};

/// What the loop should do after handling a line
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Print this (may be empty) and keep going.
    Print(String),
    /// A turn finished; reveal `text`, after `notice` if the turn failed.
    Reply { text: String, notice: Option<String> },
    Quit,
}

/// A terminal chat session over any gateway
pub struct ChatSession<G> {
    dialogue: Dialogue<G, SystemClock, StdRng>,
    canvas: GraphCanvas,
    typewriter: Typewriter<StdRng>,
    export_dir: PathBuf,
    animate: bool,
}

impl<G: ChatGateway> ChatSession<G> {
    pub fn new(gateway: G, canvas: GraphCanvas, export_dir: PathBuf, animate: bool) -> Self {
        let typewriter = Typewriter::new(StdRng::from_entropy).on_complete(|text| {
            debug!(chars = text.chars().count(), "Reply fully revealed");
        });
        Self {
            dialogue: Dialogue::new(gateway, SystemClock, StdRng::from_entropy()),
            canvas,
            typewriter,
            export_dir,
            animate,
        }
    }

    pub fn dialogue(&self) -> &Dialogue<G, SystemClock, StdRng> {
        &self.dialogue
    }

    pub fn canvas(&self) -> &GraphCanvas {
        &self.canvas
    }

    /// Read lines from stdin until `/quit` or end of input
    pub async fn run(mut self) -> AppResult<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        println!("Socratic dialogue. Ask a question, or /help.");
        prompt();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                prompt();
                continue;
            }
            match self.handle_line(&line).await {
                Ok(Outcome::Quit) => break,
                Ok(Outcome::Print(text)) => {
                    if !text.is_empty() {
                        println!("{text}");
                    }
                }
                Ok(Outcome::Reply { text, notice }) => {
                    if let Some(notice) = notice {
                        eprintln!("! {notice}");
                    }
                    self.reveal(&text).await;
                }
                Err(e) => eprintln!("! {e}"),
            }
            prompt();
        }

        info!(
            messages = self.dialogue.state().messages().len(),
            "Chat session ended"
        );
        Ok(())
    }

    async fn reveal(&self, text: &str) {
        self.typewriter.set_text(text);
        if !self.animate {
            println!("{text}");
            return;
        }
        print!("\x1b[s");
        self.typewriter
            .play(&TokioScheduler, |frame| {
                print!("\x1b[u\x1b[J{}", ansi_frame(frame));
                let _ = std::io::stdout().flush();
            })
            .await;
        println!();
    }

    /// Handle one input line
    pub async fn handle_line(&mut self, line: &str) -> AppResult<Outcome> {
        let command = match ReplCommand::parse(line) {
            Ok(command) => command,
            Err(usage) => return Ok(Outcome::Print(usage)),
        };

        match command {
            ReplCommand::Say(text) => {
                let report = self.dialogue.send(&text).await?;
                self.sync_canvas();
                let state = self.dialogue.state();
                let text = state
                    .message(report.assistant_message_id)
                    .map(|m| m.content.clone())
                    .unwrap_or_default();
                let notice = report.error.as_ref().map(|_| {
                    state.notice().unwrap_or_default().to_string()
                });
                Ok(Outcome::Reply { text, notice })
            }
            ReplCommand::Select(n) => {
                let id = self.message_id(n)?;
                self.dialogue.apply(Action::ToggleSelection { message_id: id })?;
                let selected = self.dialogue.state().selection().len();
                Ok(Outcome::Print(format!("{selected} selected")))
            }
            ReplCommand::CancelSelection => {
                self.dialogue.apply(Action::CancelSelection)?;
                Ok(Outcome::Print("selection cleared".to_string()))
            }
            ReplCommand::Synthesize(reflection) => {
                self.dialogue.apply(Action::Synthesize { reflection })?;
                let count = self.dialogue.state().notes().len();
                Ok(Outcome::Print(format!("note {count} created")))
            }
            ReplCommand::Notes => Ok(Outcome::Print(self.describe_notes())),
            ReplCommand::Reflect(n, reflection) => {
                let note_id = self.note_id(n)?;
                self.dialogue.apply(Action::EditReflection {
                    note_id,
                    reflection,
                })?;
                Ok(Outcome::Print(format!("note {n} updated")))
            }
            ReplCommand::Forget(n) => {
                let note_id = self.note_id(n)?;
                self.dialogue.apply(Action::DeleteNote { note_id })?;
                Ok(Outcome::Print(format!("note {n} deleted")))
            }
            ReplCommand::Delete(n) => {
                let message_id = self.message_id(n)?;
                self.dialogue.apply(Action::DeleteMessage { message_id })?;
                Ok(Outcome::Print(format!("message {n} deleted")))
            }
            ReplCommand::Log => Ok(Outcome::Print(self.describe_log())),
            ReplCommand::Pick(x, y) => {
                let hit = self.canvas.pick(x, y);
                self.dialogue.apply(Action::Focus { message_id: hit })?;
                self.sync_canvas();
                let text = match hit.and_then(|id| self.dialogue.state().message(id)) {
                    Some(message) => format!("focused: {}", preview(&message.content, 60)),
                    None if hit.is_some() => "focused a deleted message".to_string(),
                    None => "no node there".to_string(),
                };
                Ok(Outcome::Print(text))
            }
            ReplCommand::Graph(path) => {
                let snapshot = self.canvas.snapshot()?.ok_or(RenderError::EmptyGraph)?;
                std::fs::write(&path, &snapshot.png)?;
                Ok(Outcome::Print(format!("graph written to {}", path.display())))
            }
            ReplCommand::Resize(width, height) => {
                self.canvas.resize(width, height)?;
                Ok(Outcome::Print(format!("canvas is {width}x{height}")))
            }
            ReplCommand::Export(dir) => {
                let state = self.dialogue.state();
                let snapshot = self.canvas.snapshot()?;
                let document =
                    export_session(state.messages(), state.notes(), snapshot.as_ref(), Utc::now())?;
                let path = document.write_to(dir.unwrap_or_else(|| self.export_dir.clone()))?;
                Ok(Outcome::Print(format!("exported to {}", path.display())))
            }
            ReplCommand::Help => Ok(Outcome::Print(HELP.to_string())),
            ReplCommand::Quit => Ok(Outcome::Quit),
        }
    }

    fn sync_canvas(&mut self) {
        let state = self.dialogue.state();
        self.canvas
            .update(state.topology().nodes(), state.active_message_id());
    }

    fn message_id(&self, n: usize) -> AppResult<u64> {
        let messages = self.dialogue.state().messages();
        messages
            .get(n - 1)
            .map(|m| m.id)
            .ok_or(AppError::Session(SessionError::MessageNotFound { id: n as u64 }))
    }

    fn note_id(&self, n: usize) -> AppResult<u64> {
        self.dialogue
            .state()
            .notes()
            .get(n - 1)
            .map(|note| note.id)
            .ok_or(AppError::Session(SessionError::NoteNotFound { id: n as u64 }))
    }

    fn describe_log(&self) -> String {
        let state = self.dialogue.state();
        let mut out = String::new();
        for (i, message) in state.messages().iter().enumerate() {
            let mark = if state.selection().contains(&message.id) {
                '*'
            } else {
                ' '
            };
            let _ = writeln!(
                out,
                "{mark}{:>3} {:<9} {}",
                i + 1,
                message.role.as_str(),
                preview(&message.content, 72)
            );
        }
        out.trim_end().to_string()
    }

    fn describe_notes(&self) -> String {
        let notes = self.dialogue.state().notes();
        if notes.is_empty() {
            return "no notes".to_string();
        }
        let mut out = String::new();
        for (i, note) in notes.iter().enumerate() {
            let _ = writeln!(
                out,
                "{:>3} [{} messages, {}] {}",
                i + 1,
                note.selected_messages.len(),
                note.timestamp.format("%H:%M:%S"),
                preview(&note.reflection, 72)
            );
        }
        out.trim_end().to_string()
    }
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

/// Frame as ANSI-styled terminal text
pub fn ansi_frame(frame: &RevealFrame) -> String {
    let mut out = String::new();
    for span in &frame.spans {
        let code = match span.style {
            GlyphStyle::Plain => "",
            GlyphStyle::Accent => "\x1b[33m",
            GlyphStyle::Inverted => "\x1b[7m",
            GlyphStyle::Solid => "\x1b[1m",
            GlyphStyle::Fresh => "\x1b[2m",
        };
        if code.is_empty() {
            out.push_str(&span.text);
        } else {
            let _ = write!(out, "{code}{}\x1b[0m", span.text);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use crate::gateway::{MockChatGateway, TurnAnalysis, TurnReply};
    use crate::reveal::StyledSpan;

    fn session(gateway: MockChatGateway, dir: PathBuf) -> ChatSession<MockChatGateway> {
        ChatSession::new(gateway, GraphCanvas::new(480, 720).unwrap(), dir, false)
    }

    fn answering(reply: &'static str, is_new_topic: bool) -> MockChatGateway {
        let mut gateway = MockChatGateway::new();
        gateway.expect_send().returning(move |_| {
            Ok(TurnReply {
                reply: reply.to_string(),
                analysis: TurnAnalysis {
                    is_new_topic,
                    reasoning: String::new(),
                },
            })
        });
        gateway
    }

    #[tokio::test]
    async fn test_say_then_pick_focuses_first_node() {
        let dir = tempfile::tempdir().unwrap();
        let mut chat = session(answering("What is virtue?", true), dir.path().to_path_buf());

        let outcome = chat.handle_line("Can virtue be taught?").await.unwrap();
        assert_eq!(
            outcome,
            Outcome::Reply {
                text: "What is virtue?".to_string(),
                notice: None
            }
        );
        assert_eq!(chat.canvas().placements().len(), 1);

        let placement = chat.canvas().placements()[0];
        chat.handle_line(&format!("/pick {} {}", placement.x, placement.y))
            .await
            .unwrap();
        assert_eq!(
            chat.dialogue().state().active_message_id(),
            Some(placement.message_id)
        );

        chat.handle_line("/pick 0 0").await.unwrap();
        assert_eq!(chat.dialogue().state().active_message_id(), None);
    }

    #[tokio::test]
    async fn test_failed_turn_reports_notice() {
        let mut gateway = MockChatGateway::new();
        gateway.expect_send().returning(|_| {
            Err(GatewayError::Network {
                message: "connection refused".to_string(),
            })
        });
        let dir = tempfile::tempdir().unwrap();
        let mut chat = session(gateway, dir.path().to_path_buf());

        match chat.handle_line("Hello?").await.unwrap() {
            Outcome::Reply { notice, .. } => {
                assert!(notice.unwrap().contains("HTTPS_PROXY"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(!chat.dialogue().state().is_thinking());
    }

    #[tokio::test]
    async fn test_select_synthesize_and_export() {
        let dir = tempfile::tempdir().unwrap();
        let mut chat = session(answering("Whose justice?", true), dir.path().to_path_buf());

        let err = chat.handle_line("/export").await.unwrap_err();
        assert!(matches!(err, AppError::Export(_)));

        chat.handle_line("What is justice?").await.unwrap();
        chat.handle_line("/select 1").await.unwrap();
        chat.handle_line("/select 2").await.unwrap();
        chat.handle_line("/synthesize the question answers a question").await.unwrap();
        assert_eq!(chat.dialogue().state().notes().len(), 1);
        assert!(chat.dialogue().state().selection().is_empty());

        let Outcome::Print(text) = chat.handle_line("/export").await.unwrap() else {
            panic!("expected print");
        };
        assert!(text.contains("socratic-snapshot-"));
        let written: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(written.len(), 1);
    }

    #[tokio::test]
    async fn test_out_of_range_indices_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let mut chat = session(MockChatGateway::new(), dir.path().to_path_buf());
        assert!(chat.handle_line("/select 3").await.is_err());
        assert!(chat.handle_line("/forget 1").await.is_err());
        assert!(chat.handle_line("/synthesize nothing").await.is_err());
    }

    #[tokio::test]
    async fn test_resize_redraws() {
        let dir = tempfile::tempdir().unwrap();
        let mut chat = session(MockChatGateway::new(), dir.path().to_path_buf());
        chat.handle_line("/resize 200 300").await.unwrap();
        assert_eq!(chat.canvas().size(), (200, 300));
        assert!(chat.handle_line("/resize 0 300").await.is_err());
        assert!(chat.handle_line("/resize 100000 100000").await.is_err());
        assert_eq!(chat.canvas().size(), (200, 300));
    }

    #[tokio::test]
    async fn test_graph_before_first_exchange_is_empty_graph() {
        let dir = tempfile::tempdir().unwrap();
        let mut chat = session(answering("Why ask?", true), dir.path().to_path_buf());
        let path = dir.path().join("graph.png");

        let err = chat
            .handle_line(&format!("/graph {}", path.display()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Render(RenderError::EmptyGraph)));
        assert!(!path.exists());

        chat.handle_line("What is a question?").await.unwrap();
        chat.handle_line(&format!("/graph {}", path.display()))
            .await
            .unwrap();
        assert!(std::fs::read(&path).unwrap().starts_with(b"\x89PNG"));
    }

    #[test]
    fn test_ansi_frame_styles_spans() {
        let frame = RevealFrame {
            visible: 3,
            total: 3,
            complete: false,
            spans: vec![
                StyledSpan {
                    text: "a".to_string(),
                    style: GlyphStyle::Plain,
                },
                StyledSpan {
                    text: "bc".to_string(),
                    style: GlyphStyle::Fresh,
                },
            ],
        };
        assert_eq!(ansi_frame(&frame), "a\x1b[2mbc\x1b[0m");
    }
}
