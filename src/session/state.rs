use std::collections::BTreeSet;
use tracing::{debug, info, warn};

use super::{Clock, IdGenerator, Message, Note};
use crate::error::{SessionError, SessionResult};
use crate::gateway::{ChatMessage, Role, TurnReply};
use crate::prompts::CONNECTION_INTERRUPTED;
use crate::topology::{LayoutRng, TopologyModel, TurnOutcome};

/// Every way the session can change
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// User sends a message; starts a turn.
    Submit { content: String },
    /// The gateway answered the pending turn.
    ReplyReceived { reply: TurnReply },
    /// The pending turn failed; `notice` is shown to the user.
    TurnFailed { notice: String },
    ToggleSelection { message_id: u64 },
    CancelSelection,
    /// Snapshot the selected messages into a new note.
    Synthesize { reflection: String },
    EditReflection { note_id: u64, reflection: String },
    DeleteNote { note_id: u64 },
    DeleteMessage { message_id: u64 },
    /// Mark a message (and its node) as active; `None` clears.
    Focus { message_id: Option<u64> },
}

/// What an applied action produced
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    /// A turn started; `history` is what to send to the gateway.
    TurnStarted {
        user_message_id: u64,
        history: Vec<ChatMessage>,
    },
    /// A turn finished, successfully or with the placeholder reply.
    TurnCompleted {
        assistant_message_id: u64,
        topology: TurnOutcome,
    },
    NoteCreated { note_id: u64 },
    Updated,
}

/// The whole in-memory state of one dialogue
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    messages: Vec<Message>,
    topology: TopologyModel,
    notes: Vec<Note>,
    selection: BTreeSet<u64>,
    pending_turn: Option<u64>,
    active_message_id: Option<u64>,
    notice: Option<String>,
    ids: IdGenerator,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one action. On error the state is left unchanged.
    pub fn apply<C, R>(&mut self, action: Action, clock: &C, rng: &mut R) -> SessionResult<Applied>
    where
        C: Clock + ?Sized,
        R: LayoutRng + ?Sized,
    {
        match action {
            Action::Submit { content } => self.submit(content, clock),
            Action::ReplyReceived { reply } => {
                let user_message_id = self.pending_turn.ok_or(SessionError::NoTurnPending)?;
                self.notice = None;
                Ok(self.complete_turn(
                    user_message_id,
                    reply.reply,
                    reply.analysis.is_new_topic,
                    clock,
                    rng,
                ))
            }
            Action::TurnFailed { notice } => {
                let user_message_id = self.pending_turn.ok_or(SessionError::NoTurnPending)?;
                warn!(user_message_id, notice = %notice, "Turn failed, appending placeholder reply");
                self.notice = Some(notice);
                Ok(self.complete_turn(
                    user_message_id,
                    CONNECTION_INTERRUPTED.to_string(),
                    false,
                    clock,
                    rng,
                ))
            }
            Action::ToggleSelection { message_id } => {
                self.require_message(message_id)?;
                if !self.selection.remove(&message_id) {
                    self.selection.insert(message_id);
                }
                Ok(Applied::Updated)
            }
            Action::CancelSelection => {
                self.selection.clear();
                Ok(Applied::Updated)
            }
            Action::Synthesize { reflection } => self.synthesize(reflection, clock),
            Action::EditReflection {
                note_id,
                reflection,
            } => {
                let note = self
                    .notes
                    .iter_mut()
                    .find(|n| n.id == note_id)
                    .ok_or(SessionError::NoteNotFound { id: note_id })?;
                note.reflection = reflection;
                Ok(Applied::Updated)
            }
            Action::DeleteNote { note_id } => {
                let index = self
                    .notes
                    .iter()
                    .position(|n| n.id == note_id)
                    .ok_or(SessionError::NoteNotFound { id: note_id })?;
                self.notes.remove(index);
                Ok(Applied::Updated)
            }
            Action::DeleteMessage { message_id } => {
                let index = self
                    .messages
                    .iter()
                    .position(|m| m.id == message_id)
                    .ok_or(SessionError::MessageNotFound { id: message_id })?;
                self.messages.remove(index);
                self.selection.remove(&message_id);
                Ok(Applied::Updated)
            }
            Action::Focus { message_id } => {
                self.active_message_id = message_id;
                Ok(Applied::Updated)
            }
        }
    }

    fn submit<C: Clock + ?Sized>(&mut self, content: String, clock: &C) -> SessionResult<Applied> {
        if self.pending_turn.is_some() {
            return Err(SessionError::TurnInFlight);
        }
        let content = content.trim();
        if content.is_empty() {
            return Err(SessionError::EmptyMessage);
        }

        let id = self.ids.next(clock.now());
        self.messages.push(Message {
            id,
            role: Role::User,
            content: content.to_string(),
        });
        self.pending_turn = Some(id);
        self.notice = None;
        debug!(user_message_id = id, "Turn started");

        Ok(Applied::TurnStarted {
            user_message_id: id,
            history: self.history(),
        })
    }

    fn complete_turn<C, R>(
        &mut self,
        user_message_id: u64,
        content: String,
        is_new_topic: bool,
        clock: &C,
        rng: &mut R,
    ) -> Applied
    where
        C: Clock + ?Sized,
        R: LayoutRng + ?Sized,
    {
        let id = self.ids.next(clock.now());
        self.messages.push(Message {
            id,
            role: Role::Assistant,
            content,
        });
        let topology = self.topology.apply_turn(user_message_id, is_new_topic, rng);
        self.pending_turn = None;
        info!(
            user_message_id,
            assistant_message_id = id,
            nodes = self.topology.len(),
            ?topology,
            "Turn completed"
        );

        Applied::TurnCompleted {
            assistant_message_id: id,
            topology,
        }
    }

    fn synthesize<C: Clock + ?Sized>(&mut self, reflection: String, clock: &C) -> SessionResult<Applied> {
        if self.selection.is_empty() {
            return Err(SessionError::EmptySelection);
        }
        let selected_messages: Vec<Message> = self
            .messages
            .iter()
            .filter(|m| self.selection.contains(&m.id))
            .cloned()
            .collect();

        let now = clock.now();
        let note_id = self.ids.next(now);
        self.notes.push(Note {
            id: note_id,
            selected_messages,
            reflection,
            timestamp: now,
        });
        self.selection.clear();
        debug!(note_id, "Note synthesized");
        Ok(Applied::NoteCreated { note_id })
    }

    fn require_message(&self, message_id: u64) -> SessionResult<&Message> {
        self.message(message_id)
            .ok_or(SessionError::MessageNotFound { id: message_id })
    }

    /// Transcript in the gateway's wire form
    pub fn history(&self) -> Vec<ChatMessage> {
        self.messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(Message::to_chat)
            .collect()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn message(&self, id: u64) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn topology(&self) -> &TopologyModel {
        &self.topology
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn note(&self, id: u64) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn selection(&self) -> &BTreeSet<u64> {
        &self.selection
    }

    /// A request is outstanding; sending is disabled.
    pub fn is_thinking(&self) -> bool {
        self.pending_turn.is_some()
    }

    pub fn active_message_id(&self) -> Option<u64> {
        self.active_message_id
    }

    /// Last user-visible notice (e.g. why a turn failed)
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Most recent assistant message
    pub fn last_assistant(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role == Role::Assistant)
    }
}
