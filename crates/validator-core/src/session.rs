//! One form instance: loading flag, last error, current result, history and
//! the on-screen transcript.
//!
//! A submission is split in two halves so a front-end can run the network
//! call on its own task: [`Session::begin`] validates and raises the loading
//! flag, [`Session::complete`] records the outcome and always lowers it.
//! [`Session::submit`] chains both for callers that can simply await.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{Result, SubmitError};
use crate::history::{EntryClock, History, JudgementEntry};
use crate::idea::{IdeaSubmission, ToneLevel, ValidIdea};
use crate::prompt::{build_request, ChatRequest, RequestSettings};
use crate::reply::Reply;
use crate::state::{ChatMessage, ChatRole};
use crate::transport::{request_reply, ChatTransport};

/// Shared "request in flight" flag, readable from any task.
#[derive(Debug, Clone, Default)]
pub struct LoadingFlag(Arc<AtomicBool>);

impl LoadingFlag {
    pub fn get(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn set(&self, value: bool) {
        self.0.store(value, Ordering::SeqCst);
    }

    /// Lowers the flag when dropped.
    fn guard(&self) -> LoadingGuard {
        LoadingGuard(self.clone())
    }
}

struct LoadingGuard(LoadingFlag);

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// A validated submission whose request has not resolved yet.
#[derive(Debug, Clone)]
pub struct PendingSubmission {
    idea: ValidIdea,
    tone: ToneLevel,
    request: ChatRequest,
    user_message_id: i64,
}

impl PendingSubmission {
    pub fn request(&self) -> &ChatRequest {
        &self.request
    }
}

#[derive(Debug, Default)]
pub struct Session {
    settings: RequestSettings,
    loading: LoadingFlag,
    error: Option<String>,
    current: Option<JudgementEntry>,
    history: History,
    transcript: Vec<ChatMessage>,
    /// User message of the submission begun but not yet completed.
    pending_message: Option<i64>,
    clock: EntryClock,
}

impl Session {
    pub fn new(settings: RequestSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &RequestSettings {
        &self.settings
    }

    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }

    pub fn loading_flag(&self) -> LoadingFlag {
        self.loading.clone()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn current(&self) -> Option<&JudgementEntry> {
        self.current.as_ref()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Validates the idea and marks the session as loading.
    ///
    /// Nothing is sent here; the caller dispatches [`PendingSubmission::request`]
    /// and hands the outcome to [`Session::complete`].
    pub fn begin(&mut self, submission: &IdeaSubmission, tone: ToneLevel) -> Result<PendingSubmission> {
        if self.is_loading() {
            return Err(SubmitError::Busy);
        }
        self.discard_abandoned();
        self.error = None;

        let idea = match submission.validate() {
            Ok(idea) => idea,
            Err(e) => {
                debug!("rejected empty idea");
                self.error = Some(e.to_string());
                return Err(e);
            }
        };

        let request = build_request(&idea, tone, &self.settings);
        let user_message_id = self.clock.next_id();
        self.transcript.push(ChatMessage::user(user_message_id, &idea));
        self.pending_message = Some(user_message_id);
        self.loading.set(true);

        info!(title = idea.display_title(), tone = tone.get(), "idea submitted");
        Ok(PendingSubmission {
            idea,
            tone,
            request,
            user_message_id,
        })
    }

    /// Records the outcome of a pending submission. Loading is cleared on
    /// every path; history only changes on success.
    pub fn complete(
        &mut self,
        pending: PendingSubmission,
        outcome: Result<Reply>,
    ) -> Result<&JudgementEntry> {
        self.loading.set(false);
        self.pending_message = None;

        let reply = match outcome {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "submission failed");
                self.error = Some(e.to_string());
                self.transcript.retain(|m| m.id != pending.user_message_id);
                return Err(e);
            }
        };

        let entry = JudgementEntry {
            id: self.clock.next_id(),
            title: pending.idea.title().to_string(),
            description: pending.idea.description().to_string(),
            tone_level: pending.tone,
            reply_text: reply.text,
        };

        self.transcript
            .push(ChatMessage::assistant(entry.id, entry.reply_text.clone(), true));
        self.history.push(entry.clone());
        info!(id = entry.id, history = self.history.len(), "judgement received");

        Ok(&*self.current.insert(entry))
    }

    /// Validates, sends through `transport` and records the result.
    ///
    /// Dropping the future mid-request lowers the loading flag right away;
    /// the orphaned user message is removed by the next `begin` or
    /// `start_new`.
    pub async fn submit(
        &mut self,
        transport: &dyn ChatTransport,
        submission: &IdeaSubmission,
        tone: ToneLevel,
    ) -> Result<&JudgementEntry> {
        let pending = self.begin(submission, tone)?;
        let _guard = self.loading.guard();

        let outcome = request_reply(transport, pending.request()).await;
        self.complete(pending, outcome)
    }

    /// Removes the user message of a submission that was dropped before
    /// it completed.
    fn discard_abandoned(&mut self) {
        if let Some(id) = self.pending_message.take() {
            debug!(id, "discarding abandoned submission");
            self.transcript.retain(|m| m.id != id);
        }
    }

    /// Clears the revealing flag of a transcript message. Returns true only
    /// the first time for a given message.
    pub fn finish_reveal(&mut self, message_id: i64) -> bool {
        match self
            .transcript
            .iter_mut()
            .find(|m| m.id == message_id && m.role == ChatRole::Assistant)
        {
            Some(message) if message.revealing => {
                message.revealing = false;
                true
            }
            _ => false,
        }
    }

    /// Marks every message as fully revealed, e.g. when the animation is off.
    pub fn finish_all_reveals(&mut self) {
        for message in &mut self.transcript {
            message.revealing = false;
        }
    }

    /// Starts over: clears the current result, history, transcript and error.
    pub fn start_new(&mut self) {
        if !self.is_loading() {
            self.discard_abandoned();
        }
        self.current = None;
        self.history.clear();
        self.transcript.clear();
        self.error = None;
    }
}
