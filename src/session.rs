//! Session state machine.
//!
//! One [`Session`] owns everything the user has built up: the captured
//! image or pair, the current analysis, the chat log and the transient
//! flags. The visible phase is derived from those fields, never stored.
//!
//! Model calls never run under the state lock. Each request records the
//! session epoch it was issued in; reset and new captures bump the epoch, so
//! a response that lands afterwards is dropped instead of applied.

use chrono::Local;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::{derived_position, AnalysisResult, PositionType, RiskBand, Timeframe};
use crate::bus::{ClipboardItem, PasteBus, PasteEvent, PasteSubscription};
use crate::capture::{is_image_mime, CaptureSource, ImagePayload, InputMode};
use crate::constants::events;
use crate::error::SessionError;
use crate::llm::ModelBackend;
use crate::services::analysis::{AnalysisInput, AnalysisService};
use crate::services::chat::{ChatMessage, ChatOrchestrator};
use crate::services::reporting::{render_dated_report, report_filename};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Landing,
    AwaitingInput,
    Analyzing,
    ResultReady,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", content = "result", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    Completed(AnalysisResult),
    /// Another analysis is in flight; nothing was issued
    AlreadyRunning,
    /// The session moved on while the request was out; reply dropped
    Discarded,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum ChatOutcome {
    Replied(ChatMessage),
    /// Another chat turn is in flight; nothing was sent
    Busy,
    /// Blank message or no active session
    Ignored,
    Discarded,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ImageInfo {
    pub mime_type: String,
    pub len: usize,
}

/// Analysis plus the display fields derived from it
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnalysisView {
    #[serde(flatten)]
    pub result: AnalysisResult,
    pub derived_position: PositionType,
    pub risk_band: RiskBand,
}

impl From<&AnalysisResult> for AnalysisView {
    fn from(result: &AnalysisResult) -> Self {
        Self {
            result: result.clone(),
            derived_position: derived_position(result),
            risk_band: RiskBand::from_score(result.risk_score),
        }
    }
}

/// Read model of the whole session
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub session_id: Option<Uuid>,
    pub phase: SessionPhase,
    pub input_mode: InputMode,
    pub image: Option<ImageInfo>,
    pub pair_text: String,
    pub timeframe: Timeframe,
    pub ready: bool,
    pub analysis: Option<AnalysisView>,
    pub messages: Vec<ChatMessage>,
    pub analyzing: bool,
    pub chatting: bool,
    pub error: Option<SessionError>,
}

#[derive(Debug)]
struct SessionState {
    epoch: u64,
    /// Set while the session view is active; `None` means Landing
    session_id: Option<Uuid>,
    input_mode: InputMode,
    image: Option<ImagePayload>,
    pair_text: String,
    timeframe: Timeframe,
    result: Option<AnalysisResult>,
    messages: Vec<ChatMessage>,
    analyzing: bool,
    chatting: bool,
    error: Option<SessionError>,
}

impl SessionState {
    fn empty(epoch: u64, timeframe: Timeframe) -> Self {
        Self {
            epoch,
            session_id: None,
            input_mode: InputMode::default(),
            image: None,
            pair_text: String::new(),
            timeframe,
            result: None,
            messages: Vec::new(),
            analyzing: false,
            chatting: false,
            error: None,
        }
    }

    fn is_active(&self) -> bool {
        self.session_id.is_some()
    }

    fn activate(&mut self) {
        if self.session_id.is_none() {
            self.session_id = Some(Uuid::new_v4());
        }
    }

    fn phase(&self) -> SessionPhase {
        if !self.is_active() {
            SessionPhase::Landing
        } else if self.analyzing {
            SessionPhase::Analyzing
        } else if self.result.is_some() {
            SessionPhase::ResultReady
        } else {
            SessionPhase::AwaitingInput
        }
    }

    fn image_input(&self) -> Option<AnalysisInput> {
        self.image.clone().map(AnalysisInput::Image)
    }

    fn pair_input(&self) -> Option<AnalysisInput> {
        if self.pair_text.trim().is_empty() {
            return None;
        }
        Some(AnalysisInput::Pair {
            pair: self.pair_text.clone(),
            timeframe: self.timeframe,
        })
    }

    /// Input for the next analysis: the current mode first, the other mode as fallback.
    ///
    /// The fallback is intentional and not mode-exclusive: a typed pair still
    /// counts as input while the image pane is shown, and a held image still
    /// counts while the pair pane is shown. `EmptyInput` only fires when
    /// neither exists.
    fn analysis_input(&self) -> Option<AnalysisInput> {
        if !self.is_active() {
            return None;
        }
        match self.input_mode {
            InputMode::Image => self.image_input().or_else(|| self.pair_input()),
            InputMode::Text => self.pair_input().or_else(|| self.image_input()),
        }
    }

    /// Orphan whatever is in flight; its reply will be discarded on arrival
    fn bump_epoch(&mut self) {
        self.epoch += 1;
        self.analyzing = false;
        self.chatting = false;
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id,
            phase: self.phase(),
            input_mode: self.input_mode,
            image: self.image.as_ref().map(|image| ImageInfo {
                mime_type: image.mime_type().to_string(),
                len: image.len(),
            }),
            pair_text: self.pair_text.clone(),
            timeframe: self.timeframe,
            ready: self.analysis_input().is_some(),
            analysis: self.result.as_ref().map(AnalysisView::from),
            messages: self.messages.clone(),
            analyzing: self.analyzing,
            chatting: self.chatting,
            error: self.error.clone(),
        }
    }
}

#[derive(Clone)]
pub struct Session {
    state: Arc<Mutex<SessionState>>,
    analysis: AnalysisService,
    chat: ChatOrchestrator,
    default_timeframe: Timeframe,
}

impl Session {
    pub fn new(backend: Arc<dyn ModelBackend>, default_timeframe: Timeframe) -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState::empty(0, default_timeframe))),
            analysis: AnalysisService::new(backend.clone()),
            chat: ChatOrchestrator::new(backend),
            default_timeframe,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        // State is replaced field by field under the lock; a panic elsewhere
        // cannot leave it half-written.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ============= Input capture =============

    /// Capture an image from a file, drop or paste.
    ///
    /// A rejected capture only sets the error slot. An accepted one replaces
    /// the image and invalidates the analysis and chat built on the old one.
    pub fn capture_image(
        &self,
        source: CaptureSource,
        mime_type: &str,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Result<(), SessionError> {
        let payload = ImagePayload::new(mime_type, bytes);
        let mut state = self.lock();

        let image = match payload {
            Ok(image) => image,
            Err(e) => {
                warn!(
                    event = events::CAPTURE_REJECTED,
                    source = %source,
                    "⚠️ [SESSION] Rejected capture: {}",
                    e
                );
                state.error = Some(e.clone());
                return Err(e);
            }
        };

        if state.analyzing || state.chatting {
            info!("📥 [SESSION] New capture while a request is in flight; its reply will be dropped");
        }
        info!(
            event = events::IMAGE_CAPTURED,
            source = %source,
            mime = image.mime_type(),
            bytes = image.len(),
            "📥 [SESSION] Image captured"
        );

        state.bump_epoch();
        state.image = Some(image);
        state.result = None;
        state.messages.clear();
        state.error = None;
        state.input_mode = InputMode::Image;
        state.activate();
        Ok(())
    }

    /// Handle a clipboard paste.
    ///
    /// Every image item is captured in order. A paste without any image item
    /// is rejected like a non-image upload: the error slot is set and the
    /// rest of the session is left alone.
    pub fn handle_paste(&self, event: PasteEvent) {
        let (images, others): (Vec<ClipboardItem>, Vec<ClipboardItem>) = event
            .items
            .into_iter()
            .partition(|item| is_image_mime(&item.mime_type));

        // Errors are already recorded in the error slot
        if images.is_empty() {
            let (mime_type, bytes) = match others.into_iter().next() {
                Some(item) => (item.mime_type, item.bytes),
                None => (String::new(), Arc::from(Vec::<u8>::new())),
            };
            let _ = self.capture_image(CaptureSource::Paste, &mime_type, bytes);
            return;
        }
        for item in images {
            let _ = self.capture_image(CaptureSource::Paste, &item.mime_type, item.bytes);
        }
    }

    /// Listen for pastes on `bus` until the returned guard is dropped
    pub fn attach_paste(&self, bus: &PasteBus) -> PasteSubscription {
        let session = self.clone();
        info!("📋 [PASTE] Session paste listener registered");
        bus.subscribe(move |event| session.handle_paste(event))
    }

    /// Enter the session in text (pair) mode
    pub fn select_text_protocol(&self) {
        let mut state = self.lock();
        state.input_mode = InputMode::Text;
        state.activate();
    }

    pub fn set_input_mode(&self, mode: InputMode) {
        self.lock().input_mode = mode;
    }

    /// Store the pair text verbatim; `timeframe` keeps the current one when `None`
    pub fn set_pair(&self, pair: impl Into<String>, timeframe: Option<Timeframe>) {
        let mut state = self.lock();
        state.pair_text = pair.into();
        if let Some(timeframe) = timeframe {
            state.timeframe = timeframe;
        }
    }

    /// Drop the held image; analysis and chat stay
    pub fn clear_image(&self) {
        self.lock().image = None;
    }

    // ============= Analysis =============

    /// Run one analysis on the current input.
    ///
    /// A call while another analysis is in flight does nothing and returns
    /// `AlreadyRunning`. Failures land in the error slot and leave any
    /// previous result in place.
    pub async fn start_analysis(&self) -> Result<AnalysisOutcome, SessionError> {
        let (input, epoch) = {
            let mut state = self.lock();
            if state.analyzing {
                info!("📊 [SESSION] Analysis already in flight, ignoring request");
                return Ok(AnalysisOutcome::AlreadyRunning);
            }
            let Some(input) = state.analysis_input() else {
                warn!("⚠️ [SESSION] Analysis requested without usable input");
                state.error = Some(SessionError::EmptyInput);
                return Err(SessionError::EmptyInput);
            };
            state.analyzing = true;
            state.error = None;
            (input, state.epoch)
        };

        info!(
            event = events::ANALYSIS_STARTED,
            "📊 [SESSION] Analyzing {}",
            input.describe()
        );
        let outcome = self.analysis.analyze(&input).await;

        let mut state = self.lock();
        if state.epoch != epoch {
            info!(
                event = events::STALE_RESPONSE_DISCARDED,
                "🗑️ [SESSION] Session changed during analysis, dropping reply"
            );
            return Ok(AnalysisOutcome::Discarded);
        }
        state.analyzing = false;

        match outcome {
            Ok(result) => {
                info!(
                    event = events::ANALYSIS_COMPLETED,
                    asset = %result.asset_name,
                    verdict = %result.investment_verdict,
                    "✅ [SESSION] Analysis ready"
                );
                state.result = Some(result.clone());
                Ok(AnalysisOutcome::Completed(result))
            }
            Err(e) => {
                warn!(event = events::ANALYSIS_FAILED, "❌ [SESSION] Analysis failed: {}", e);
                state.error = Some(e.clone());
                Err(e)
            }
        }
    }

    // ============= Chat =============

    /// Send one chat turn.
    ///
    /// The user message is logged before the model is called and stays in
    /// the log if the assistant turn fails. No automatic retry.
    pub async fn send_message(&self, text: &str) -> Result<ChatOutcome, SessionError> {
        if text.trim().is_empty() {
            return Ok(ChatOutcome::Ignored);
        }

        let (image, prior, context, epoch) = {
            let mut state = self.lock();
            if !state.is_active() {
                return Ok(ChatOutcome::Ignored);
            }
            if state.chatting {
                info!("💬 [SESSION] Chat turn already in flight, ignoring message");
                return Ok(ChatOutcome::Busy);
            }
            let prior = state.messages.clone();
            state.messages.push(ChatMessage::user(text));
            state.chatting = true;
            (
                state.image.clone(),
                prior,
                state.result.as_ref().map(AnalysisResult::context_digest),
                state.epoch,
            )
        };

        let reply = self
            .chat
            .send_message(image.as_ref(), &prior, text, context.as_deref())
            .await;

        let mut state = self.lock();
        if state.epoch != epoch {
            info!(
                event = events::STALE_RESPONSE_DISCARDED,
                "🗑️ [SESSION] Session changed during chat turn, dropping reply"
            );
            return Ok(ChatOutcome::Discarded);
        }
        state.chatting = false;

        match reply {
            Ok(content) => {
                let message = ChatMessage::assistant(content);
                state.messages.push(message.clone());
                if matches!(state.error, Some(SessionError::ChatTurnFailed(_))) {
                    state.error = None;
                }
                info!(
                    event = events::CHAT_TURN_COMPLETED,
                    messages = state.messages.len(),
                    "💬 [SESSION] Assistant replied"
                );
                Ok(ChatOutcome::Replied(message))
            }
            Err(e) => {
                warn!(event = events::CHAT_TURN_FAILED, "❌ [SESSION] {}", e);
                state.error = Some(e.clone());
                Err(e)
            }
        }
    }

    // ============= Reset / export / reads =============

    /// Back to Landing. Clears every field in one step.
    pub fn reset(&self) {
        let mut state = self.lock();
        let epoch = state.epoch + 1;
        *state = SessionState::empty(epoch, self.default_timeframe);
        info!(event = events::SESSION_RESET, "🔄 [SESSION] Session reset");
    }

    /// `(file name, document)` for the current analysis, if there is one
    pub fn export_report(&self, app_name: &str) -> Option<(String, String)> {
        let state = self.lock();
        let result = state.result.as_ref()?;
        Some((
            report_filename(app_name, &result.asset_name),
            render_dated_report(app_name, result, &state.messages, Local::now()),
        ))
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock().snapshot()
    }

    pub fn phase(&self) -> SessionPhase {
        self.lock().phase()
    }

    pub fn image(&self) -> Option<ImagePayload> {
        self.lock().image.clone()
    }

    pub fn result(&self) -> Option<AnalysisResult> {
        self.lock().result.clone()
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.lock().messages.clone()
    }

    pub fn error(&self) -> Option<SessionError> {
        self.lock().error.clone()
    }

    pub fn is_ready(&self) -> bool {
        self.lock().analysis_input().is_some()
    }
}
