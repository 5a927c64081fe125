//! Voice session controller
//!
//! Drives the continuous listen → think → speak loop. One tokio task owns all
//! session state and handles one message at a time: commands from the
//! handle, recognition events, timer fires and completions of the external
//! calls it spawned.

use super::state::{SharedSessionState, VoicePhase};
use super::timers::{TimerFired, TimerKind, TimerTable};
use crate::actions::{compose_reply, ActionDispatcher, ActionKind};
use crate::assistant::{build_context_message, AssistantApi, AssistantReply, AssistantRequest};
use crate::integration::VoiceConfig;
use crate::messages::{ChatMessage, ConversationHistory};
use crate::speech::{
    RecognitionEvent, RecognitionListener, RecognitionOptions, SpeechRecognizer, SpeechRequest,
    SpeechSynthesizer,
};
use crate::store::InventoryStore;
use crate::{KiranaError, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Commands that can be sent to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Begin the continuous voice loop
    Start,

    /// End the loop from any phase
    Stop,

    /// Cut the spoken reply short and listen again
    Interrupt,

    /// Change the active language code
    SetLanguage(String),

    /// Stop and terminate the controller task
    Shutdown,
}

/// Events emitted by the session
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The loop moved to another phase
    PhaseChanged(VoicePhase),

    /// Recognized text changed
    Transcript(String),

    /// New assistant reply for display
    Response(String),

    /// Entry for the visual chat history
    Message(ChatMessage),

    /// An action touched the store; views should re-read it
    InventoryChanged,

    /// User-visible error
    Error(String),

    /// The session became inactive
    Ended,

    /// Controller task has shut down
    Shutdown,
}

/// Everything the controller task reacts to
#[derive(Debug)]
enum SessionMessage {
    Command(SessionCommand),
    ListeningStarted {
        session: u64,
        listen: u64,
        result: Result<()>,
    },
    Recognition {
        listen: u64,
        event: RecognitionEvent,
    },
    Timer(TimerFired),
    AssistantReplied {
        session: u64,
        text: String,
        result: Result<AssistantReply>,
    },
    SpeechFinished {
        speech: u64,
        result: Result<()>,
    },
}

/// Handle for controlling the session from the UI
///
/// Dropping the handle shuts the controller down.
pub struct VoiceSessionHandle {
    mailbox: UnboundedSender<SessionMessage>,
    event_rx: Receiver<SessionEvent>,
    state: SharedSessionState,
}

impl VoiceSessionHandle {
    /// Send a command to the session
    pub fn send_command(&self, cmd: SessionCommand) -> Result<()> {
        self.mailbox
            .send(SessionMessage::Command(cmd))
            .map_err(|e| KiranaError::ChannelError(format!("Failed to send command: {}", e)))
    }

    pub fn start(&self) -> Result<()> {
        self.send_command(SessionCommand::Start)
    }

    pub fn stop(&self) -> Result<()> {
        self.send_command(SessionCommand::Stop)
    }

    pub fn interrupt(&self) -> Result<()> {
        self.send_command(SessionCommand::Interrupt)
    }

    pub fn set_language(&self, language: impl Into<String>) -> Result<()> {
        self.send_command(SessionCommand::SetLanguage(language.into()))
    }

    pub fn shutdown(&self) -> Result<()> {
        self.send_command(SessionCommand::Shutdown)
    }

    /// Try to receive an event from the session
    pub fn try_recv_event(&self) -> Option<SessionEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Get the event receiver for a UI loop
    pub fn event_receiver(&self) -> Receiver<SessionEvent> {
        self.event_rx.clone()
    }

    /// Shared, read-only view of the session state
    pub fn state(&self) -> &SharedSessionState {
        &self.state
    }

    pub fn phase(&self) -> VoicePhase {
        self.state.phase()
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }
}

impl Drop for VoiceSessionHandle {
    fn drop(&mut self) {
        let _ = self
            .mailbox
            .send(SessionMessage::Command(SessionCommand::Shutdown));
    }
}

/// The session controller
pub struct VoiceSession {
    config: VoiceConfig,
    language: String,

    recognizer: Arc<dyn SpeechRecognizer>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    assistant: Arc<dyn AssistantApi>,
    store: Arc<dyn InventoryStore>,

    state: SharedSessionState,
    history: ConversationHistory,
    timers: TimerTable,

    mailbox_tx: UnboundedSender<SessionMessage>,
    mailbox_rx: UnboundedReceiver<SessionMessage>,
    event_tx: Sender<SessionEvent>,

    /// Bumped on start and stop; assistant replies from older epochs are dropped
    session_epoch: u64,
    /// Bumped for every listening attempt
    listen_epoch: u64,
    /// Bumped for every utterance and whenever playback is abandoned
    speech_epoch: u64,
}

impl VoiceSession {
    pub fn new(
        config: VoiceConfig,
        recognizer: Arc<dyn SpeechRecognizer>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        assistant: Arc<dyn AssistantApi>,
        store: Arc<dyn InventoryStore>,
    ) -> Result<(Self, VoiceSessionHandle)> {
        config.validate()?;

        let (mailbox_tx, mailbox_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = unbounded();
        let state = SharedSessionState::new(config.language.clone());

        let timer_tx = mailbox_tx.clone();
        let timers = TimerTable::new(move |fired| {
            let _ = timer_tx.send(SessionMessage::Timer(fired));
        });

        let handle = VoiceSessionHandle {
            mailbox: mailbox_tx.clone(),
            event_rx,
            state: state.clone(),
        };

        let session = Self {
            language: config.language.clone(),
            history: ConversationHistory::new(config.history_limit),
            config,
            recognizer,
            synthesizer,
            assistant,
            store,
            state,
            timers,
            mailbox_tx,
            mailbox_rx,
            event_tx,
            session_epoch: 0,
            listen_epoch: 0,
            speech_epoch: 0,
        };

        Ok((session, handle))
    }

    /// Run the controller on its own task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Process messages until shutdown
    pub async fn run(mut self) {
        info!("Voice session started");

        while let Some(message) = self.mailbox_rx.recv().await {
            if let SessionMessage::Command(SessionCommand::Shutdown) = message {
                info!("Voice session shutdown requested");
                self.stop();
                self.emit(SessionEvent::Shutdown);
                break;
            }
            self.handle(message);
        }

        self.timers.clear_all();
        info!("Voice session stopped");
    }

    fn handle(&mut self, message: SessionMessage) {
        match message {
            SessionMessage::Command(cmd) => self.on_command(cmd),
            SessionMessage::ListeningStarted {
                session,
                listen,
                result,
            } => self.on_listening_started(session, listen, result),
            SessionMessage::Recognition { listen, event } => self.on_recognition(listen, event),
            SessionMessage::Timer(fired) => self.on_timer(fired),
            SessionMessage::AssistantReplied {
                session,
                text,
                result,
            } => self.on_assistant_replied(session, text, result),
            SessionMessage::SpeechFinished { speech, result } => {
                self.on_speech_finished(speech, result)
            }
        }
    }

    fn on_command(&mut self, cmd: SessionCommand) {
        match cmd {
            SessionCommand::Start => self.start(),
            SessionCommand::Stop => self.stop(),
            SessionCommand::Interrupt => self.interrupt(),
            SessionCommand::SetLanguage(language) => {
                info!("Language set to {}", language);
                self.state.write().language = language.clone();
                self.language = language;
            }
            SessionCommand::Shutdown => {}
        }
    }

    fn start(&mut self) {
        if self.state.is_active() {
            debug!("Session already active");
            return;
        }

        info!("Starting voice session");
        self.session_epoch += 1;
        self.history.clear();
        {
            let mut state = self.state.write();
            state.active = true;
            state.error = None;
            state.history_len = 0;
        }
        self.begin_listening();
    }

    /// End the session from any phase
    fn stop(&mut self) {
        let was_active = self.state.is_active();
        info!("Stopping voice session");

        self.session_epoch += 1;
        self.listen_epoch += 1;
        self.speech_epoch += 1;
        self.timers.clear_all();

        self.stop_synthesis();
        self.release_recognizer();

        self.history.clear();
        {
            let mut state = self.state.write();
            state.active = false;
            state.processing = false;
            state.transcript.clear();
            state.response.clear();
            state.history_len = 0;
        }
        self.set_phase(VoicePhase::Idle);

        if was_active {
            self.emit(SessionEvent::Ended);
        }
    }

    /// Report why the session cannot continue, then stop it
    fn fail(&mut self, e: KiranaError) {
        error!("Voice session failed: {}", e);
        let message = e.user_message();
        self.state.write().error = Some(message.clone());
        self.emit(SessionEvent::Error(message));
        self.stop();
    }

    fn interrupt(&mut self) {
        if !self.state.phase().is_speaking() {
            debug!("Nothing to interrupt in {} phase", self.state.phase());
            return;
        }

        info!("Speech interrupted");
        self.abandon_speech();
        self.begin_listening();
    }

    fn begin_listening(&mut self) {
        self.timers.clear_all();
        self.listen_epoch += 1;
        {
            let mut state = self.state.write();
            state.transcript.clear();
            state.response.clear();
        }
        self.set_phase(VoicePhase::Listening);

        let recognizer = Arc::clone(&self.recognizer);
        let options = RecognitionOptions::new(self.config.voice_for(&self.language));
        let listener = self.listener_for(self.listen_epoch);
        let mailbox = self.mailbox_tx.clone();
        let (session, listen) = (self.session_epoch, self.listen_epoch);

        tokio::spawn(async move {
            let result = start_recognition(recognizer.as_ref(), options, listener).await;
            let _ = mailbox.send(SessionMessage::ListeningStarted {
                session,
                listen,
                result,
            });
        });
    }

    fn listener_for(&self, listen: u64) -> RecognitionListener {
        let mailbox = self.mailbox_tx.clone();
        RecognitionListener::new(move |event| {
            let _ = mailbox.send(SessionMessage::Recognition { listen, event });
        })
    }

    fn on_listening_started(&mut self, session: u64, listen: u64, result: Result<()>) {
        let current = session == self.session_epoch
            && listen == self.listen_epoch
            && self.state.phase().is_listening();

        match result {
            Ok(()) if current => {
                debug!("Recognition running");
                self.timers
                    .arm(TimerKind::NoSpeech, self.config.no_speech_timeout());
            }
            Ok(()) if !self.state.is_active() => {
                debug!("Recognition started after stop, shutting it down");
                self.release_recognizer();
            }
            Ok(()) if !self.state.phase().is_listening() => {
                debug!("Recognition started outside listening, stopping it");
                self.stop_recognition();
            }
            Ok(()) => debug!("Ignoring stale recognition start"),
            Err(e) if current => self.fail(e),
            Err(e) => debug!("Ignoring stale recognition failure: {}", e),
        }
    }

    fn on_recognition(&mut self, listen: u64, event: RecognitionEvent) {
        if listen != self.listen_epoch || !self.state.phase().is_listening() {
            debug!("Ignoring recognition result outside listening");
            return;
        }

        match &event {
            RecognitionEvent::Partial(_) => {
                if let Some(text) = event.best_match() {
                    self.on_partial(text.to_string());
                }
            }
            RecognitionEvent::Final(_) => {
                let text = event
                    .best_match()
                    .filter(|t| !t.trim().is_empty())
                    .map(str::to_string)
                    .unwrap_or_else(|| self.state.transcript());
                self.on_final(text);
            }
        }
    }

    fn on_partial(&mut self, text: String) {
        let meaningful = self.is_meaningful(&text);
        self.state.write().transcript = text.clone();
        self.emit(SessionEvent::Transcript(text));

        if meaningful && !self.timers.is_armed(TimerKind::ForceProcess) {
            self.timers
                .arm(TimerKind::ForceProcess, self.config.force_process_delay());
        }
        self.timers
            .arm(TimerKind::NoSpeech, self.config.no_speech_timeout());
        self.timers
            .arm(TimerKind::Silence, self.config.silence_timeout());
    }

    fn on_final(&mut self, text: String) {
        if text.trim().is_empty() {
            debug!("Empty final result");
            return;
        }

        self.timers.clear_all();
        self.stop_recognition();
        self.state.write().transcript = text.clone();
        self.emit(SessionEvent::Transcript(text.clone()));
        self.begin_thinking(text);
    }

    fn on_timer(&mut self, fired: TimerFired) {
        if !self.timers.acknowledge(fired) {
            debug!("Ignoring cancelled {:?} timer", fired.kind);
            return;
        }

        let phase = self.state.phase();
        match fired.kind {
            TimerKind::Silence | TimerKind::ForceProcess if phase.is_listening() => {
                let text = self.state.transcript();
                if self.is_meaningful(&text) {
                    debug!("{:?} timer processing transcript", fired.kind);
                    self.stop_recognition();
                    self.begin_thinking(text);
                } else {
                    debug!("Transcript too short to process: {:?}", text);
                }
            }
            TimerKind::NoSpeech if phase.is_listening() => {
                info!("No speech detected, ending session");
                self.stop();
            }
            TimerKind::Watchdog if phase.is_speaking() => {
                warn!("Speech did not finish in time, recovering");
                self.abandon_speech();
                self.resume();
            }
            TimerKind::Retry if phase.is_idle() && self.state.is_active() => {
                debug!("Retrying after assistant failure");
                self.begin_listening();
            }
            kind => debug!("{:?} timer fired in {} phase, ignored", kind, phase),
        }
    }

    fn begin_thinking(&mut self, text: String) {
        if self.state.is_processing() {
            warn!("Already processing, ignoring: {}", text);
            return;
        }
        if text.trim().is_empty() {
            return;
        }

        info!("Processing: {}", text);
        self.timers.clear_all();
        self.state.write().processing = true;
        self.set_phase(VoicePhase::Thinking);
        self.emit(SessionEvent::Message(ChatMessage::user(&text)));

        let request = self.build_request(&text);
        let assistant = Arc::clone(&self.assistant);
        let mailbox = self.mailbox_tx.clone();
        let session = self.session_epoch;

        tokio::spawn(async move {
            let result = assistant.chat(request).await;
            let _ = mailbox.send(SessionMessage::AssistantReplied {
                session,
                text,
                result,
            });
        });
    }

    fn build_request(&self, text: &str) -> AssistantRequest {
        let inventory = self.store.inventory();
        let sales = self.store.sales();
        let message =
            build_context_message(text, &inventory, &sales, &self.config.currency_symbol);

        AssistantRequest {
            message,
            history: self.history.turns(),
            language: self.language.clone(),
            inventory,
        }
    }

    fn on_assistant_replied(&mut self, session: u64, text: String, result: Result<AssistantReply>) {
        if session != self.session_epoch || !self.state.is_active() {
            debug!("Discarding assistant reply for an ended session");
            return;
        }

        let reply = match result {
            Ok(reply) => reply,
            Err(e) => {
                error!("Assistant call failed: {}", e);
                let message = e.user_message();
                {
                    let mut state = self.state.write();
                    state.error = Some(message.clone());
                    state.processing = false;
                }
                self.emit(SessionEvent::Error(message));
                self.set_phase(VoicePhase::Idle);
                self.timers.arm(TimerKind::Retry, self.config.retry_delay());
                return;
            }
        };

        let kind = reply
            .action
            .as_deref()
            .map(ActionKind::parse)
            .unwrap_or(ActionKind::None);

        let outcome = match reply.action.as_deref() {
            Some(action) if kind.is_actionable() => {
                let params = reply.params.clone().unwrap_or(Value::Null);
                let outcome = ActionDispatcher::new(self.store.as_ref(), &self.language)
                    .dispatch(action, &params);
                self.emit(SessionEvent::InventoryChanged);
                outcome
            }
            _ => None,
        };

        let composed = compose_reply(
            kind,
            outcome.as_ref(),
            &reply.response,
            reply.speech.as_deref(),
        );

        self.history.push_exchange(text, composed.display.clone());
        {
            let mut state = self.state.write();
            state.response = composed.display.clone();
            state.error = None;
            state.history_len = self.history.len();
        }
        self.emit(SessionEvent::Response(composed.display.clone()));
        self.emit(SessionEvent::Message(ChatMessage::assistant(composed.display)));

        self.begin_speaking(composed.speech);
    }

    fn begin_speaking(&mut self, text: String) {
        if text.trim().is_empty() {
            debug!("Nothing to say");
            self.state.write().processing = false;
            self.resume();
            return;
        }

        self.speech_epoch += 1;
        self.set_phase(VoicePhase::Speaking);
        self.timers
            .arm(TimerKind::Watchdog, self.config.watchdog_timeout());

        let request = SpeechRequest::new(
            text,
            self.config.voice_for(&self.language),
            &self.config.synthesis,
        );
        let synthesizer = Arc::clone(&self.synthesizer);
        let mailbox = self.mailbox_tx.clone();
        let speech = self.speech_epoch;

        tokio::spawn(async move {
            let result = synthesizer.speak(request).await;
            let _ = mailbox.send(SessionMessage::SpeechFinished { speech, result });
        });
    }

    fn on_speech_finished(&mut self, speech: u64, result: Result<()>) {
        if speech != self.speech_epoch {
            debug!("Ignoring completion of abandoned speech");
            return;
        }

        if let Err(e) = result {
            warn!("Speech synthesis failed: {}", e);
        }

        self.timers.clear_all();
        self.state.write().processing = false;
        self.resume();
    }

    /// Drop the current utterance and release the processing lock
    fn abandon_speech(&mut self) {
        self.speech_epoch += 1;
        self.timers.clear_all();
        self.stop_synthesis();
        self.state.write().processing = false;
    }

    /// Listen again if the session is still active, otherwise go idle
    fn resume(&mut self) {
        if self.state.is_active() {
            self.begin_listening();
        } else {
            self.set_phase(VoicePhase::Idle);
        }
    }

    fn is_meaningful(&self, text: &str) -> bool {
        text.trim().chars().count() > self.config.min_transcript_chars
    }

    /// Request recognition stop without waiting; engines may never answer
    fn stop_recognition(&self) {
        let recognizer = Arc::clone(&self.recognizer);
        tokio::spawn(async move {
            if let Err(e) = recognizer.stop().await {
                debug!("Stopping recognition failed: {}", e);
            }
        });
    }

    /// Stop recognition and drop every listener the engine still holds
    fn release_recognizer(&self) {
        let recognizer = Arc::clone(&self.recognizer);
        tokio::spawn(async move {
            if let Err(e) = recognizer.stop().await {
                debug!("Stopping recognition failed: {}", e);
            }
            if let Err(e) = recognizer.remove_all_listeners().await {
                debug!("Removing recognition listeners failed: {}", e);
            }
        });
    }

    fn stop_synthesis(&self) {
        let synthesizer = Arc::clone(&self.synthesizer);
        tokio::spawn(async move {
            if let Err(e) = synthesizer.stop().await {
                debug!("Stopping synthesis failed: {}", e);
            }
        });
    }

    fn set_phase(&self, phase: VoicePhase) {
        let previous = std::mem::replace(&mut self.state.write().phase, phase);
        if previous != phase {
            debug!("Phase {} -> {}", previous, phase);
            self.emit(SessionEvent::PhaseChanged(phase));
        }
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.event_tx.send(event);
    }
}

async fn start_recognition(
    recognizer: &dyn SpeechRecognizer,
    options: RecognitionOptions,
    listener: RecognitionListener,
) -> Result<()> {
    let mut permission = recognizer.check_permissions().await?;
    if !permission.is_granted() {
        permission = recognizer.request_permissions().await?;
    }
    if !permission.is_granted() {
        return Err(KiranaError::PermissionDenied(format!(
            "microphone access is {:?}",
            permission
        )));
    }

    recognizer.start(options, listener).await
}

/// Builder for creating a voice session
pub struct VoiceSessionBuilder {
    config: VoiceConfig,
    recognizer: Option<Arc<dyn SpeechRecognizer>>,
    synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
    assistant: Option<Arc<dyn AssistantApi>>,
    store: Option<Arc<dyn InventoryStore>>,
}

impl VoiceSessionBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: VoiceConfig::default(),
            recognizer: None,
            synthesizer: None,
            assistant: None,
            store: None,
        }
    }

    /// Set the complete configuration
    pub fn with_config(mut self, config: VoiceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.config.language = language.into();
        self
    }

    pub fn with_silence_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_silence_timeout(timeout);
        self
    }

    pub fn with_recognizer(mut self, recognizer: Arc<dyn SpeechRecognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    pub fn with_synthesizer(mut self, synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    pub fn with_assistant(mut self, assistant: Arc<dyn AssistantApi>) -> Self {
        self.assistant = Some(assistant);
        self
    }

    pub fn with_store(mut self, store: Arc<dyn InventoryStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Build the session
    pub fn build(self) -> Result<(VoiceSession, VoiceSessionHandle)> {
        let missing = |what: &str| KiranaError::ConfigError(format!("No {} configured", what));

        VoiceSession::new(
            self.config,
            self.recognizer.ok_or_else(|| missing("speech recognizer"))?,
            self.synthesizer.ok_or_else(|| missing("speech synthesizer"))?,
            self.assistant.ok_or_else(|| missing("assistant"))?,
            self.store.ok_or_else(|| missing("store"))?,
        )
    }
}

impl Default for VoiceSessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_collaborators() {
        let result = VoiceSessionBuilder::new().with_language("hi").build();
        match result {
            Err(KiranaError::ConfigError(msg)) => assert!(msg.contains("recognizer")),
            _ => panic!("expected a configuration error"),
        }
    }

    #[test]
    fn test_command_equality() {
        assert_eq!(
            SessionCommand::SetLanguage("hi".into()),
            SessionCommand::SetLanguage("hi".into())
        );
        assert_ne!(SessionCommand::Start, SessionCommand::Stop);
    }
}
