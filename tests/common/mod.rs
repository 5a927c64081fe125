//! Scripted speech engines and assistant for session tests

#![allow(dead_code)]

use async_trait::async_trait;
use kirana::assistant::{AssistantApi, AssistantReply, AssistantRequest};
use kirana::integration::VoiceConfig;
use kirana::session::{SessionEvent, VoiceSessionBuilder, VoiceSessionHandle};
use kirana::speech::{
    PermissionState, RecognitionListener, RecognitionOptions, SpeechRecognizer, SpeechRequest,
    SpeechSynthesizer,
};
use kirana::store::{LocalStore, Product, ProductName};
use kirana::{KiranaError, Result};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Let spawned tasks run without moving the paused clock
pub async fn settle() {
    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
}

/// Advance the paused clock, then let everything that woke up run
pub async fn advance(millis: u64) {
    tokio::time::advance(Duration::from_millis(millis)).await;
    settle().await;
}

pub struct MockRecognizer {
    listener: Mutex<Option<RecognitionListener>>,
    pub options: Mutex<Vec<RecognitionOptions>>,
    pub permission: Mutex<PermissionState>,
    pub requested_permission: Mutex<PermissionState>,
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
    /// How long the engine takes to come up
    pub start_delay: Mutex<Duration>,
    running: AtomicBool,
}

impl MockRecognizer {
    pub fn new() -> Self {
        Self {
            listener: Mutex::new(None),
            options: Mutex::new(Vec::new()),
            permission: Mutex::new(PermissionState::Granted),
            requested_permission: Mutex::new(PermissionState::Granted),
            starts: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
            start_delay: Mutex::new(Duration::ZERO),
            running: AtomicBool::new(false),
        }
    }

    pub fn slow_start(millis: u64) -> Self {
        let recognizer = Self::new();
        *recognizer.start_delay.lock() = Duration::from_millis(millis);
        recognizer
    }

    pub fn denied() -> Self {
        let recognizer = Self::new();
        *recognizer.permission.lock() = PermissionState::Prompt;
        *recognizer.requested_permission.lock() = PermissionState::Denied;
        recognizer
    }

    /// Deliver a partial result through the latest listener
    pub fn partial(&self, text: &str) {
        let listener = self.listener.lock().clone();
        if let Some(listener) = listener {
            listener.partial(vec![text.to_string()]);
        }
    }

    /// Deliver a final result through the latest listener
    pub fn final_result(&self, text: &str) {
        let listener = self.listener.lock().clone();
        if let Some(listener) = listener {
            listener.final_result(vec![text.to_string()]);
        }
    }

    /// Listener from an earlier listening attempt, kept to simulate late events
    pub fn current_listener(&self) -> Option<RecognitionListener> {
        self.listener.lock().clone()
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    /// Whether the engine is capturing audio
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechRecognizer for MockRecognizer {
    async fn check_permissions(&self) -> Result<PermissionState> {
        Ok(*self.permission.lock())
    }

    async fn request_permissions(&self) -> Result<PermissionState> {
        Ok(*self.requested_permission.lock())
    }

    async fn start(&self, options: RecognitionOptions, listener: RecognitionListener) -> Result<()> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        self.options.lock().push(options);

        let delay = *self.start_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        *self.listener.lock() = Some(listener);
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn remove_all_listeners(&self) -> Result<()> {
        self.listener.lock().take();
        Ok(())
    }
}

/// How a scripted utterance ends
#[derive(Clone, Copy)]
pub enum Playback {
    /// Finish after this long
    Lasts(Duration),
    /// Never finish on its own
    Hang,
    /// Fail immediately
    Fail,
}

pub struct MockSynthesizer {
    pub spoken: Mutex<Vec<SpeechRequest>>,
    pub playback: Mutex<Playback>,
    pub stops: AtomicUsize,
    interrupt: Notify,
}

impl MockSynthesizer {
    pub fn new(playback: Playback) -> Self {
        Self {
            spoken: Mutex::new(Vec::new()),
            playback: Mutex::new(playback),
            stops: AtomicUsize::new(0),
            interrupt: Notify::new(),
        }
    }

    pub fn spoken_texts(&self) -> Vec<String> {
        self.spoken.lock().iter().map(|r| r.text.clone()).collect()
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    async fn speak(&self, request: SpeechRequest) -> Result<()> {
        self.spoken.lock().push(request);
        let playback = *self.playback.lock();

        match playback {
            Playback::Fail => Err(KiranaError::SynthesisError("engine unavailable".into())),
            Playback::Lasts(duration) => {
                tokio::select! {
                    _ = tokio::time::sleep(duration) => {}
                    _ = self.interrupt.notified() => {}
                }
                Ok(())
            }
            Playback::Hang => {
                self.interrupt.notified().await;
                Ok(())
            }
        }
    }

    async fn stop(&self) -> Result<()> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.interrupt.notify_waiters();
        Ok(())
    }
}

pub struct MockAssistant {
    pub requests: Mutex<Vec<AssistantRequest>>,
    replies: Mutex<VecDeque<Result<AssistantReply>>>,
    /// Simulated network latency
    pub latency: Mutex<Duration>,
}

impl MockAssistant {
    pub fn new() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            replies: Mutex::new(VecDeque::new()),
            latency: Mutex::new(Duration::ZERO),
        }
    }

    pub fn with_latency(self, latency: Duration) -> Self {
        *self.latency.lock() = latency;
        self
    }

    pub fn reply(&self, reply: AssistantReply) {
        self.replies.lock().push_back(Ok(reply));
    }

    pub fn fail(&self, error: KiranaError) {
        self.replies.lock().push_back(Err(error));
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn last_request(&self) -> Option<AssistantRequest> {
        self.requests.lock().last().cloned()
    }
}

#[async_trait]
impl AssistantApi for MockAssistant {
    async fn chat(&self, request: AssistantRequest) -> Result<AssistantReply> {
        self.requests.lock().push(request);

        let latency = *self.latency.lock();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(AssistantReply::text("Okay.")))
    }
}

pub fn test_inventory() -> Vec<Product> {
    vec![
        Product::new("1", ProductName::new("Rice").with_translation("hi", "चावल"), 50.0, 100)
            .with_shelf("A1"),
        Product::new("2", ProductName::new("Sugar").with_translation("hi", "चीनी"), 40.0, 3)
            .with_shelf("A2"),
    ]
}

/// A running session wired to mock collaborators
pub struct Harness {
    pub handle: VoiceSessionHandle,
    pub recognizer: Arc<MockRecognizer>,
    pub synthesizer: Arc<MockSynthesizer>,
    pub assistant: Arc<MockAssistant>,
    pub store: Arc<LocalStore>,
    pub task: JoinHandle<()>,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(
            VoiceConfig::default(),
            MockRecognizer::new(),
            MockSynthesizer::new(Playback::Lasts(Duration::from_secs(2))),
            MockAssistant::new(),
        )
    }

    pub fn build(
        config: VoiceConfig,
        recognizer: MockRecognizer,
        synthesizer: MockSynthesizer,
        assistant: MockAssistant,
    ) -> Self {
        let recognizer = Arc::new(recognizer);
        let synthesizer = Arc::new(synthesizer);
        let assistant = Arc::new(assistant);
        let store = Arc::new(LocalStore::with_inventory(test_inventory()));

        let (session, handle) = VoiceSessionBuilder::new()
            .with_config(config)
            .with_recognizer(recognizer.clone())
            .with_synthesizer(synthesizer.clone())
            .with_assistant(assistant.clone())
            .with_store(store.clone())
            .build()
            .expect("session builds");
        let task = session.spawn();

        Self {
            handle,
            recognizer,
            synthesizer,
            assistant,
            store,
            task,
        }
    }

    /// Start the session and wait until recognition is running
    pub async fn start(&self) {
        self.handle.start().unwrap();
        settle().await;
    }

    /// Speak a complete utterance
    pub async fn say(&self, text: &str) {
        self.recognizer.partial(text);
        self.recognizer.final_result(text);
        settle().await;
    }

    pub fn events(&self) -> Vec<SessionEvent> {
        std::iter::from_fn(|| self.handle.try_recv_event()).collect()
    }
}
