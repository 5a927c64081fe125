//! Console speech engines
//!
//! Typed lines stand in for recognized speech and spoken replies are printed,
//! with playback time simulated from the text length.

use super::recognition::{
    PermissionState, RecognitionListener, RecognitionOptions, SpeechRecognizer,
};
use super::synthesis::{estimate_speech_duration, SpeechRequest, SpeechSynthesizer};
use crate::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Reads stdin lines and reports each one as a final recognition result
pub struct ConsoleRecognizer {
    listener: Arc<Mutex<Option<RecognitionListener>>>,
    reader: JoinHandle<()>,
}

impl ConsoleRecognizer {
    /// Start the stdin reader; must be called inside a tokio runtime
    pub fn spawn() -> Self {
        let listener: Arc<Mutex<Option<RecognitionListener>>> = Arc::new(Mutex::new(None));
        let active = Arc::clone(&listener);

        let reader = tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let line = line.trim().to_string();
                if line.is_empty() {
                    continue;
                }

                let current = active.lock().clone();
                match current {
                    Some(listener) => {
                        listener.partial(vec![line.clone()]);
                        listener.final_result(vec![line]);
                    }
                    None => debug!("Not listening, dropped input: {}", line),
                }
            }
            info!("Console input closed");
        });

        Self { listener, reader }
    }
}

impl Drop for ConsoleRecognizer {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

#[async_trait]
impl SpeechRecognizer for ConsoleRecognizer {
    async fn check_permissions(&self) -> Result<PermissionState> {
        Ok(PermissionState::Granted)
    }

    async fn request_permissions(&self) -> Result<PermissionState> {
        Ok(PermissionState::Granted)
    }

    async fn start(&self, options: RecognitionOptions, listener: RecognitionListener) -> Result<()> {
        debug!("Console recognition started ({})", options.language);
        *self.listener.lock() = Some(listener);
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.listener.lock().take();
        Ok(())
    }

    async fn remove_all_listeners(&self) -> Result<()> {
        self.listener.lock().take();
        Ok(())
    }
}

/// Prints replies and waits for their estimated playback time
#[derive(Default)]
pub struct ConsoleSynthesizer {
    interrupt: Notify,
}

impl ConsoleSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SpeechSynthesizer for ConsoleSynthesizer {
    async fn speak(&self, request: SpeechRequest) -> Result<()> {
        println!("🔊 [{}] {}", request.language, request.text);

        let playback = estimate_speech_duration(&request.text);
        tokio::select! {
            _ = tokio::time::sleep(playback) => {}
            _ = self.interrupt.notified() => debug!("Playback interrupted"),
        }
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.interrupt.notify_waiters();
        Ok(())
    }
}
