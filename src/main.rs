use anyhow::{Context, Result};
use kirana::assistant::HttpAssistant;
use kirana::integration::VoiceConfig;
use kirana::session::{SessionEvent, VoiceSessionBuilder};
use kirana::speech::{ConsoleRecognizer, ConsoleSynthesizer};
use kirana::store::{InventoryStore, LocalStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn load_config() -> Result<VoiceConfig> {
    let config = match std::env::var("KIRANA_CONFIG") {
        Ok(path) => VoiceConfig::load(&path).with_context(|| format!("loading {}", path))?,
        Err(_) => VoiceConfig::default(),
    };

    Ok(match std::env::var("KIRANA_ASSISTANT_URL") {
        Ok(url) => config.with_assistant_url(url),
        Err(_) => config,
    })
}

fn open_store() -> Result<Arc<dyn InventoryStore>> {
    Ok(match std::env::var("KIRANA_STORE") {
        Ok(path) => Arc::new(LocalStore::open(&path).with_context(|| format!("opening {}", path))?),
        Err(_) => Arc::new(LocalStore::in_memory()),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kirana=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Kirana voice assistant");

    let config = load_config()?;
    let store = open_store()?;
    let assistant = HttpAssistant::from_config(&config.assistant)?;
    info!("Assistant endpoint: {}", assistant.endpoint());

    let (session, handle) = VoiceSessionBuilder::new()
        .with_config(config)
        .with_recognizer(Arc::new(ConsoleRecognizer::spawn()))
        .with_synthesizer(Arc::new(ConsoleSynthesizer::new()))
        .with_assistant(Arc::new(assistant))
        .with_store(store)
        .build()?;
    let task = session.spawn();

    println!("Type what you would say and press Enter. Ctrl-C quits.");
    handle.start()?;

    let mut poll = tokio::time::interval(Duration::from_millis(50));
    'events: loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break 'events;
            }
            _ = poll.tick() => {
                while let Some(event) = handle.try_recv_event() {
                    match event {
                        SessionEvent::Message(message) => {
                            println!("{}: {}", message.role.as_str(), message.content);
                        }
                        SessionEvent::PhaseChanged(phase) => info!("[{}]", phase),
                        SessionEvent::Error(message) => warn!("{}", message),
                        SessionEvent::InventoryChanged => info!("Inventory updated"),
                        SessionEvent::Ended | SessionEvent::Shutdown => break 'events,
                        SessionEvent::Transcript(_) | SessionEvent::Response(_) => {}
                    }
                }
            }
        }
    }

    handle.shutdown()?;
    task.await?;
    Ok(())
}
