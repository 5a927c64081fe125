//! Continuous voice session: state, timers and the controller actor

pub mod controller;
pub mod state;
pub mod timers;

pub use controller::{
    SessionCommand, SessionEvent, VoiceSession, VoiceSessionBuilder, VoiceSessionHandle,
};
pub use state::{SessionSnapshot, SessionState, SharedSessionState, VoicePhase};
pub use timers::{TimerFired, TimerKind, TimerTable};
