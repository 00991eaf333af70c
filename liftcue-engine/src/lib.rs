pub mod engine;
pub mod http;
pub mod session;
pub mod traits;

mod handoff;

pub use engine::{EngineConfig, EngineError, GestureToken, VoiceCommandEngine};
pub use session::{SessionSnapshot, SessionState};
