pub mod detector;
pub mod fallback;
pub mod file_dialog;
pub mod host;
pub mod recorder;
pub mod strategy;
pub mod streaming;

pub use detector::{CapabilityDetector, ProbeConfig};
pub use fallback::{Fallback, FallbackPlanner};
pub use host::{
    BreakoutNavigator, CaptureHosts, DialogPending, EnvironmentHost, FileCaptureHost, MicStream,
    MicrophoneHost, RecognitionEvent, RecognitionHost, RecordedAudio,
};
pub use strategy::{CaptureStrategy, build_strategy};
