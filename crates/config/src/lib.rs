// Configuration loading

pub mod ai;
pub mod settings;

pub use ai::{AIConfigStatus, AIDiagnostics, ResolvedAIConfig};
pub use settings::{AIProvider, AISettings, Settings};
