pub mod event;
pub mod line;
pub mod loaders;
pub mod outcome;
pub mod settings;

pub use event::ScanEvent;
pub use line::{LastMessage, LineContent, LineNode, Reference};
pub use loaders::SettingsStore;
pub use outcome::{Contact, LineOutcome, NoContactReason, ScanSummary, SkipReason};
pub use settings::Settings;
