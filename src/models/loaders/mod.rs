pub mod settings_loader;

pub use settings_loader::{parse_settings, SettingsStore};
