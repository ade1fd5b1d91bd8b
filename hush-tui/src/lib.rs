//! Terminal UI for hush - widgets, theme, and layout
//!
//! Phosphor-green terminal interface for the noise player.

mod app;
mod theme;
pub mod widgets;

pub use app::{App, AppState, LevelMeter, MessageType};
pub use theme::{Theme, CRT_GREEN};
pub use widgets::status_bar::HelpWidget;
pub use widgets::{NoiseSelectorWidget, StatusBarWidget, TransportWidget, VolumeMeterWidget};
