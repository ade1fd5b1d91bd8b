//! UI Widgets for hush

mod meter;
mod selector;
pub mod status_bar;
mod transport;

pub use meter::VolumeMeterWidget;
pub use selector::NoiseSelectorWidget;
pub use status_bar::StatusBarWidget;
pub use transport::TransportWidget;
