//! Vim-style modal keyboard input handling for hush

mod commands;
mod modal;

pub use commands::{Command, Mode};
pub use modal::InputHandler;
