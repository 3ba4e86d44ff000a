//! Terminal UI module using ratatui.
//!
//! This module provides the TUI rendering and input handling:
//!
//! - `render`: Main frame rendering, header, status bar and overlays
//! - `input`: Keyboard event handling
//! - `styles`: Color schemes and text styling
//! - `views`: One renderer per console view (login, dashboard, audit, ...)

pub mod input;
pub mod render;
pub mod styles;
pub mod views;
