//! Interactive Mandelbrot/Julia explorer.
//!
//! The heart of the crate is [`FractalField`]: it owns the view and
//! recurrence parameters and renders them into an RGBA framebuffer,
//! recomputing in parallel only when a parameter actually changed. The
//! windowed explorer around it lives behind the `gui` feature.

pub mod config;
mod core;

#[cfg(feature = "gui")]
mod input;
#[cfg(feature = "gui")]
mod presenters;

pub use crate::core::data::colour::Colour;
pub use crate::core::data::viewport::{ViewBounds, ViewportState};
pub use crate::core::field::params::RecurrenceParams;
pub use crate::core::field::recurrence::escape_iterations;
pub use crate::core::field::{FieldError, FractalField};
pub use crate::core::palette::PaletteMode;

#[cfg(feature = "gui")]
pub use crate::input::gui::app::run_explorer;
