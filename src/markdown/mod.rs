//! Markdown module - Document rendering
//!
//! Provides:
//! - style: colour palette, text styles, styled runs
//! - renderer: markdown to styled runs, cached `Renderer`
//! - terminal: ANSI presentation
//! - dispatch: off-thread rendering with latest-request tracking

pub mod dispatch;
pub mod renderer;
pub mod style;
pub mod terminal;

pub use dispatch::{LatestRequest, RenderDispatcher, RenderOutput};
pub use renderer::{render_markdown, Renderer};
pub use style::{Color, FontWeight, StyledDocument, StyledRun, TextStyle};
