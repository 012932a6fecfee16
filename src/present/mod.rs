//! Presentation seam. A presenter receives complete frames and draws a filled
//! disc per ball; windowing and rasterization live behind this trait.

pub mod display_loop;

pub use display_loop::{DisplayLoop, DisplayStats};

use log::debug;

use crate::{
    core::types::{Bounds, Color},
    error::Result,
    pipeline::frame::Snapshot,
};

/// Presentation resources created once by the host and handed to the
/// presenter by reference.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicsContext {
    title: String,
    viewport: Bounds,
    background: Color,
}

impl GraphicsContext {
    pub fn new(title: impl Into<String>, viewport: Bounds) -> Self {
        Self {
            title: title.into(),
            viewport,
            background: Color::rgba(0, 0, 0, 0xFF),
        }
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn viewport(&self) -> Bounds {
        self.viewport
    }

    pub fn background(&self) -> Color {
        self.background
    }
}

/// Consumer of published frames.
pub trait Presenter {
    fn name(&self) -> &str;

    /// Binds the presenter to its graphics resources before the first frame.
    fn attach(&mut self, _context: &GraphicsContext) -> Result<()> {
        Ok(())
    }

    /// Draws every ball of `frame` as a filled disc. `fps` is the achieved display rate.
    fn render(&mut self, frame: &Snapshot, fps: f64) -> Result<()>;

    /// Whether the host asked to close (window closed, frame budget spent, ...).
    fn should_close(&self) -> bool {
        false
    }
}

/// Presenter that draws nothing and only tracks what it was given.
#[derive(Debug, Default, Clone)]
pub struct NoopPresenter {
    frames: u64,
    last_tick: u64,
    last_fps: f64,
    frame_limit: Option<u64>,
}

impl NoopPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests close after `limit` rendered frames.
    pub fn with_frame_limit(limit: u64) -> Self {
        Self {
            frame_limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last_tick(&self) -> u64 {
        self.last_tick
    }

    pub fn last_fps(&self) -> f64 {
        self.last_fps
    }
}

impl Presenter for NoopPresenter {
    fn name(&self) -> &str {
        "noop"
    }

    fn attach(&mut self, context: &GraphicsContext) -> Result<()> {
        debug!("noop presenter attached to '{}'", context.title());
        Ok(())
    }

    fn render(&mut self, frame: &Snapshot, fps: f64) -> Result<()> {
        self.frames += 1;
        self.last_tick = frame.tick();
        self.last_fps = fps;
        Ok(())
    }

    fn should_close(&self) -> bool {
        self.frame_limit
            .is_some_and(|limit| self.frames >= limit)
    }
}
