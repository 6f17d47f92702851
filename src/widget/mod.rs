//! Widget handles and the two host-call surfaces a tool sees: the widget
//! factory (only during `build_setup_widget`) and canvas drawing.

mod registry;
mod sprite_cache;

use std::fmt;
use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};

use crate::color::Color;

pub use registry::{Widget, WidgetKind, WidgetRegistry, WidgetRequest};
pub use sprite_cache::{SpriteCache, SpriteError};

/// Opaque handle of a host-created widget.
///
/// The raw value 0 signals a failed creation and has no `WidgetId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetId(NonZeroU64);

impl WidgetId {
    /// Raw handle returned across the C boundary when creation fails.
    pub const INVALID: u64 = 0;

    pub fn from_raw(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }

    pub(crate) fn generate() -> Self {
        Self(crate::id_generator::generate_id())
    }
}

/// Converts a creation result to the raw ABI handle.
pub fn into_raw_handle(id: Option<WidgetId>) -> u64 {
    id.map_or(WidgetId::INVALID, WidgetId::get)
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Position and size of a widget on the tool's setup panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Geometry {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
}

impl Geometry {
    pub const fn new(x: usize, y: usize, w: usize, h: usize) -> Self {
        Self { x, y, w, h }
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// The geometry as an egui rect relative to the panel origin.
    pub fn to_rect(&self, origin: egui::Pos2) -> egui::Rect {
        egui::Rect::from_min_size(
            origin + egui::vec2(self.x as f32, self.y as f32),
            egui::vec2(self.w as f32, self.h as f32),
        )
    }
}

/// Bounds and initial value of a slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliderRange {
    pub min: i64,
    pub max: i64,
    pub start: i64,
}

impl SliderRange {
    pub const fn new(min: i64, max: i64, start: i64) -> Self {
        Self { min, max, start }
    }

    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }

    pub fn clamp(&self, value: i64) -> i64 {
        value.clamp(self.min, self.max)
    }
}

/// Drawing on canvas widgets.
///
/// Passing an id that did not come from `create_canvas`, or coordinates
/// outside the canvas, breaks the caller's side of the contract; hosts are
/// free to ignore such calls.
pub trait CanvasOps {
    fn put_pixel(&mut self, canvas: WidgetId, x: usize, y: usize, color: Color);

    /// Blit the image at `texture` (a path relative to the host's resources),
    /// scaled to `w` x `h`, with its top-left corner at (`x`, `y`).
    fn put_sprite(
        &mut self,
        canvas: WidgetId,
        x: usize,
        y: usize,
        w: usize,
        h: usize,
        texture: &str,
    );

    fn clean_canvas(&mut self, canvas: WidgetId, color: Color);
}

/// Widget creation, available to a tool only while it builds its setup panel.
///
/// Every successful call yields a fresh id that routes the widget's events
/// back to the calling tool. `None` means no widget was created.
pub trait WidgetFactory: CanvasOps {
    fn create_button(&mut self, geometry: Geometry, text: &str) -> Option<WidgetId>;

    fn create_label(&mut self, geometry: Geometry, text: &str) -> Option<WidgetId>;

    fn create_slider(&mut self, geometry: Geometry, range: SliderRange) -> Option<WidgetId>;

    fn create_canvas(&mut self, geometry: Geometry) -> Option<WidgetId>;
}
