use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::color::Color;
use crate::error::{HostError, HostResult};
use crate::host::HostConfig;
use crate::surface::PixelBuffer;
use crate::tool::ToolId;

use super::{Geometry, SliderRange, SpriteCache, WidgetId};

/// A widget creation call as received from a tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetRequest {
    Button { geometry: Geometry, text: String },
    Label { geometry: Geometry, text: String },
    Slider { geometry: Geometry, range: SliderRange },
    Canvas { geometry: Geometry },
}

impl WidgetRequest {
    pub fn geometry(&self) -> Geometry {
        match self {
            Self::Button { geometry, .. }
            | Self::Label { geometry, .. }
            | Self::Slider { geometry, .. }
            | Self::Canvas { geometry } => *geometry,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetKind {
    Button { text: String },
    Label { text: String },
    Slider { range: SliderRange, value: i64 },
    Canvas { pixels: PixelBuffer },
}

impl WidgetKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Button { .. } => "button",
            Self::Label { .. } => "label",
            Self::Slider { .. } => "slider",
            Self::Canvas { .. } => "canvas",
        }
    }
}

/// A live widget and the tool its events are routed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Widget {
    pub owner: ToolId,
    pub geometry: Geometry,
    pub kind: WidgetKind,
}

/// Host-side bookkeeping for every widget created by every tool.
///
/// All tools share one identifier space; an id always routes to the single
/// tool that created it.
#[derive(Debug)]
pub struct WidgetRegistry {
    widgets: BTreeMap<WidgetId, Widget>,
    sprites: SpriteCache,
    resource_root: PathBuf,
    max_widgets_per_tool: usize,
    max_canvas_side: usize,
    canvas_background: Color,
}

impl WidgetRegistry {
    pub fn new(config: &HostConfig) -> Self {
        Self {
            widgets: BTreeMap::new(),
            sprites: SpriteCache::new(config.sprite_cache_size),
            resource_root: config.resource_root.clone(),
            max_widgets_per_tool: config.max_widgets_per_tool,
            max_canvas_side: config.max_canvas_side,
            canvas_background: config.canvas_background,
        }
    }

    /// Create a widget for `owner`. `None` means the request was refused and
    /// nothing was created.
    pub fn create(&mut self, owner: ToolId, request: WidgetRequest) -> Option<WidgetId> {
        let geometry = request.geometry();
        if geometry.is_empty() {
            log::warn!("{owner} requested a widget with empty geometry {geometry:?}");
            return None;
        }
        if self.count_owned_by(owner) >= self.max_widgets_per_tool {
            log::warn!(
                "{owner} reached the limit of {} widgets",
                self.max_widgets_per_tool
            );
            return None;
        }

        let kind = match request {
            WidgetRequest::Button { text, .. } => WidgetKind::Button { text },
            WidgetRequest::Label { text, .. } => WidgetKind::Label { text },
            WidgetRequest::Slider { range, .. } => {
                if !range.is_valid() {
                    let (min, max) = (range.min, range.max);
                    log::warn!("{owner} requested a slider with min {min} > max {max}");
                    return None;
                }
                WidgetKind::Slider {
                    range,
                    value: range.clamp(range.start),
                }
            }
            WidgetRequest::Canvas { .. } => {
                if geometry.w > self.max_canvas_side || geometry.h > self.max_canvas_side {
                    log::warn!(
                        "{owner} requested a {}x{} canvas, larger than {}",
                        geometry.w,
                        geometry.h,
                        self.max_canvas_side
                    );
                    return None;
                }
                WidgetKind::Canvas {
                    pixels: PixelBuffer::new(geometry.w, geometry.h, self.canvas_background),
                }
            }
        };

        let id = WidgetId::generate();
        log::debug!("Created {} {id} for {owner} at {geometry:?}", kind.name());
        self.widgets.insert(id, Widget { owner, geometry, kind });
        Some(id)
    }

    pub fn get(&self, id: WidgetId) -> Option<&Widget> {
        self.widgets.get(&id)
    }

    pub fn owner_of(&self, id: WidgetId) -> Option<ToolId> {
        self.widgets.get(&id).map(|w| w.owner)
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Widgets created by `owner`, in creation order
    pub fn widgets_of(&self, owner: ToolId) -> impl Iterator<Item = (WidgetId, &Widget)> + '_ {
        self.widgets
            .iter()
            .filter(move |(_, w)| w.owner == owner)
            .map(|(id, w)| (*id, w))
    }

    /// Topmost widget of `owner` under `pos`, for a panel drawn at `origin`.
    /// Later widgets are drawn over earlier ones.
    pub fn widget_at(
        &self,
        owner: ToolId,
        origin: egui::Pos2,
        pos: egui::Pos2,
    ) -> Option<WidgetId> {
        self.widgets_of(owner)
            .filter(|(_, w)| w.geometry.to_rect(origin).contains(pos))
            .map(|(id, _)| id)
            .last()
    }

    fn count_owned_by(&self, owner: ToolId) -> usize {
        self.widgets.values().filter(|w| w.owner == owner).count()
    }

    /// Drop every widget of `owner`. Returns how many were removed.
    pub fn remove_owned_by(&mut self, owner: ToolId) -> usize {
        let before = self.widgets.len();
        self.widgets.retain(|_, w| w.owner != owner);
        before - self.widgets.len()
    }

    fn expect_kind(&self, id: WidgetId, expected: &'static str) -> HostResult<&Widget> {
        let widget = self.widgets.get(&id).ok_or(HostError::UnknownWidget(id))?;
        if widget.kind.name() != expected {
            return Err(HostError::WrongWidgetKind {
                id,
                expected,
                actual: widget.kind.name(),
            });
        }
        Ok(widget)
    }

    /// Checks that `id` is a button and returns its owner.
    pub fn button_owner(&self, id: WidgetId) -> HostResult<ToolId> {
        self.expect_kind(id, "button").map(|w| w.owner)
    }

    pub fn slider_value(&self, id: WidgetId) -> HostResult<i64> {
        match &self.expect_kind(id, "slider")?.kind {
            WidgetKind::Slider { value, .. } => Ok(*value),
            _ => unreachable!("kind checked above"),
        }
    }

    /// Move a slider, clamping into its range. Returns the stored value.
    pub fn set_slider_value(&mut self, id: WidgetId, requested: i64) -> HostResult<i64> {
        self.expect_kind(id, "slider")?;
        match self.widgets.get_mut(&id).map(|w| &mut w.kind) {
            Some(WidgetKind::Slider { range, value }) => {
                *value = range.clamp(requested);
                Ok(*value)
            }
            _ => Err(HostError::UnknownWidget(id)),
        }
    }

    pub fn canvas(&self, id: WidgetId) -> HostResult<&PixelBuffer> {
        match &self.expect_kind(id, "canvas")?.kind {
            WidgetKind::Canvas { pixels } => Ok(pixels),
            _ => unreachable!("kind checked above"),
        }
    }

    pub fn canvas_mut(&mut self, id: WidgetId) -> HostResult<&mut PixelBuffer> {
        self.expect_kind(id, "canvas")?;
        match self.widgets.get_mut(&id).map(|w| &mut w.kind) {
            Some(WidgetKind::Canvas { pixels }) => Ok(pixels),
            _ => Err(HostError::UnknownWidget(id)),
        }
    }

    pub fn put_pixel(&mut self, id: WidgetId, x: usize, y: usize, color: Color) {
        match self.canvas_mut(id) {
            Ok(pixels) => {
                if !pixels.put(x, y, color) {
                    log::warn!("putPixel({x}, {y}) outside canvas {id}");
                }
            }
            Err(err) => log::warn!("putPixel ignored: {err}"),
        }
    }

    pub fn put_sprite(
        &mut self,
        id: WidgetId,
        x: usize,
        y: usize,
        w: usize,
        h: usize,
        texture: &str,
    ) {
        if let Err(err) = self.canvas(id) {
            log::warn!("putSprite ignored: {err}");
            return;
        }
        let root = self.resource_root.clone();
        let sprite = match self.sprites.get_or_load(texture, w, h, |w, h| {
            SpriteCache::load_from_disk(&root, texture, w, h)
        }) {
            Ok(sprite) => sprite,
            Err(err) => {
                log::warn!("putSprite on canvas {id} failed: {err}");
                return;
            }
        };
        if let Ok(pixels) = self.canvas_mut(id) {
            pixels.blit(x, y, &sprite);
        }
    }

    pub fn clean_canvas(&mut self, id: WidgetId, color: Color) {
        match self.canvas_mut(id) {
            Ok(pixels) => pixels.fill(color),
            Err(err) => log::warn!("cleanCanvas ignored: {err}"),
        }
    }
}
