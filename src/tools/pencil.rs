use crate::color::Color;
use crate::event::Event;
use crate::surface::PixelSurface;
use crate::tool::{Tool, ToolHost};
use crate::widget::{Geometry, SliderRange, WidgetFactory, WidgetId};

const MIN_SIZE: i64 = 1;
const MAX_SIZE: i64 = 16;
const PREVIEW_SIDE: usize = 64;

/// Freehand drawing with the foreground color.
///
/// Pressing a mouse button starts a stroke, motion extends it and release
/// ends it. The size slider sets the brush width; the preview canvas shows
/// the current brush and can be drawn on directly.
pub struct Pencil {
    size: usize,
    // Last point of the stroke in progress
    last: Option<(usize, usize)>,
    size_slider: Option<WidgetId>,
    clear_button: Option<WidgetId>,
    preview: Option<WidgetId>,
}

impl Pencil {
    pub fn new() -> Self {
        Self {
            size: MIN_SIZE as usize,
            last: None,
            size_slider: None,
            clear_button: None,
            preview: None,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_drawing(&self) -> bool {
        self.last.is_some()
    }

    fn dab(&self, image: &mut dyn PixelSurface, cx: usize, cy: usize, color: Color) {
        let half = self.size / 2;
        let (w, h) = (image.width(), image.height());
        let x0 = cx.saturating_sub(half);
        let y0 = cy.saturating_sub(half);
        for y in y0..(y0 + self.size).min(h) {
            for x in x0..(x0 + self.size).min(w) {
                image.set_pixel(x, y, color);
            }
        }
    }

    /// Dab every point of the line from `from` to `to` (Bresenham).
    fn line(
        &self,
        image: &mut dyn PixelSurface,
        from: (usize, usize),
        to: (usize, usize),
        color: Color,
    ) {
        let (mut x, mut y) = (from.0 as i64, from.1 as i64);
        let (x1, y1) = (to.0 as i64, to.1 as i64);
        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let sx = if x < x1 { 1 } else { -1 };
        let sy = if y < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.dab(image, x as usize, y as usize, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    fn redraw_preview(&self, host: &mut dyn ToolHost, fg: Color, bg: Color) {
        let Some(preview) = self.preview else {
            return;
        };
        host.clean_canvas(preview, bg);
        let start = (PREVIEW_SIDE - self.size) / 2;
        for y in start..start + self.size {
            for x in start..start + self.size {
                host.put_pixel(preview, x, y, fg);
            }
        }
    }
}

impl Default for Pencil {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for Pencil {
    fn name(&self) -> &str {
        "Pencil"
    }

    fn texture(&self) -> &str {
        "icons/pencil.png"
    }

    fn build_setup_widget(&mut self, widgets: &mut dyn WidgetFactory) {
        widgets.create_label(Geometry::new(0, 0, 120, 20), "Pencil size");
        self.size_slider = widgets.create_slider(
            Geometry::new(0, 24, 120, 16),
            SliderRange::new(MIN_SIZE, MAX_SIZE, MIN_SIZE),
        );
        self.clear_button = widgets.create_button(Geometry::new(0, 44, 60, 20), "Clear");
        self.preview = widgets.create_canvas(Geometry::new(0, 68, PREVIEW_SIDE, PREVIEW_SIDE));
        if self.size_slider.is_none() || self.preview.is_none() {
            log::warn!("pencil setup incomplete; some widgets were refused");
        }
    }

    fn apply(
        &mut self,
        host: &mut dyn ToolHost,
        image: Option<&mut dyn PixelSurface>,
        event: &Event,
    ) {
        let fg = host.app_context().foreground();
        let bg = host.app_context().background();
        match *event {
            Event::MousePressed(e) => {
                if let Some(image) = image {
                    if e.x < image.width() && e.y < image.height() {
                        self.dab(image, e.x, e.y, fg);
                        self.last = Some((e.x, e.y));
                    }
                }
            }
            Event::MouseMoved(e) => {
                let (Some(from), Some(image)) = (self.last, image) else {
                    return;
                };
                if e.x < image.width() && e.y < image.height() {
                    self.line(image, from, (e.x, e.y), fg);
                    self.last = Some((e.x, e.y));
                }
            }
            Event::MouseReleased(_) => self.last = None,
            Event::SliderMoved(e) if Some(e.id) == self.size_slider => {
                self.size = e.value.clamp(MIN_SIZE, MAX_SIZE) as usize;
                self.redraw_preview(host, fg, bg);
            }
            Event::ButtonClicked(e) if Some(e.id) == self.clear_button => {
                if let Some(preview) = self.preview {
                    host.clean_canvas(preview, bg);
                }
            }
            Event::CanvasMousePressed(e) | Event::CanvasMouseMoved(e)
                if Some(e.id) == self.preview =>
            {
                host.put_pixel(e.id, e.x, e.y, fg);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Modifiers, MouseButton};
    use crate::host::{Host, HostConfig};
    use crate::surface::PixelBuffer;
    use crate::tool::ToolKind;

    fn host_with_pencil() -> (Host, crate::tool::ToolId) {
        let mut host = Host::new(HostConfig::default());
        let id = host.register(ToolKind::Tool, Box::new(Pencil::new()));
        host.build_widgets().unwrap();
        host.activate(id).unwrap();
        (host, id)
    }

    #[test]
    fn test_stroke_connects_points() {
        let (mut host, _) = host_with_pencil();
        let mut image = PixelBuffer::new(10, 10, Color::WHITE);
        let press = Event::mouse_pressed(1, 1, MouseButton::Left, Modifiers::default());
        host.send(press, Some(&mut image)).unwrap();
        host.send(Event::mouse_moved(5, 1, 4, 0), Some(&mut image)).unwrap();
        let release = Event::mouse_released(5, 1, MouseButton::Left, Modifiers::default());
        host.send(release, Some(&mut image)).unwrap();
        // Motion after release draws nothing
        host.send(Event::mouse_moved(5, 8, 0, 7), Some(&mut image)).unwrap();

        for x in 1..=5 {
            assert_eq!(image.get(x, 1), Some(Color::BLACK));
        }
        assert_eq!(image.get(5, 8), Some(Color::WHITE));
    }

    #[test]
    fn test_without_image_does_nothing() {
        let (mut host, _) = host_with_pencil();
        let press = Event::mouse_pressed(1, 1, MouseButton::Left, Modifiers::default());
        assert_eq!(host.send(press, None).unwrap(), 1);
    }

    #[test]
    fn test_slider_and_clear_button() {
        let (mut host, id) = host_with_pencil();
        let (slider, button, canvas) = host.with_registry(|r| {
            let mut slider = None;
            let mut button = None;
            let mut canvas = None;
            for (widget_id, widget) in r.widgets_of(id) {
                match widget.kind.name() {
                    "slider" => slider = Some(widget_id),
                    "button" => button = Some(widget_id),
                    "canvas" => canvas = Some(widget_id),
                    _ => {}
                }
            }
            (slider.unwrap(), button.unwrap(), canvas.unwrap())
        });

        assert_eq!(host.move_slider(slider, 40).unwrap(), MAX_SIZE);
        host.dispatch_pending(None);
        let dark = host
            .canvas(canvas)
            .unwrap()
            .pixels()
            .iter()
            .filter(|&&c| c == Color::BLACK)
            .count();
        assert_eq!(dark, (MAX_SIZE * MAX_SIZE) as usize);

        host.click_button(button).unwrap();
        host.dispatch_pending(None);
        assert!(host.canvas(canvas).unwrap().pixels().iter().all(|&c| c == Color::WHITE));
    }
}
