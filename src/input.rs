use egui::{Context, Pos2, Rect};

use crate::event::{Event, Modifiers, MouseButton};

/// Converts raw egui pointer input over the displayed image into image
/// mouse events in pixel coordinates.
pub struct InputHandler {
    /// Where the image is drawn, in screen points
    image_rect: Rect,
    /// Image size in pixels
    image_size: [usize; 2],
    last_pixel: Option<(usize, usize)>,
}

impl InputHandler {
    pub fn new(image_rect: Rect, image_size: [usize; 2]) -> Self {
        Self {
            image_rect,
            image_size,
            last_pixel: None,
        }
    }

    /// Update the image placement (e.g. after a resize or zoom)
    pub fn set_image_rect(&mut self, rect: Rect, image_size: [usize; 2]) {
        self.image_rect = rect;
        self.image_size = image_size;
        self.last_pixel = None;
    }

    /// Pixel under `pos`, or `None` outside the image.
    pub fn to_pixel(&self, pos: Pos2) -> Option<(usize, usize)> {
        let [w, h] = self.image_size;
        if w == 0 || h == 0 || !self.image_rect.contains(pos) {
            return None;
        }
        let rel = pos - self.image_rect.min;
        let size = self.image_rect.size();
        let x = ((rel.x / size.x) * w as f32) as usize;
        let y = ((rel.y / size.y) * h as f32) as usize;
        Some((x.min(w - 1), y.min(h - 1)))
    }

    /// Translate a single raw event. Keyboard and other events yield `None`.
    pub fn translate(&mut self, event: &egui::Event) -> Option<Event> {
        match event {
            egui::Event::PointerMoved(pos) => {
                let (x, y) = self.to_pixel(*pos)?;
                let (rel_x, rel_y) = match self.last_pixel {
                    Some((lx, ly)) => (x as i64 - lx as i64, y as i64 - ly as i64),
                    None => (0, 0),
                };
                if self.last_pixel == Some((x, y)) {
                    return None;
                }
                self.last_pixel = Some((x, y));
                Some(Event::mouse_moved(x, y, rel_x, rel_y))
            }
            egui::Event::PointerButton {
                pos,
                button,
                pressed,
                modifiers,
            } => {
                let button = MouseButton::try_from(*button).ok()?;
                let (x, y) = self.to_pixel(*pos)?;
                let modifiers = Modifiers::from(*modifiers);
                Some(if *pressed {
                    Event::mouse_pressed(x, y, button, modifiers)
                } else {
                    Event::mouse_released(x, y, button, modifiers)
                })
            }
            egui::Event::PointerGone => {
                self.last_pixel = None;
                None
            }
            _ => None,
        }
    }

    /// Process this frame's raw egui input
    pub fn process_input(&mut self, ctx: &Context) -> Vec<Event> {
        let raw_events = ctx.input(|input| input.raw.events.clone());
        raw_events.iter().filter_map(|event| self.translate(event)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{PointerButton, pos2};

    fn handler() -> InputHandler {
        // 100x50 points showing a 10x5 image: 10 points per pixel
        InputHandler::new(Rect::from_min_size(pos2(100.0, 100.0), egui::vec2(100.0, 50.0)), [10, 5])
    }

    #[test]
    fn test_motion_reports_delta() {
        let mut input = handler();
        assert_eq!(
            input.translate(&egui::Event::PointerMoved(pos2(105.0, 105.0))),
            Some(Event::mouse_moved(0, 0, 0, 0))
        );
        assert_eq!(
            input.translate(&egui::Event::PointerMoved(pos2(135.0, 125.0))),
            Some(Event::mouse_moved(3, 2, 3, 2))
        );
        assert_eq!(input.translate(&egui::Event::PointerMoved(pos2(136.0, 126.0))), None);
    }

    #[test]
    fn test_pointer_gone_resets_origin() {
        let mut input = handler();
        input.translate(&egui::Event::PointerMoved(pos2(155.0, 105.0)));
        input.translate(&egui::Event::PointerGone);
        assert_eq!(
            input.translate(&egui::Event::PointerMoved(pos2(105.0, 105.0))),
            Some(Event::mouse_moved(0, 0, 0, 0))
        );
    }

    #[test]
    fn test_buttons_carry_modifiers() {
        let mut input = handler();
        let event = egui::Event::PointerButton {
            pos: pos2(195.0, 145.0),
            button: PointerButton::Secondary,
            pressed: true,
            modifiers: egui::Modifiers::SHIFT,
        };
        assert_eq!(
            input.translate(&event),
            Some(Event::mouse_pressed(
                9,
                4,
                MouseButton::Right,
                Modifiers { shift: true, alt: false, ctrl: false }
            ))
        );
    }

    #[test]
    fn test_ignores_outside_and_middle_button() {
        let mut input = handler();
        assert_eq!(input.translate(&egui::Event::PointerMoved(pos2(10.0, 10.0))), None);
        let middle = egui::Event::PointerButton {
            pos: pos2(120.0, 120.0),
            button: PointerButton::Middle,
            pressed: true,
            modifiers: egui::Modifiers::NONE,
        };
        assert_eq!(input.translate(&middle), None);
    }
}
