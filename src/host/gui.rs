//! Glue for an egui front end: raw pointer input over the image and over a
//! tool's widget panel, and canvas pixels ready for texture upload.

use egui::{ColorImage, Pos2};

use crate::error::HostResult;
use crate::event::CanvasPhase;
use crate::input::InputHandler;
use crate::tool::ToolId;
use crate::widget::{WidgetId, WidgetKind};

use super::Host;

impl Host {
    /// Translate one raw egui event over the image and post the result to
    /// the active tool. Events that translate to nothing yield `Ok(None)`.
    pub fn image_input(
        &mut self,
        input: &mut InputHandler,
        event: &egui::Event,
    ) -> HostResult<Option<ToolId>> {
        match input.translate(event) {
            Some(event) => self.post(event),
            None => Ok(None),
        }
    }

    /// Route one raw egui event over the widget panel of `tool`, drawn with
    /// its top-left corner at `origin`. A press on a button clicks it;
    /// presses, releases and moves over a canvas become canvas events in
    /// canvas pixels. Anything else yields `Ok(None)`.
    pub fn panel_input(
        &mut self,
        tool: ToolId,
        origin: Pos2,
        event: &egui::Event,
    ) -> HostResult<Option<ToolId>> {
        let (pos, phase) = match *event {
            egui::Event::PointerButton { pos, pressed: true, .. } => (pos, CanvasPhase::Pressed),
            egui::Event::PointerButton { pos, pressed: false, .. } => {
                (pos, CanvasPhase::Released)
            }
            egui::Event::PointerMoved(pos) => (pos, CanvasPhase::Moved),
            _ => return Ok(None),
        };
        let Some((id, is_button, (x, y))) = self.hit_test(tool, origin, pos) else {
            return Ok(None);
        };
        if is_button {
            if phase != CanvasPhase::Pressed {
                return Ok(None);
            }
            return self.click_button(id).map(Some);
        }
        self.canvas_pointer(id, phase, x, y).map(Some)
    }

    /// Canvas pixels as an egui image, e.g. for `Context::load_texture`.
    pub fn canvas_texture(&self, id: WidgetId) -> HostResult<ColorImage> {
        Ok(self.canvas(id)?.to_color_image())
    }

    /// The button or canvas of `tool` under `pos`, with the position
    /// relative to the widget's corner.
    fn hit_test(
        &self,
        tool: ToolId,
        origin: Pos2,
        pos: Pos2,
    ) -> Option<(WidgetId, bool, (usize, usize))> {
        let registry = self.registry.borrow();
        let id = registry.widget_at(tool, origin, pos)?;
        let widget = registry.get(id)?;
        let is_button = match widget.kind {
            WidgetKind::Button { .. } => true,
            WidgetKind::Canvas { .. } => false,
            _ => return None,
        };
        let offset = pos - widget.geometry.to_rect(origin).min;
        let x = (offset.x.max(0.0) as usize).min(widget.geometry.w.saturating_sub(1));
        let y = (offset.y.max(0.0) as usize).min(widget.geometry.h.saturating_sub(1));
        Some((id, is_button, (x, y)))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use egui::{PointerButton, Rect, pos2, vec2};

    use super::*;
    use crate::color::Color;
    use crate::event::{Event, Modifiers, MouseButton};
    use crate::host::HostConfig;
    use crate::surface::PixelSurface;
    use crate::tool::{Tool, ToolHost, ToolKind};
    use crate::widget::{Geometry, SliderRange, WidgetFactory};

    /// Button at (0, 0) 40x20, canvas at (0, 30) 8x8, slider at (50, 0).
    #[derive(Default)]
    struct Layout {
        seen: Rc<RefCell<Vec<Event>>>,
    }

    impl Tool for Layout {
        fn texture(&self) -> &str {
            "icons/layout.png"
        }

        fn build_setup_widget(&mut self, widgets: &mut dyn WidgetFactory) {
            widgets.create_button(Geometry::new(0, 0, 40, 20), "Go");
            widgets.create_canvas(Geometry::new(0, 30, 8, 8));
            widgets.create_slider(Geometry::new(50, 0, 60, 10), SliderRange::new(0, 5, 0));
        }

        fn apply(
            &mut self,
            _host: &mut dyn ToolHost,
            _image: Option<&mut dyn PixelSurface>,
            event: &Event,
        ) {
            self.seen.borrow_mut().push(*event);
        }
    }

    fn press(pos: Pos2, pressed: bool) -> egui::Event {
        egui::Event::PointerButton {
            pos,
            button: PointerButton::Primary,
            pressed,
            modifiers: egui::Modifiers::NONE,
        }
    }

    fn host() -> (Host, ToolId, Rc<RefCell<Vec<Event>>>) {
        let tool = Layout::default();
        let seen = tool.seen.clone();
        let mut host = Host::new(HostConfig::default());
        let id = host.register(ToolKind::Tool, Box::new(tool));
        host.build_widgets().unwrap();
        (host, id, seen)
    }

    fn widget(host: &Host, tool: ToolId, kind: &str) -> WidgetId {
        host.with_registry(|r| {
            r.widgets_of(tool).find(|(_, w)| w.kind.name() == kind).map(|(id, _)| id)
        })
        .unwrap()
    }

    #[test]
    fn test_panel_press_clicks_button_and_hits_canvas() {
        let (mut host, tool, seen) = host();
        let button = widget(&host, tool, "button");
        let canvas = widget(&host, tool, "canvas");
        let origin = pos2(200.0, 100.0);

        let mut panel = |event: egui::Event| host.panel_input(tool, origin, &event).unwrap();

        assert_eq!(panel(press(pos2(210.0, 105.0), true)), Some(tool));
        assert_eq!(panel(press(pos2(210.0, 105.0), false)), None);
        assert_eq!(panel(press(pos2(203.5, 132.0), true)), Some(tool));
        assert_eq!(panel(egui::Event::PointerMoved(pos2(207.0, 137.0))), Some(tool));
        // Slider and empty space are not handled here.
        assert_eq!(panel(press(pos2(260.0, 105.0), true)), None);
        assert_eq!(panel(press(pos2(10.0, 10.0), true)), None);

        host.dispatch_pending(None);
        assert_eq!(
            seen.borrow().as_slice(),
            &[
                Event::button_clicked(button),
                Event::canvas_pressed(canvas, 3, 2),
                Event::canvas_moved(canvas, 7, 7),
            ]
        );
    }

    #[test]
    fn test_image_input_goes_to_active_tool() {
        let (mut host, tool, seen) = host();
        host.activate(tool).unwrap();
        let mut input =
            InputHandler::new(Rect::from_min_size(pos2(0.0, 0.0), vec2(40.0, 40.0)), [4, 4]);

        let pressed = host.image_input(&mut input, &press(pos2(25.0, 5.0), true)).unwrap();
        assert_eq!(pressed, Some(tool));
        assert_eq!(host.image_input(&mut input, &egui::Event::PointerGone).unwrap(), None);
        host.dispatch_pending(None);
        assert_eq!(
            seen.borrow().as_slice(),
            &[Event::mouse_pressed(2, 0, MouseButton::Left, Modifiers::default())]
        );
    }

    #[test]
    fn test_canvas_texture_matches_pixels() {
        let (host, tool, _) = host();
        let canvas = widget(&host, tool, "canvas");
        let texture = host.canvas_texture(canvas).unwrap();
        assert_eq!(texture.size, [8, 8]);
        assert!(texture.pixels.iter().all(|&p| p == Color::WHITE.into()));
        assert!(host.canvas_texture(widget(&host, tool, "button")).is_err());
    }
}
