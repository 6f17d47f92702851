use std::cell::RefCell;

use crate::color::Color;
use crate::context::AppContext;
use crate::tool::{ToolHost, ToolId};
use crate::widget::{
    CanvasOps, Geometry, SliderRange, WidgetFactory, WidgetId, WidgetRegistry, WidgetRequest,
};

/// Handed to `Tool::build_setup_widget`; every widget it creates belongs to `owner`.
pub(crate) struct WidgetBuilder<'a> {
    pub(crate) owner: ToolId,
    pub(crate) registry: &'a RefCell<WidgetRegistry>,
}

impl WidgetBuilder<'_> {
    fn create(&mut self, request: WidgetRequest) -> Option<WidgetId> {
        self.registry.borrow_mut().create(self.owner, request)
    }
}

impl CanvasOps for WidgetBuilder<'_> {
    fn put_pixel(&mut self, canvas: WidgetId, x: usize, y: usize, color: Color) {
        self.registry.borrow_mut().put_pixel(canvas, x, y, color);
    }

    fn put_sprite(
        &mut self,
        canvas: WidgetId,
        x: usize,
        y: usize,
        w: usize,
        h: usize,
        texture: &str,
    ) {
        self.registry.borrow_mut().put_sprite(canvas, x, y, w, h, texture);
    }

    fn clean_canvas(&mut self, canvas: WidgetId, color: Color) {
        self.registry.borrow_mut().clean_canvas(canvas, color);
    }
}

impl WidgetFactory for WidgetBuilder<'_> {
    fn create_button(&mut self, geometry: Geometry, text: &str) -> Option<WidgetId> {
        self.create(WidgetRequest::Button { geometry, text: text.to_owned() })
    }

    fn create_label(&mut self, geometry: Geometry, text: &str) -> Option<WidgetId> {
        self.create(WidgetRequest::Label { geometry, text: text.to_owned() })
    }

    fn create_slider(&mut self, geometry: Geometry, range: SliderRange) -> Option<WidgetId> {
        self.create(WidgetRequest::Slider { geometry, range })
    }

    fn create_canvas(&mut self, geometry: Geometry) -> Option<WidgetId> {
        self.create(WidgetRequest::Canvas { geometry })
    }
}

/// Handed to `Tool::apply`.
pub(crate) struct HostServices<'a> {
    pub(crate) registry: &'a RefCell<WidgetRegistry>,
    pub(crate) context: &'a AppContext,
}

impl CanvasOps for HostServices<'_> {
    fn put_pixel(&mut self, canvas: WidgetId, x: usize, y: usize, color: Color) {
        self.registry.borrow_mut().put_pixel(canvas, x, y, color);
    }

    fn put_sprite(
        &mut self,
        canvas: WidgetId,
        x: usize,
        y: usize,
        w: usize,
        h: usize,
        texture: &str,
    ) {
        self.registry.borrow_mut().put_sprite(canvas, x, y, w, h, texture);
    }

    fn clean_canvas(&mut self, canvas: WidgetId, color: Color) {
        self.registry.borrow_mut().clean_canvas(canvas, color);
    }
}

impl ToolHost for HostServices<'_> {
    fn app_context(&self) -> &AppContext {
        self.context
    }
}
