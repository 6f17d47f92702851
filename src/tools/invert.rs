use crate::event::Event;
use crate::surface::PixelSurface;
use crate::tool::{Tool, ToolHost};
use crate::widget::{Geometry, WidgetFactory, WidgetId};

/// Inverts the color channels of the whole image, keeping alpha.
#[derive(Default)]
pub struct Invert {
    apply_button: Option<WidgetId>,
}

impl Invert {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run(image: &mut dyn PixelSurface) {
        for y in 0..image.height() {
            for x in 0..image.width() {
                let inverted = image.get_pixel(x, y).inverted();
                image.set_pixel(x, y, inverted);
            }
        }
    }
}

impl Tool for Invert {
    fn name(&self) -> &str {
        "Invert"
    }

    fn texture(&self) -> &str {
        "icons/invert.png"
    }

    fn build_setup_widget(&mut self, widgets: &mut dyn WidgetFactory) {
        self.apply_button = widgets.create_button(Geometry::new(0, 0, 80, 20), "Apply");
    }

    fn apply(
        &mut self,
        _host: &mut dyn ToolHost,
        image: Option<&mut dyn PixelSurface>,
        event: &Event,
    ) {
        let Event::ButtonClicked(clicked) = event else {
            return;
        };
        if Some(clicked.id) != self.apply_button {
            return;
        }
        match image {
            Some(image) => Self::run(image),
            None => log::debug!("invert requested with no image open"),
        }
    }
}
