use crate::context::AppContext;
use crate::event::Event;
use crate::surface::PixelSurface;
use crate::widget::{CanvasOps, WidgetFactory};

/// Host services available while a tool handles an event.
pub trait ToolHost: CanvasOps {
    /// The drawing colors shared by the host and all tools
    fn app_context(&self) -> &AppContext;
}

/// The capability every plugin tool or filter implements.
///
/// Once registered, the host owns the tool and drives it: first one call to
/// `build_setup_widget`, then `apply` for every event routed to it, then drop
/// at shutdown. A tool never calls these on itself.
pub trait Tool {
    /// Name used in host logs
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Relative path of the icon texture the host shows for this tool.
    fn texture(&self) -> &str;

    /// Create this tool's setup widgets. Called exactly once, before the
    /// first `apply`.
    fn build_setup_widget(&mut self, widgets: &mut dyn WidgetFactory);

    /// Handle one event.
    ///
    /// `image` is absent when the host has no image to offer; it is only
    /// borrowed for this call. `Event::NoEvent` should be ignored.
    fn apply(
        &mut self,
        host: &mut dyn ToolHost,
        image: Option<&mut dyn PixelSurface>,
        event: &Event,
    );
}
