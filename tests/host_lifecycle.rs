use std::cell::RefCell;
use std::rc::Rc;

use paint_plugins::{
    Color, Event, Host, HostConfig, HostError, Lifecycle, Modifiers, MouseButton, PixelBuffer,
    PixelSurface, Registrar, Tool, ToolHost, ToolKind, WidgetFactory,
};

/// Everything a recording tool observed, in order.
#[derive(Debug, Clone, PartialEq)]
enum Call {
    Build,
    Apply { event: Event, had_image: bool },
    Drop,
}

type Log = Rc<RefCell<Vec<(&'static str, Call)>>>;

struct Recorder {
    label: &'static str,
    log: Log,
}

impl Tool for Recorder {
    fn name(&self) -> &str {
        self.label
    }

    fn texture(&self) -> &str {
        "icons/recorder.png"
    }

    fn build_setup_widget(&mut self, _widgets: &mut dyn WidgetFactory) {
        self.log.borrow_mut().push((self.label, Call::Build));
    }

    fn apply(
        &mut self,
        _host: &mut dyn ToolHost,
        image: Option<&mut dyn PixelSurface>,
        event: &Event,
    ) {
        self.log.borrow_mut().push((
            self.label,
            Call::Apply { event: *event, had_image: image.is_some() },
        ));
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        self.log.borrow_mut().push((self.label, Call::Drop));
    }
}

fn recorder(label: &'static str, log: &Log) -> Box<dyn Tool> {
    Box::new(Recorder { label, log: log.clone() })
}

fn press(x: usize, y: usize) -> Event {
    Event::mouse_pressed(x, y, MouseButton::Left, Modifiers::default())
}

#[test]
fn test_module_registration_order_and_kinds() {
    let log = Log::default();
    let mut host = Host::new(HostConfig::default());
    let ids = host.load_module(|registrar: &mut dyn Registrar| {
        registrar.add_tool(recorder("brush", &log));
        registrar.add_filter(recorder("blur", &log));
    });

    let tools = host.tools();
    assert_eq!(ids.len(), 2);
    assert_eq!(tools[0].name, "brush");
    assert_eq!(tools[0].kind, ToolKind::Tool);
    assert_eq!(tools[1].name, "blur");
    assert_eq!(tools[1].kind, ToolKind::Filter);
    assert!(tools.iter().all(|t| t.state == Lifecycle::Registered));
    assert!(log.borrow().is_empty());
}

#[test]
fn test_build_happens_once_and_before_apply() {
    let log = Log::default();
    let mut host = Host::new(HostConfig::default());
    let id = host.register(ToolKind::Tool, recorder("brush", &log));

    host.build_widgets().unwrap();
    host.activate(id).unwrap();
    host.send(press(0, 0), None).unwrap();
    host.build_widgets().unwrap();
    host.send(press(1, 1), None).unwrap();

    let builds = log.borrow().iter().filter(|(_, c)| *c == Call::Build).count();
    assert_eq!(builds, 1);
    assert_eq!(log.borrow()[0], ("brush", Call::Build));
    assert_eq!(host.state(id).unwrap(), Lifecycle::Active);
}

#[test]
fn test_tools_registered_later_are_built_later() {
    let log = Log::default();
    let mut host = Host::new(HostConfig::default());
    host.register(ToolKind::Tool, recorder("first", &log));
    assert_eq!(host.build_widgets().unwrap(), 1);

    let second = host.register(ToolKind::Tool, recorder("second", &log));
    assert_eq!(host.state(second).unwrap(), Lifecycle::Registered);
    assert_eq!(host.build_widgets().unwrap(), 1);
    assert_eq!(
        log.borrow().as_slice(),
        &[("first", Call::Build), ("second", Call::Build)]
    );
}

#[test]
fn test_events_are_fifo_and_surface_is_optional() {
    let log = Log::default();
    let mut host = Host::new(HostConfig::default());
    let id = host.register(ToolKind::Tool, recorder("brush", &log));
    host.build_widgets().unwrap();
    host.activate(id).unwrap();

    let events = [press(1, 1), Event::mouse_moved(2, 1, 1, 0), Event::mouse_moved(3, 1, 1, 0)];
    for event in events {
        host.post(event).unwrap();
    }
    assert_eq!(host.pending(), 3);

    let mut image = PixelBuffer::new(4, 4, Color::WHITE);
    assert_eq!(host.dispatch_pending(Some(&mut image)), 3);
    host.send(Event::mouse_released(3, 1, MouseButton::Left, Modifiers::default()), None)
        .unwrap();

    let applied: Vec<(Event, bool)> = log
        .borrow()
        .iter()
        .filter_map(|(_, call)| match call {
            Call::Apply { event, had_image } => Some((*event, *had_image)),
            _ => None,
        })
        .collect();
    assert_eq!(applied.len(), 4);
    assert_eq!(applied[0], (events[0], true));
    assert_eq!(applied[2], (events[2], true));
    assert!(!applied[3].1);
}

#[test]
fn test_image_events_follow_active_tool() {
    let log = Log::default();
    let mut host = Host::new(HostConfig::default());
    let brush = host.register(ToolKind::Tool, recorder("brush", &log));
    let eraser = host.register(ToolKind::Tool, recorder("eraser", &log));
    host.build_widgets().unwrap();

    host.activate(brush).unwrap();
    host.send(press(0, 0), None).unwrap();
    host.activate(eraser).unwrap();
    host.send(press(1, 1), None).unwrap();

    let receivers: Vec<&str> = log
        .borrow()
        .iter()
        .filter(|(_, call)| matches!(call, Call::Apply { .. }))
        .map(|(label, _)| *label)
        .collect();
    assert_eq!(receivers, ["brush", "eraser"]);
}

#[test]
fn test_unknown_tool_is_an_error() {
    let mut host = Host::new(HostConfig::default());
    let missing = paint_plugins::ToolId(7);
    assert!(matches!(host.activate(missing), Err(HostError::UnknownTool(_))));
    assert!(matches!(host.state(missing), Err(HostError::UnknownTool(_))));
}

#[test]
fn test_shutdown_destroys_every_tool_once() {
    let log = Log::default();
    {
        let mut host = Host::new(HostConfig::default());
        let built = host.register(ToolKind::Tool, recorder("built", &log));
        host.build_widgets().unwrap();
        host.register(ToolKind::Filter, recorder("unbuilt", &log));
        host.activate(built).unwrap();
        host.post(press(0, 0)).unwrap();

        host.shutdown();
        assert_eq!(host.pending(), 0);
        assert_eq!(host.active_tool(), None);
        assert!(host.tools().iter().all(|t| t.state == Lifecycle::Destroyed));
        // Dropping the host afterwards must not destroy anything twice.
    }

    let log = log.borrow();
    let drops: Vec<&str> = log
        .iter()
        .filter(|(_, call)| *call == Call::Drop)
        .map(|(label, _)| *label)
        .collect();
    assert_eq!(drops, ["built", "unbuilt"]);
    // The queued press was discarded, never applied.
    assert!(!log.iter().any(|(_, call)| matches!(call, Call::Apply { .. })));
}

#[test]
fn test_context_changes_are_visible_to_tools() {
    struct Painter;

    impl Tool for Painter {
        fn texture(&self) -> &str {
            "icons/painter.png"
        }

        fn build_setup_widget(&mut self, _widgets: &mut dyn WidgetFactory) {}

        fn apply(
            &mut self,
            host: &mut dyn ToolHost,
            image: Option<&mut dyn PixelSurface>,
            event: &Event,
        ) {
            if let (Some(image), Some((x, y))) = (image, event.image_position()) {
                let ctx = host.app_context();
                image.set_pixel(x, y, ctx.foreground());
                ctx.set_background(Color::from_rgb(0, 0, 255));
            }
        }
    }

    let mut host = Host::new(HostConfig::default());
    let id = host.register(ToolKind::Tool, Box::new(Painter));
    host.build_widgets().unwrap();
    host.activate(id).unwrap();

    host.app_context().set_foreground(Color::from_rgb(255, 0, 0));
    let mut image = PixelBuffer::new(2, 2, Color::WHITE);
    host.send(press(1, 0), Some(&mut image)).unwrap();

    assert_eq!(image.get(1, 0), Some(Color::from_rgb(255, 0, 0)));
    assert_eq!(host.app_context().background(), Color::from_rgb(0, 0, 255));
}
