//! Drives tools through the C tool-object layout and the exported host
//! functions, exactly as a loaded plugin library would.

#![cfg(not(feature = "plugin"))]

use std::ffi::CString;
use std::ptr;
use std::sync::atomic::{AtomicUsize, Ordering};

use paint_plugins::ffi::{self, exports};
use paint_plugins::{
    AppContext, Color, Event, Geometry, Host, HostConfig, Lifecycle, Modifiers, MouseButton,
    PixelBuffer, PixelSurface, Registrar, Tool, ToolHost, ToolKind, WidgetFactory, WidgetId,
};

static STAMPS_DROPPED: AtomicUsize = AtomicUsize::new(0);
static ORPHANS_DROPPED: AtomicUsize = AtomicUsize::new(0);

/// Creates a "Go" button and a 4x4 canvas. A click clears the canvas to the
/// background color and marks its corner with the foreground color; a press
/// on the image paints the pixel under the pointer.
#[derive(Default)]
struct Stamp {
    button: Option<WidgetId>,
    canvas: Option<WidgetId>,
}

impl Tool for Stamp {
    fn texture(&self) -> &str {
        "icons/stamp.png"
    }

    fn build_setup_widget(&mut self, widgets: &mut dyn WidgetFactory) {
        self.button = widgets.create_button(Geometry::new(0, 0, 50, 20), "Go");
        self.canvas = widgets.create_canvas(Geometry::new(0, 24, 4, 4));
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
            Event::ButtonClicked(e) if Some(e.id) == self.button => {
                if let Some(canvas) = self.canvas {
                    host.clean_canvas(canvas, bg);
                    host.put_pixel(canvas, 0, 0, fg);
                }
            }
            Event::MousePressed(e) => {
                if let Some(image) = image {
                    image.set_pixel(e.x, e.y, fg);
                }
            }
            _ => {}
        }
    }
}

impl Drop for Stamp {
    fn drop(&mut self) {
        STAMPS_DROPPED.fetch_add(1, Ordering::SeqCst);
    }
}

struct Stray;

impl Tool for Stray {
    fn texture(&self) -> &str {
        ""
    }

    fn build_setup_widget(&mut self, _widgets: &mut dyn WidgetFactory) {}

    fn apply(
        &mut self,
        _host: &mut dyn ToolHost,
        _image: Option<&mut dyn PixelSurface>,
        _event: &Event,
    ) {
    }
}

struct Orphan;

impl Tool for Orphan {
    fn texture(&self) -> &str {
        "orphan.png"
    }

    fn build_setup_widget(&mut self, _widgets: &mut dyn WidgetFactory) {}

    fn apply(
        &mut self,
        _host: &mut dyn ToolHost,
        _image: Option<&mut dyn PixelSurface>,
        _event: &Event,
    ) {
    }
}

impl Drop for Orphan {
    fn drop(&mut self) {
        ORPHANS_DROPPED.fetch_add(1, Ordering::SeqCst);
    }
}

fn register(registrar: &mut dyn Registrar) {
    registrar.add_tool(Box::new(Stamp::default()));
    registrar.add_filter(Box::new(Stray));
}

paint_plugins::declare_module!(register);

fn widgets_of(host: &Host, tool: paint_plugins::ToolId) -> Vec<(WidgetId, &'static str)> {
    host.with_registry(|r| r.widgets_of(tool).map(|(id, w)| (id, w.kind.name())).collect())
}

#[test]
fn test_module_roundtrip_through_c_layout() {
    let mut host = Host::with_global_context(HostConfig::default());
    // SAFETY: init_module is defined above and lives for the whole process.
    let ids = unsafe { host.load_foreign_module("stamp_module", init_module, None) };
    assert_eq!(ids.len(), 2);

    let tools = host.tools();
    assert_eq!(tools[0].kind, ToolKind::Tool);
    assert_eq!(tools[0].name, "stamp_module:stamp");
    assert_eq!(tools[0].texture, "icons/stamp.png");
    assert_eq!(tools[1].kind, ToolKind::Filter);

    host.build_widgets().unwrap();
    let widgets = widgets_of(&host, ids[0]);
    assert_eq!(widgets.len(), 2);
    let (button, _) = widgets.iter().copied().find(|(_, kind)| *kind == "button").unwrap();
    let (canvas, _) = widgets.iter().copied().find(|(_, kind)| *kind == "canvas").unwrap();
    assert!(widgets_of(&host, ids[1]).is_empty());

    // The plugin side reads colors through APPCONTEXT.
    AppContext::global().set_foreground(Color::from_rgb(200, 0, 0));
    AppContext::global().set_background(Color::from_rgb(0, 0, 200));

    host.click_button(button).unwrap();
    assert_eq!(host.dispatch_pending(None), 1);
    {
        let pixels = host.canvas(canvas).unwrap();
        assert_eq!(pixels.get(0, 0), Some(Color::from_rgb(200, 0, 0)));
        assert_eq!(pixels.get(3, 3), Some(Color::from_rgb(0, 0, 200)));
    }

    host.activate(ids[0]).unwrap();
    let mut image = PixelBuffer::new(3, 3, Color::WHITE);
    let press = Event::mouse_pressed(2, 1, MouseButton::Left, Modifiers::default());
    host.send(press, Some(&mut image)).unwrap();
    assert_eq!(image.get(2, 1), Some(Color::from_rgb(200, 0, 0)));
    assert_eq!(image.pixels().iter().filter(|&&c| c == Color::WHITE).count(), 8);

    let before = STAMPS_DROPPED.load(Ordering::SeqCst);
    host.shutdown();
    assert_eq!(STAMPS_DROPPED.load(Ordering::SeqCst), before + 1);
    assert_eq!(host.state(ids[0]).unwrap(), Lifecycle::Destroyed);
}

#[test]
fn test_widget_creation_outside_build_returns_zero() {
    let text = CString::new("Go").unwrap();
    // SAFETY: `text` is NUL-terminated.
    let id = unsafe { exports::createButton(0, 0, 50, 20, text.as_ptr()) };
    assert_eq!(id, 0);
    // SAFETY: plain-value calls.
    unsafe {
        assert_eq!(exports::createSlider(0, 0, 100, 10, 0, 10, 5), 0);
        assert_eq!(exports::createCanvas(0, 0, 4, 4), 0);
    }
}

#[test]
fn test_null_text_is_rejected() {
    // SAFETY: null is an accepted input.
    assert_eq!(unsafe { exports::createLabel(0, 0, 10, 10, ptr::null()) }, 0);
}

#[test]
fn test_canvas_calls_outside_a_host_call_are_ignored() {
    let sprite = CString::new("missing.png").unwrap();
    // SAFETY: plain values and a NUL-terminated path; nothing is published.
    unsafe {
        exports::putPixel(1, 0, 0, 0);
        exports::cleanCanvas(0, 0xFFFF_FFFF);
        exports::putSprite(1, 0, 0, 4, 4, sprite.as_ptr());
    }
}

#[test]
fn test_tool_registered_outside_init_is_destroyed() {
    // SAFETY: export_tool returns a fresh tool object; ownership passes to addTool.
    unsafe { exports::addTool(ffi::export_tool(Box::new(Orphan))) };
    assert_eq!(ORPHANS_DROPPED.load(Ordering::SeqCst), 1);

    // SAFETY: null is logged and ignored.
    unsafe { exports::addFilter(ptr::null_mut()) };
}

#[test]
fn test_appcontext_symbol_is_stable() {
    let first = exports::APPCONTEXT.0;
    assert!(!first.is_null());
    assert_eq!(first, AppContext::global().as_ptr());
    assert_eq!(first, ffi::sys::app_context_ptr());
    assert_eq!(exports::APPCONTEXT_CPP.0, first);
}

#[test]
fn test_raw_event_feeds_exported_apply() {
    struct Echo(std::rc::Rc<std::cell::RefCell<Vec<Event>>>);

    impl Tool for Echo {
        fn texture(&self) -> &str {
            "echo.png"
        }

        fn build_setup_widget(&mut self, _widgets: &mut dyn WidgetFactory) {}

        fn apply(
            &mut self,
            _host: &mut dyn ToolHost,
            image: Option<&mut dyn PixelSurface>,
            event: &Event,
        ) {
            assert!(image.is_none());
            self.0.borrow_mut().push(*event);
        }
    }

    let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
    let raw = ffi::export_tool(Box::new(Echo(seen.clone())));
    let event = Event::mouse_moved(3, 4, -1, 2);
    let raw_event = ffi::RawEvent::from(&event);
    // SAFETY: `raw` is a live tool object owned by this test; it is destroyed once.
    unsafe {
        let vtable = &*(*raw).vtable;
        (vtable.apply)(raw, ptr::null_mut(), &raw_event);
        // A null event is logged, never forwarded.
        (vtable.apply)(raw, ptr::null_mut(), ptr::null());
        (vtable.delete)(raw);
    }
    assert_eq!(seen.borrow().as_slice(), &[event]);
}
