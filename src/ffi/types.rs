//! Flat records that cross the C boundary. Layouts are fixed.

use std::ffi::{c_char, c_int};

use thiserror::Error;

use crate::event::{
    ButtonClickedEvent, CanvasEvent, Event, EventKind, Modifiers, MotionEvent, MouseButton,
    MouseButtonEvent, SliderMovedEvent,
};
use crate::widget::WidgetId;

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct MotionEventData {
    pub x: usize,
    pub y: usize,
    pub rel_x: i64,
    pub rel_y: i64,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MouseButtonEventData {
    pub x: usize,
    pub y: usize,
    pub button: c_int,
    pub shift: bool,
    pub alt: bool,
    pub ctrl: bool,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ButtonClickedEventData {
    pub id: u64,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct SliderMovedEventData {
    pub id: u64,
    pub value: i64,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CanvasEventData {
    pub id: u64,
    pub x: usize,
    pub y: usize,
}

/// Payload storage. Only the member named by `RawEvent::kind` holds data.
#[repr(C)]
#[derive(Clone, Copy)]
pub union EventData {
    pub motion: MotionEventData,
    pub mbedata: MouseButtonEventData,
    pub bcedata: ButtonClickedEventData,
    pub smedata: SliderMovedEventData,
    pub cedata: CanvasEventData,
}

/// The C event record: a tag plus a payload union.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct RawEvent {
    pub kind: c_int,
    pub data: EventData,
}

impl std::fmt::Debug for RawEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawEvent").field("kind", &self.kind).finish_non_exhaustive()
    }
}

/// Reasons a raw event cannot be turned into an [`Event`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RawEventError {
    #[error("unknown event type {0}")]
    UnknownKind(c_int),
    #[error("unknown mouse button {0}")]
    UnknownButton(c_int),
    #[error("widget event carries the invalid id 0")]
    NullWidget,
}

fn widget(raw: u64) -> Result<WidgetId, RawEventError> {
    WidgetId::from_raw(raw).ok_or(RawEventError::NullWidget)
}

impl From<&Event> for RawEvent {
    fn from(event: &Event) -> Self {
        let data = match *event {
            Event::NoEvent => EventData { motion: MotionEventData::default() },
            Event::MouseMoved(e) => EventData {
                motion: MotionEventData { x: e.x, y: e.y, rel_x: e.rel_x, rel_y: e.rel_y },
            },
            Event::MousePressed(e) | Event::MouseReleased(e) => EventData {
                mbedata: MouseButtonEventData {
                    x: e.x,
                    y: e.y,
                    button: e.button as c_int,
                    shift: e.modifiers.shift,
                    alt: e.modifiers.alt,
                    ctrl: e.modifiers.ctrl,
                },
            },
            Event::ButtonClicked(e) => {
                EventData { bcedata: ButtonClickedEventData { id: e.id.get() } }
            }
            Event::SliderMoved(e) => EventData {
                smedata: SliderMovedEventData { id: e.id.get(), value: e.value },
            },
            Event::CanvasMousePressed(e)
            | Event::CanvasMouseReleased(e)
            | Event::CanvasMouseMoved(e) => {
                EventData { cedata: CanvasEventData { id: e.id.get(), x: e.x, y: e.y } }
            }
        };
        Self { kind: event.kind() as c_int, data }
    }
}

impl RawEvent {
    /// Decode the record into an [`Event`], reading only the payload member
    /// selected by `kind`.
    ///
    /// # Safety
    ///
    /// The member of `data` that `kind` selects must have been written.
    pub unsafe fn to_event(&self) -> Result<Event, RawEventError> {
        let kind = EventKind::from_raw(self.kind).ok_or(RawEventError::UnknownKind(self.kind))?;
        // SAFETY: the caller guarantees the member matching `kind` is initialized.
        unsafe {
            Ok(match kind {
                EventKind::NoEvent => Event::NoEvent,
                EventKind::MouseMoved => {
                    let d = self.data.motion;
                    let (x, y, rel_x, rel_y) = (d.x, d.y, d.rel_x, d.rel_y);
                    Event::MouseMoved(MotionEvent { x, y, rel_x, rel_y })
                }
                EventKind::MousePressed | EventKind::MouseReleased => {
                    let d = self.data.mbedata;
                    let payload = MouseButtonEvent {
                        x: d.x,
                        y: d.y,
                        button: MouseButton::from_raw(d.button)
                            .ok_or(RawEventError::UnknownButton(d.button))?,
                        modifiers: Modifiers { shift: d.shift, alt: d.alt, ctrl: d.ctrl },
                    };
                    if kind == EventKind::MousePressed {
                        Event::MousePressed(payload)
                    } else {
                        Event::MouseReleased(payload)
                    }
                }
                EventKind::ButtonClicked => {
                    Event::ButtonClicked(ButtonClickedEvent { id: widget(self.data.bcedata.id)? })
                }
                EventKind::SliderMoved => {
                    let d = self.data.smedata;
                    Event::SliderMoved(SliderMovedEvent { id: widget(d.id)?, value: d.value })
                }
                EventKind::CanvasMousePressed
                | EventKind::CanvasMouseReleased
                | EventKind::CanvasMouseMoved => {
                    let d = self.data.cedata;
                    let payload = CanvasEvent { id: widget(d.id)?, x: d.x, y: d.y };
                    match kind {
                        EventKind::CanvasMousePressed => Event::CanvasMousePressed(payload),
                        EventKind::CanvasMouseReleased => Event::CanvasMouseReleased(payload),
                        _ => Event::CanvasMouseMoved(payload),
                    }
                }
            })
        }
    }
}

/// Virtual table of the C++ `Image` class. `Image` has no virtual
/// destructor, so the four accessors are the only slots.
#[repr(C)]
pub struct SurfaceVTable {
    pub get_h: unsafe extern "C" fn(this: *mut RawSurface) -> usize,
    pub get_w: unsafe extern "C" fn(this: *mut RawSurface) -> usize,
    pub get_pixel: unsafe extern "C" fn(this: *mut RawSurface, x: usize, y: usize) -> u32,
    pub set_pixel: unsafe extern "C" fn(this: *mut RawSurface, x: usize, y: usize, color: u32),
}

/// Header of an `Image` object: just its vtable pointer. Implementations
/// keep their own state after it. Valid only during the call it is passed to.
#[repr(C)]
pub struct RawSurface {
    pub vtable: *const SurfaceVTable,
}

/// Virtual table of the C++ `Tool` class as laid out by the Itanium C++ ABI
/// (GCC and Clang on Linux, macOS and MinGW). The virtual destructor takes
/// two slots.
#[repr(C)]
pub struct ToolVTable {
    pub apply:
        unsafe extern "C" fn(this: *mut RawTool, image: *mut RawSurface, event: *const RawEvent),
    /// Complete-object destructor: runs the destructor, keeps the memory.
    pub drop_in_place: unsafe extern "C" fn(this: *mut RawTool),
    /// Deleting destructor: runs the destructor and frees the object. The
    /// host calls it exactly once per adopted tool.
    pub delete: unsafe extern "C" fn(this: *mut RawTool),
    pub get_texture: unsafe extern "C" fn(this: *mut RawTool) -> *const c_char,
    pub build_setup_widget: unsafe extern "C" fn(this: *mut RawTool),
}

/// Header of every tool object handed to `addTool`/`addFilter`.
#[repr(C)]
pub struct RawTool {
    pub vtable: *const ToolVTable,
}
