use serde::{Deserialize, Serialize};

use crate::widget::WidgetId;

/// Tag values of the C event record. The discriminants are part of the ABI.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Stub. Tools must ignore it.
    NoEvent = 0,
    MouseMoved = 1,
    MousePressed = 2,
    MouseReleased = 3,
    ButtonClicked = 4,
    SliderMoved = 5,
    CanvasMousePressed = 6,
    CanvasMouseReleased = 7,
    CanvasMouseMoved = 8,
}

impl EventKind {
    pub fn from_raw(raw: i32) -> Option<Self> {
        Some(match raw {
            0 => Self::NoEvent,
            1 => Self::MouseMoved,
            2 => Self::MousePressed,
            3 => Self::MouseReleased,
            4 => Self::ButtonClicked,
            5 => Self::SliderMoved,
            6 => Self::CanvasMousePressed,
            7 => Self::CanvasMouseReleased,
            8 => Self::CanvasMouseMoved,
            _ => return None,
        })
    }

    /// Whether events of this kind are addressed to a widget rather than the image.
    pub fn is_widget_scoped(self) -> bool {
        matches!(
            self,
            Self::ButtonClicked
                | Self::SliderMoved
                | Self::CanvasMousePressed
                | Self::CanvasMouseReleased
                | Self::CanvasMouseMoved
        )
    }
}

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left = 0,
    Right = 1,
}

impl MouseButton {
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::Left),
            1 => Some(Self::Right),
            _ => None,
        }
    }
}

impl TryFrom<egui::PointerButton> for MouseButton {
    type Error = egui::PointerButton;

    fn try_from(button: egui::PointerButton) -> Result<Self, Self::Error> {
        match button {
            egui::PointerButton::Primary => Ok(Self::Left),
            egui::PointerButton::Secondary => Ok(Self::Right),
            other => Err(other),
        }
    }
}

/// Modifier keys held while a mouse button changed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub alt: bool,
    pub ctrl: bool,
}

impl From<egui::Modifiers> for Modifiers {
    fn from(modifiers: egui::Modifiers) -> Self {
        Self {
            shift: modifiers.shift,
            alt: modifiers.alt,
            ctrl: modifiers.ctrl,
        }
    }
}

/// Pointer motion over the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotionEvent {
    pub x: usize,
    pub y: usize,
    /// Relative to the previous pointer position.
    pub rel_x: i64,
    pub rel_y: i64,
}

/// A mouse button going down or up over the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MouseButtonEvent {
    pub x: usize,
    pub y: usize,
    pub button: MouseButton,
    #[serde(default)]
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonClickedEvent {
    pub id: WidgetId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliderMovedEvent {
    pub id: WidgetId,
    pub value: i64,
}

/// Pointer activity inside a canvas widget, in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasEvent {
    pub id: WidgetId,
    pub x: usize,
    pub y: usize,
}

/// An event delivered to a tool's `apply`.
///
/// Each variant carries exactly the payload its tag describes, so there is no
/// way to read a payload that does not belong to the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    #[default]
    NoEvent,
    MouseMoved(MotionEvent),
    MousePressed(MouseButtonEvent),
    MouseReleased(MouseButtonEvent),
    ButtonClicked(ButtonClickedEvent),
    SliderMoved(SliderMovedEvent),
    CanvasMousePressed(CanvasEvent),
    CanvasMouseReleased(CanvasEvent),
    CanvasMouseMoved(CanvasEvent),
}

impl Event {
    pub fn mouse_moved(x: usize, y: usize, rel_x: i64, rel_y: i64) -> Self {
        Self::MouseMoved(MotionEvent { x, y, rel_x, rel_y })
    }

    pub fn mouse_pressed(x: usize, y: usize, button: MouseButton, modifiers: Modifiers) -> Self {
        Self::MousePressed(MouseButtonEvent { x, y, button, modifiers })
    }

    pub fn mouse_released(x: usize, y: usize, button: MouseButton, modifiers: Modifiers) -> Self {
        Self::MouseReleased(MouseButtonEvent { x, y, button, modifiers })
    }

    pub fn button_clicked(id: WidgetId) -> Self {
        Self::ButtonClicked(ButtonClickedEvent { id })
    }

    pub fn slider_moved(id: WidgetId, value: i64) -> Self {
        Self::SliderMoved(SliderMovedEvent { id, value })
    }

    pub fn canvas_pressed(id: WidgetId, x: usize, y: usize) -> Self {
        Self::CanvasMousePressed(CanvasEvent { id, x, y })
    }

    pub fn canvas_released(id: WidgetId, x: usize, y: usize) -> Self {
        Self::CanvasMouseReleased(CanvasEvent { id, x, y })
    }

    pub fn canvas_moved(id: WidgetId, x: usize, y: usize) -> Self {
        Self::CanvasMouseMoved(CanvasEvent { id, x, y })
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Self::NoEvent => EventKind::NoEvent,
            Self::MouseMoved(_) => EventKind::MouseMoved,
            Self::MousePressed(_) => EventKind::MousePressed,
            Self::MouseReleased(_) => EventKind::MouseReleased,
            Self::ButtonClicked(_) => EventKind::ButtonClicked,
            Self::SliderMoved(_) => EventKind::SliderMoved,
            Self::CanvasMousePressed(_) => EventKind::CanvasMousePressed,
            Self::CanvasMouseReleased(_) => EventKind::CanvasMouseReleased,
            Self::CanvasMouseMoved(_) => EventKind::CanvasMouseMoved,
        }
    }

    /// The widget this event is addressed to, if it is widget-scoped.
    pub fn widget(&self) -> Option<WidgetId> {
        match self {
            Self::ButtonClicked(e) => Some(e.id),
            Self::SliderMoved(e) => Some(e.id),
            Self::CanvasMousePressed(e)
            | Self::CanvasMouseReleased(e)
            | Self::CanvasMouseMoved(e) => Some(e.id),
            _ => None,
        }
    }

    /// Position on the image for image-scoped pointer events.
    pub fn image_position(&self) -> Option<(usize, usize)> {
        match self {
            Self::MouseMoved(e) => Some((e.x, e.y)),
            Self::MousePressed(e) | Self::MouseReleased(e) => Some((e.x, e.y)),
            _ => None,
        }
    }
}

/// Which canvas pointer event a host-side canvas interaction produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CanvasPhase {
    Pressed,
    Released,
    Moved,
}

impl CanvasPhase {
    pub fn event(self, id: WidgetId, x: usize, y: usize) -> Event {
        match self {
            Self::Pressed => Event::canvas_pressed(id, x, y),
            Self::Released => Event::canvas_released(id, x, y),
            Self::Moved => Event::canvas_moved(id, x, y),
        }
    }
}
