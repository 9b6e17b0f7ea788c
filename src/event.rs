//! Host event shapes.
//!
//! Only the fields the interaction layer reads are modelled: button or touch
//! identity, client coordinates and wheel deltas.
use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Mouse button, numbered like `MouseEvent.button`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
  #[default]
  Left = 0,
  Middle = 1,
  Right = 2,
  Back = 3,
  Forward = 4,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MouseEvent {
  pub button: MouseButton,
  pub client_x: f64,
  pub client_y: f64,
}

impl MouseEvent {
  pub fn new(button: MouseButton, client_x: f64, client_y: f64) -> Self {
    Self { button, client_x, client_y }
  }

  /// A left-button event, the common case in tests and demos.
  pub fn left(client_x: f64, client_y: f64) -> Self { Self::new(MouseButton::Left, client_x, client_y) }

  pub fn client(&self) -> Point { Point::new(self.client_x, self.client_y) }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Touch {
  pub identifier: i64,
  pub client_x: f64,
  pub client_y: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TouchEvent {
  /// Every touch currently on the surface.
  pub touches: Vec<Touch>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WheelEvent {
  pub delta_x: f64,
  pub delta_y: f64,
  pub client_x: f64,
  pub client_y: f64,
}

impl WheelEvent {
  /// A vertical wheel step at `(client_x, client_y)`.
  pub fn vertical(delta_y: f64, client_x: f64, client_y: f64) -> Self {
    Self { delta_x: 0., delta_y, client_x, client_y }
  }

  pub fn client(&self) -> Point { Point::new(self.client_x, self.client_y) }
}

/// One tracked contact of a drag gesture: the mouse, or a single finger.
///
/// Drag inputs deliver slices of pointers so mouse and multi-touch drags
/// feed the same controllers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pointer {
  pub id: i64,
  pub client_x: f64,
  pub client_y: f64,
}

impl Pointer {
  pub fn client(&self) -> Point { Point::new(self.client_x, self.client_y) }
}

impl From<&MouseEvent> for Pointer {
  fn from(e: &MouseEvent) -> Self { Pointer { id: 0, client_x: e.client_x, client_y: e.client_y } }
}

impl From<&Touch> for Pointer {
  fn from(t: &Touch) -> Self {
    Pointer { id: t.identifier, client_x: t.client_x, client_y: t.client_y }
  }
}

/// Native event names an input can listen to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
  MouseDown,
  MouseMove,
  MouseUp,
  Click,
  Wheel,
  TouchStart,
  TouchMove,
  TouchEnd,
}

impl EventKind {
  /// The DOM event type string.
  pub fn as_str(&self) -> &'static str {
    match self {
      EventKind::MouseDown => "mousedown",
      EventKind::MouseMove => "mousemove",
      EventKind::MouseUp => "mouseup",
      EventKind::Click => "click",
      EventKind::Wheel => "wheel",
      EventKind::TouchStart => "touchstart",
      EventKind::TouchMove => "touchmove",
      EventKind::TouchEnd => "touchend",
    }
  }
}

/// An event as delivered by the host.
#[derive(Clone, Debug, PartialEq)]
pub enum DomEvent {
  MouseDown(MouseEvent),
  MouseMove(MouseEvent),
  MouseUp(MouseEvent),
  Click(MouseEvent),
  Wheel(WheelEvent),
  TouchStart(TouchEvent),
  TouchMove(TouchEvent),
  TouchEnd(TouchEvent),
}

impl DomEvent {
  pub fn kind(&self) -> EventKind {
    match self {
      DomEvent::MouseDown(_) => EventKind::MouseDown,
      DomEvent::MouseMove(_) => EventKind::MouseMove,
      DomEvent::MouseUp(_) => EventKind::MouseUp,
      DomEvent::Click(_) => EventKind::Click,
      DomEvent::Wheel(_) => EventKind::Wheel,
      DomEvent::TouchStart(_) => EventKind::TouchStart,
      DomEvent::TouchMove(_) => EventKind::TouchMove,
      DomEvent::TouchEnd(_) => EventKind::TouchEnd,
    }
  }

  pub fn as_mouse(&self) -> Option<&MouseEvent> {
    match self {
      DomEvent::MouseDown(e) | DomEvent::MouseMove(e) | DomEvent::MouseUp(e) | DomEvent::Click(e) => {
        Some(e)
      }
      _ => None,
    }
  }

  pub fn as_touch(&self) -> Option<&TouchEvent> {
    match self {
      DomEvent::TouchStart(e) | DomEvent::TouchMove(e) | DomEvent::TouchEnd(e) => Some(e),
      _ => None,
    }
  }

  pub fn as_wheel(&self) -> Option<&WheelEvent> {
    match self {
      DomEvent::Wheel(e) => Some(e),
      _ => None,
    }
  }
}
