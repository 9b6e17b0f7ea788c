//! Prelude module for convenient imports
//!
//! This module re-exports the types page code needs to wire the controls.

// Composition
pub use crate::compose::{render_view_box, MapControls, ViewBoxTransform, ZoomControls};
pub use crate::config::Settings;
// Controllers
pub use crate::controller::{
  ClickController, Controller, ElementDragController, ExponentialZoom, InertiaConfig, PanController,
  PanDirection, PanOptions, StepZoomController, ZoomController, ZoomCurve, ZoomFocusController,
};
// Decorators
pub use crate::decorator::{
  ClickDecorator, Decorator, ElementDragDecorator, PanDecorator, StepZoomDecorator, ZoomDecorator,
  ZoomFocusDecorator,
};
// Host surface and events
pub use crate::dom::{Document, Element};
pub use crate::error::{Error, Result};
pub use crate::event::{DomEvent, MouseButton, MouseEvent, Pointer, Touch, TouchEvent, WheelEvent};
pub use crate::geometry::{Camera, ClientRect, Point, Scale, ScreenTransform, Translate, ViewBox};
// Inputs and views
pub use crate::input::{
  Handlers, Input, MouseClickInput, MouseDragInput, MouseWheelInput, TouchDragInput,
};
pub use crate::model::{focus, watch_all, Model, MutableModel};
// Schedulers
#[cfg(any(target_arch = "wasm32", feature = "timer"))]
pub use crate::scheduler::LocalScheduler;
pub use crate::scheduler::{Duration, Scheduler, TaskHandle, TestScheduler};
pub use crate::subject::{Subject, SubjectSubscription};
pub use crate::subscription::{Subscription, SubscriptionGuard};
pub use crate::timeline::Timeline;
pub use crate::view::{PassThroughView, View};
