use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::{Binding, Controller};
use crate::{
  event::WheelEvent,
  geometry::{Point, Scale, ScreenTransform, ViewBox},
  input::Handlers,
  model::{Model, MutableModel},
  view::View,
};

/// The zoom policy: given the current value, a focal point and a signed
/// wheel delta, produce the zoomed value.
pub trait ZoomCurve<T> {
  fn zoom(&self, current: &T, focus: Point, delta: f64) -> T;
}

impl<T, F: Fn(&T, Point, f64) -> T> ZoomCurve<T> for F {
  #[inline]
  fn zoom(&self, current: &T, focus: Point, delta: f64) -> T { self(current, focus, delta) }
}

/// Scales by `base` per wheel notch of `notch` delta units, about the focus.
/// A positive delta zooms out.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExponentialZoom {
  pub base: f64,
  pub notch: f64,
}

impl Default for ExponentialZoom {
  fn default() -> Self { Self { base: 1.1, notch: 100. } }
}

impl ExponentialZoom {
  pub fn factor(&self, delta: f64) -> f64 { self.base.powf(delta / self.notch) }
}

impl<T: Scale + Clone> ZoomCurve<T> for ExponentialZoom {
  fn zoom(&self, current: &T, focus: Point, delta: f64) -> T {
    let mut next = current.clone();
    next.scale_about(focus, self.factor(delta));
    next
  }
}

/// Where a wheel zoom is centred.
trait FocusSource {
  fn focus(&self, event: &WheelEvent) -> Point;
}

struct FromModel(Model<Point>);

impl FocusSource for FromModel {
  fn focus(&self, _: &WheelEvent) -> Point { self.0.get() }
}

struct FromPointer(Rc<dyn ScreenTransform>);

impl FocusSource for FromPointer {
  fn focus(&self, event: &WheelEvent) -> Point { self.0.to_content(event.client()) }
}

struct ZoomState<T, C, F> {
  model: MutableModel<T>,
  curve: C,
  focus: F,
}

impl<T: 'static, C: ZoomCurve<T>, F: FocusSource> ZoomState<T, C, F> {
  fn delta(&self, event: &WheelEvent) {
    let focus = self.focus.focus(event);
    trace!(delta = event.delta_y, fx = focus.x, fy = focus.y, "zoom");
    let next = self.model.with(|value| self.curve.zoom(value, focus, event.delta_y));
    self.model.apply(move |value| *value = next);
  }
}

fn bind_zoom<V, T, C, F>(binding: &Binding<V>, state: &Rc<ZoomState<T, C, F>>)
where
  V: View<Event = WheelEvent>,
  T: 'static,
  C: ZoomCurve<T> + 'static,
  F: FocusSource + 'static,
{
  let weak = Rc::downgrade(state);
  binding.bind(Handlers::new().on_delta(move |e: &WheelEvent| {
    if let Some(state) = weak.upgrade() {
      state.delta(e)
    }
  }));
}

/// Zooms about a point read from a model when the wheel turns, typically
/// the centre of the view.
pub struct ZoomController<V, T, C> {
  binding: Binding<V>,
  state: Rc<ZoomState<T, C, FromModel>>,
}

impl<V, T, C> ZoomController<V, T, C>
where
  V: View<Event = WheelEvent>,
  T: 'static,
  C: ZoomCurve<T> + 'static,
{
  /// The controller starts enabled.
  pub fn new(view: V, model: MutableModel<T>, focus: Model<Point>, curve: C) -> Self {
    let controller = ZoomController {
      binding: Binding::new(view),
      state: Rc::new(ZoomState { model, curve, focus: FromModel(focus) }),
    };
    controller.enable();
    controller
  }

  pub fn view(&self) -> &V { self.binding.view() }
}

impl<V, T, C> Controller for ZoomController<V, T, C>
where
  V: View<Event = WheelEvent>,
  T: 'static,
  C: ZoomCurve<T> + 'static,
{
  fn enable(&self) {
    bind_zoom(&self.binding, &self.state);
    debug!("zoom controller enabled");
  }

  fn disable(&self) { self.binding.unbind() }

  fn is_enabled(&self) -> bool { self.binding.is_bound() }
}

/// Zooms about the content point under the pointer.
pub struct ZoomFocusController<V, T, C> {
  binding: Binding<V>,
  state: Rc<ZoomState<T, C, FromPointer>>,
}

impl<V, T, C> ZoomFocusController<V, T, C>
where
  V: View<Event = WheelEvent>,
  T: 'static,
  C: ZoomCurve<T> + 'static,
{
  /// `transform` maps the wheel event's client position into the model's
  /// coordinate space. The controller starts enabled.
  pub fn new(view: V, model: MutableModel<T>, transform: Rc<dyn ScreenTransform>, curve: C) -> Self {
    let controller = ZoomFocusController {
      binding: Binding::new(view),
      state: Rc::new(ZoomState { model, curve, focus: FromPointer(transform) }),
    };
    controller.enable();
    controller
  }

  pub fn view(&self) -> &V { self.binding.view() }
}

impl<V, T, C> Controller for ZoomFocusController<V, T, C>
where
  V: View<Event = WheelEvent>,
  T: 'static,
  C: ZoomCurve<T> + 'static,
{
  fn enable(&self) {
    bind_zoom(&self.binding, &self.state);
    debug!("zoom focus controller enabled");
  }

  fn disable(&self) { self.binding.unbind() }

  fn is_enabled(&self) -> bool { self.binding.is_bound() }
}

/// Grows or shrinks a view box by a fixed step per wheel event, keeping its
/// centre. Only the sign of the delta matters; a zero delta does nothing.
pub struct StepZoomController<V> {
  binding: Binding<V>,
  model: MutableModel<ViewBox>,
  step: f64,
}

/// View box units added or removed per wheel event.
pub const DEFAULT_ZOOM_STEP: f64 = 20.;

impl<V: View<Event = WheelEvent>> StepZoomController<V> {
  /// The controller starts enabled.
  pub fn new(view: V, model: MutableModel<ViewBox>, step: f64) -> Self {
    let controller = StepZoomController { binding: Binding::new(view), model, step };
    controller.enable();
    controller
  }

  pub fn view(&self) -> &V { self.binding.view() }
}

fn step_zoom(view_box: &mut ViewBox, delta: f64, step: f64) {
  let d = delta.signum() * step;
  view_box.x -= d / 2.;
  view_box.y -= d / 2.;
  view_box.width += d;
  view_box.height += d;
}

impl<V: View<Event = WheelEvent>> Controller for StepZoomController<V> {
  fn enable(&self) {
    let model = self.model.clone();
    let step = self.step;
    self.binding.bind(Handlers::new().on_delta(move |e: &WheelEvent| {
      if e.delta_y == 0. {
        return;
      }
      let delta = e.delta_y;
      trace!(delta, step, "step zoom");
      model.apply(move |vb| step_zoom(vb, delta, step));
    }));
    debug!(step = self.step, "step zoom controller enabled");
  }

  fn disable(&self) { self.binding.unbind() }

  fn is_enabled(&self) -> bool { self.binding.is_bound() }
}
