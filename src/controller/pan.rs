use std::{
  cell::{Cell, RefCell},
  rc::{Rc, Weak},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::{Binding, Controller};
use crate::{
  event::Pointer,
  geometry::{Identity, Point, ScreenTransform, Translate},
  input::Handlers,
  model::MutableModel,
  scheduler::{Duration, Scheduler, TaskSlot},
  view::View,
};

/// What a drag moves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanDirection {
  /// The model follows the pointer: dragging right moves the target right.
  Camera,
  /// The content follows the pointer, so the window onto it moves the
  /// other way.
  #[default]
  Content,
}

impl PanDirection {
  fn orient(self, delta: Point) -> Point {
    match self {
      PanDirection::Camera => delta,
      PanDirection::Content => -delta,
    }
  }
}

/// Timing of the glide that follows a released drag.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InertiaConfig {
  /// How long the glide lasts.
  pub duration: Duration,
  /// Time between two glide steps.
  pub interval: Duration,
  /// Holding the pointer still this long before release cancels the glide.
  pub hold_threshold: Duration,
}

impl Default for InertiaConfig {
  fn default() -> Self {
    Self {
      duration: Duration::from_millis(1000),
      interval: Duration::from_millis(30),
      hold_threshold: Duration::from_millis(10),
    }
  }
}

/// `t` in `[0, 1]`, slow at both ends.
pub fn ease_in_out_cubic(t: f64) -> f64 {
  if t < 0.5 { 4. * t * t * t } else { (t - 1.) * (2. * t - 2.) * (2. * t - 2.) + 1. }
}

#[derive(Clone)]
pub struct PanOptions {
  pub direction: PanDirection,
  /// `None` stops the model as soon as the pointer is released.
  pub inertia: Option<InertiaConfig>,
  pub transform: Rc<dyn ScreenTransform>,
}

impl Default for PanOptions {
  fn default() -> Self {
    Self { direction: PanDirection::default(), inertia: Some(InertiaConfig::default()), transform: Rc::new(Identity) }
  }
}

struct PanState<T, S> {
  model: MutableModel<T>,
  scheduler: S,
  options: PanOptions,
  previous: Cell<Option<Point>>,
  delta: Cell<Point>,
  decay: RefCell<TaskSlot>,
  hold: RefCell<TaskSlot>,
}

impl<T: Translate + 'static, S: Scheduler> PanState<T, S> {
  fn client(pointers: &[Pointer]) -> Option<Point> { pointers.first().map(Pointer::client) }

  fn cancel_timers(&self) {
    self.decay.borrow_mut().cancel();
    self.hold.borrow_mut().cancel();
  }

  fn down(&self, pointers: &[Pointer]) {
    self.cancel_timers();
    self.previous.set(Self::client(pointers));
    self.delta.set(Point::ZERO);
    debug!("pan started");
  }

  fn moved(self: &Rc<Self>, pointers: &[Pointer]) {
    let (Some(previous), Some(current)) = (self.previous.get(), Self::client(pointers)) else {
      return;
    };
    // Both ends go through the transform as it is now: the model this
    // controller moves may be what the transform depends on.
    let transform = &self.options.transform;
    let moved = transform.to_content(current) - transform.to_content(previous);
    let delta = self.options.direction.orient(moved);
    trace!(dx = delta.x, dy = delta.y, "pan move");
    self.model.apply(move |target| target.translate(delta));
    self.previous.set(Some(current));
    self.delta.set(delta);

    if let Some(inertia) = self.options.inertia {
      let weak = Rc::downgrade(self);
      let handle = self.scheduler.timeout(inertia.hold_threshold, move || {
        if let Some(state) = weak.upgrade() {
          trace!("pointer held still, glide dropped");
          state.delta.set(Point::ZERO);
        }
      });
      self.hold.borrow_mut().arm(handle);
    }
  }

  fn up(self: &Rc<Self>) {
    self.hold.borrow_mut().cancel();
    self.previous.set(None);
    let delta = self.delta.replace(Point::ZERO);
    match self.options.inertia {
      Some(inertia) if !delta.is_zero() => self.glide(delta, inertia),
      _ => debug!("pan ended"),
    }
  }

  /// Keep applying `delta`, scaled down along the easing curve, until
  /// `inertia.duration` has passed.
  fn glide(self: &Rc<Self>, delta: Point, inertia: InertiaConfig) {
    debug!(dx = delta.x, dy = delta.y, "pan released, gliding");
    let start = self.scheduler.now();
    let duration = inertia.duration.as_secs_f64();
    let weak: Weak<Self> = Rc::downgrade(self);
    let handle = self.scheduler.interval(inertia.interval, move || {
      let Some(state) = weak.upgrade() else { return false };
      let elapsed = (state.scheduler.now() - start).as_secs_f64();
      if elapsed >= duration {
        trace!("glide finished");
        return false;
      }
      let factor = ease_in_out_cubic((duration - elapsed) / duration);
      let step = delta * factor;
      state.model.apply(move |target| target.translate(step));
      true
    });
    self.decay.borrow_mut().arm(handle);
  }
}

/// Moves a [`Translate`] model along with a drag, then lets it glide.
///
/// On `down` any running glide stops. Each `move` shifts the model by the
/// pointer movement since the previous event. On `up` the last movement
/// keeps being applied every `interval`, shrinking along
/// [`ease_in_out_cubic`] of the remaining time, unless the pointer was held
/// still for `hold_threshold` before release.
pub struct PanController<V, T, S> {
  binding: Binding<V>,
  state: Rc<PanState<T, S>>,
}

impl<V, T, S> PanController<V, T, S>
where
  V: View<Event = [Pointer]>,
  T: Translate + 'static,
  S: Scheduler,
{
  /// The controller starts enabled.
  pub fn new(view: V, model: MutableModel<T>, scheduler: S, options: PanOptions) -> Self {
    let controller = PanController {
      binding: Binding::new(view),
      state: Rc::new(PanState {
        model,
        scheduler,
        options,
        previous: Cell::new(None),
        delta: Cell::new(Point::ZERO),
        decay: RefCell::default(),
        hold: RefCell::default(),
      }),
    };
    controller.enable();
    controller
  }

  pub fn view(&self) -> &V { self.binding.view() }

  pub fn model(&self) -> &MutableModel<T> { &self.state.model }

  /// True while the model is still gliding after a release.
  pub fn is_gliding(&self) -> bool { self.state.decay.borrow().is_pending() }
}

impl<V, T, S> Controller for PanController<V, T, S>
where
  V: View<Event = [Pointer]>,
  T: Translate + 'static,
  S: Scheduler,
{
  fn enable(&self) {
    let (down, moved, up) =
      (Rc::downgrade(&self.state), Rc::downgrade(&self.state), Rc::downgrade(&self.state));
    self.binding.bind(
      Handlers::new()
        .on_down(move |p: &[Pointer]| {
          if let Some(state) = down.upgrade() {
            state.down(p)
          }
        })
        .on_move(move |p: &[Pointer]| {
          if let Some(state) = moved.upgrade() {
            state.moved(p)
          }
        })
        .on_up(move |_: &[Pointer]| {
          if let Some(state) = up.upgrade() {
            state.up()
          }
        }),
    );
    debug!(direction = ?self.state.options.direction, "pan controller enabled");
  }

  fn disable(&self) {
    self.binding.unbind();
    self.state.cancel_timers();
    self.state.previous.set(None);
  }

  fn is_enabled(&self) -> bool { self.binding.is_bound() }
}

impl<V, T, S> Drop for PanController<V, T, S> {
  fn drop(&mut self) {
    self.state.decay.borrow_mut().cancel();
    self.state.hold.borrow_mut().cancel();
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use float_cmp::approx_eq;

  use super::*;
  use crate::{
    dom::{Document, Element},
    event::{DomEvent, MouseButton, MouseEvent},
    geometry::{Camera, ViewBox},
    input::MouseDragInput,
    scheduler::TestScheduler,
    view::PassThroughView,
  };

  type DragView = PassThroughView<MouseDragInput>;

  fn surface() -> (Document, Element, DragView) {
    let doc = Document::new();
    let svg = doc.create_element("svg");
    let view = PassThroughView::new(MouseDragInput::new(&svg, MouseButton::Left).unwrap());
    (doc, svg, view)
  }

  fn no_inertia(direction: PanDirection) -> PanOptions {
    PanOptions { direction, inertia: None, ..PanOptions::default() }
  }

  fn drag(svg: &Element, doc: &Document, from: (f64, f64), to: (f64, f64)) {
    svg.dispatch(&DomEvent::MouseDown(MouseEvent::left(from.0, from.1)));
    doc.dispatch(&DomEvent::MouseMove(MouseEvent::left(to.0, to.1)));
  }

  #[choropleth_controls_macro::test]
  fn dragging_moves_the_camera_with_the_pointer() {
    TestScheduler::init();
    let (doc, svg, view) = surface();
    let model = MutableModel::new(Camera::default());
    let _pan = PanController::new(view, model.clone(), TestScheduler, no_inertia(PanDirection::Camera));

    drag(&svg, &doc, (10., 10.), (15., 12.));
    let camera = model.get();
    assert_eq!((camera.eye.x, camera.eye.y), (5., 2.));
    assert_eq!((camera.look.x, camera.look.y), (5., 2.));
  }

  #[choropleth_controls_macro::test]
  fn dragging_content_moves_the_view_box_the_other_way() {
    TestScheduler::init();
    let (doc, svg, view) = surface();
    let model = MutableModel::new(ViewBox::new(0., 0., 100., 100.));
    let _pan = PanController::new(view, model.clone(), TestScheduler, no_inertia(PanDirection::Content));

    drag(&svg, &doc, (10., 10.), (15., 12.));
    assert_eq!(model.get(), ViewBox::new(-5., -2., 100., 100.));
    doc.dispatch(&DomEvent::MouseUp(MouseEvent::left(15., 12.)));
    assert!(TestScheduler::is_empty());
  }

  #[choropleth_controls_macro::test]
  fn glide_shrinks_strictly_and_stops_after_the_duration() {
    TestScheduler::init();
    let (doc, svg, view) = surface();
    let model = MutableModel::new(Point::ZERO);
    let pan = PanController::new(view, model.clone(), TestScheduler, PanOptions {
      direction: PanDirection::Camera,
      ..PanOptions::default()
    });

    drag(&svg, &doc, (0., 0.), (10., 0.));
    doc.dispatch(&DomEvent::MouseUp(MouseEvent::left(10., 0.)));

    let steps = Rc::new(RefCell::new(Vec::new()));
    let last = Rc::new(Cell::new(model.get().x));
    let (s, l) = (steps.clone(), last.clone());
    let _sub = model.subscribe(move |p: &Point| {
      s.borrow_mut().push(p.x - l.get());
      l.set(p.x);
    });

    TestScheduler::advance_by(Duration::from_millis(1000));
    {
      let steps = steps.borrow();
      assert_eq!(steps.len(), 33);
      assert!(steps.windows(2).all(|w| w[1] < w[0]));
      assert!(steps.iter().all(|s| *s > 0.));
      assert!(approx_eq!(f64, steps[0], 10. * ease_in_out_cubic(0.97), epsilon = 1e-9));
    }

    TestScheduler::advance_by(Duration::from_millis(500));
    assert_eq!(steps.borrow().len(), 33);
    assert!(!pan.is_gliding());
  }

  #[choropleth_controls_macro::test]
  fn a_new_drag_cancels_the_glide() {
    TestScheduler::init();
    let (doc, svg, view) = surface();
    let model = MutableModel::new(Point::ZERO);
    let pan = PanController::new(view, model.clone(), TestScheduler, PanOptions {
      direction: PanDirection::Camera,
      ..PanOptions::default()
    });

    drag(&svg, &doc, (0., 0.), (10., 0.));
    doc.dispatch(&DomEvent::MouseUp(MouseEvent::left(10., 0.)));
    TestScheduler::advance_by(Duration::from_millis(100));
    assert!(pan.is_gliding());

    svg.dispatch(&DomEvent::MouseDown(MouseEvent::left(10., 0.)));
    assert!(!pan.is_gliding());
    let settled = model.get();
    TestScheduler::advance_by(Duration::from_millis(2000));
    assert_eq!(model.get(), settled);
  }

  #[choropleth_controls_macro::test]
  fn holding_still_before_release_drops_the_glide() {
    TestScheduler::init();
    let (doc, svg, view) = surface();
    let model = MutableModel::new(Point::ZERO);
    let pan = PanController::new(view, model.clone(), TestScheduler, PanOptions {
      direction: PanDirection::Camera,
      ..PanOptions::default()
    });

    drag(&svg, &doc, (0., 0.), (10., 0.));
    TestScheduler::advance_by(Duration::from_millis(20));
    doc.dispatch(&DomEvent::MouseUp(MouseEvent::left(10., 0.)));

    assert!(!pan.is_gliding());
    TestScheduler::advance_by(Duration::from_millis(1000));
    assert_eq!(model.get(), Point::new(10., 0.));
  }

  #[choropleth_controls_macro::test]
  fn disable_stops_panning_and_gliding() {
    TestScheduler::init();
    let (doc, svg, view) = surface();
    let model = MutableModel::new(Point::ZERO);
    let pan = PanController::new(view, model.clone(), TestScheduler, PanOptions {
      direction: PanDirection::Camera,
      ..PanOptions::default()
    });

    drag(&svg, &doc, (0., 0.), (10., 0.));
    doc.dispatch(&DomEvent::MouseUp(MouseEvent::left(10., 0.)));
    pan.disable();
    pan.disable();
    assert!(!pan.is_enabled());
    TestScheduler::advance_by(Duration::from_millis(1000));
    drag(&svg, &doc, (0., 0.), (50., 0.));
    assert_eq!(model.get(), Point::new(10., 0.));

    pan.enable();
    pan.enable();
    drag(&svg, &doc, (0., 0.), (5., 0.));
    assert_eq!(model.get(), Point::new(15., 0.));
  }

  #[choropleth_controls_macro::test]
  fn zero_interval_glide_still_ends() {
    TestScheduler::init();
    let (doc, svg, view) = surface();
    let model = MutableModel::new(Point::ZERO);
    let inertia = InertiaConfig { interval: Duration::ZERO, ..InertiaConfig::default() };
    let pan = PanController::new(view, model.clone(), TestScheduler, PanOptions {
      direction: PanDirection::Camera,
      inertia: Some(inertia),
      ..PanOptions::default()
    });

    drag(&svg, &doc, (0., 0.), (10., 0.));
    doc.dispatch(&DomEvent::MouseUp(MouseEvent::left(10., 0.)));
    TestScheduler::advance_by(Duration::from_millis(1));
    assert!(model.get().x > 10.);
    TestScheduler::advance_by(Duration::from_millis(1000));
    assert!(!pan.is_gliding());
    assert!(TestScheduler::is_empty());
  }

  #[choropleth_controls_macro::test]
  fn easing_runs_from_zero_to_one() {
    assert_eq!(ease_in_out_cubic(0.), 0.);
    assert_eq!(ease_in_out_cubic(1.), 1.);
    assert!(approx_eq!(f64, ease_in_out_cubic(0.5), 0.5));
    assert!(approx_eq!(f64, ease_in_out_cubic(0.25), 0.0625));
  }
}
