//! Ready-made input → view → controller bundles.
//!
//! A decorator is what page code holds: it builds the whole chain for one
//! element and exposes `enable`/`disable` only. The chain is live as soon as
//! `create` returns. Both toggles are idempotent.
use std::rc::Rc;

use tracing::debug;

use crate::{
  controller::{
    ClickController, Controller, ElementDragController, PanController, PanOptions, StepZoomController,
    ZoomController, ZoomCurve, ZoomFocusController,
  },
  dom::Element,
  error::Result,
  event::{MouseButton, MouseEvent},
  geometry::{Point, ScreenTransform, Translate, ViewBox},
  input::{MouseClickInput, MouseDragInput, MouseWheelInput},
  model::{Model, MutableModel},
  scheduler::Scheduler,
  view::PassThroughView,
};

pub struct Decorator<C> {
  controller: C,
  name: &'static str,
}

impl<C: Controller> Decorator<C> {
  fn wrap(name: &'static str, controller: C) -> Self {
    debug!(decorator = name, "created");
    Decorator { controller, name }
  }

  /// Resume reacting to input.
  pub fn enable(&self) -> &Self {
    self.controller.enable();
    debug!(decorator = self.name, "enabled");
    self
  }

  /// Stop reacting to input. Timers the controller started are cancelled.
  pub fn disable(&self) -> &Self {
    self.controller.disable();
    debug!(decorator = self.name, "disabled");
    self
  }

  pub fn is_enabled(&self) -> bool { self.controller.is_enabled() }

  pub fn controller(&self) -> &C { &self.controller }
}

pub type DragView = PassThroughView<MouseDragInput>;
pub type WheelView = PassThroughView<MouseWheelInput>;
pub type ClickView = PassThroughView<MouseClickInput>;

/// Drag with `button` to move a [`Translate`] model, with inertia.
pub type PanDecorator<T, S> = Decorator<PanController<DragView, T, S>>;
/// Wheel to zoom about a point read from a model.
pub type ZoomDecorator<T, C> = Decorator<ZoomController<WheelView, T, C>>;
/// Wheel to zoom about the point under the pointer.
pub type ZoomFocusDecorator<T, C> = Decorator<ZoomFocusController<WheelView, T, C>>;
/// Wheel to grow or shrink a view box by a fixed step.
pub type StepZoomDecorator = Decorator<StepZoomController<WheelView>>;
/// Run a callback on click.
pub type ClickDecorator = Decorator<ClickController<ClickView>>;
/// Drag an absolutely positioned element.
pub type ElementDragDecorator = Decorator<ElementDragController<DragView>>;

impl<T: Translate + 'static, S: Scheduler> PanDecorator<T, S> {
  pub fn create(
    element: &Element, button: MouseButton, model: MutableModel<T>, scheduler: S, options: PanOptions,
  ) -> Result<Self> {
    let view = PassThroughView::new(MouseDragInput::new(element, button)?);
    Ok(Self::wrap("pan", PanController::new(view, model, scheduler, options)))
  }
}

impl<T: 'static, C: ZoomCurve<T> + 'static> ZoomDecorator<T, C> {
  pub fn create(element: &Element, model: MutableModel<T>, focus: Model<Point>, curve: C) -> Result<Self> {
    let view = PassThroughView::new(MouseWheelInput::new(element)?);
    Ok(Self::wrap("zoom", ZoomController::new(view, model, focus, curve)))
  }
}

impl<T: 'static, C: ZoomCurve<T> + 'static> ZoomFocusDecorator<T, C> {
  pub fn create(
    element: &Element, model: MutableModel<T>, transform: Rc<dyn ScreenTransform>, curve: C,
  ) -> Result<Self> {
    let view = PassThroughView::new(MouseWheelInput::new(element)?);
    Ok(Self::wrap("zoom focus", ZoomFocusController::new(view, model, transform, curve)))
  }
}

impl StepZoomDecorator {
  pub fn create(element: &Element, model: MutableModel<ViewBox>, step: f64) -> Result<Self> {
    let view = PassThroughView::new(MouseWheelInput::new(element)?);
    Ok(Self::wrap("step zoom", StepZoomController::new(view, model, step)))
  }
}

impl ClickDecorator {
  pub fn create(
    element: &Element, button: MouseButton, on_click: impl FnMut(&MouseEvent) + 'static,
  ) -> Result<Self> {
    let view = PassThroughView::new(MouseClickInput::new(element, button)?);
    Ok(Self::wrap("click", ClickController::new(view, on_click)))
  }
}

impl ElementDragDecorator {
  pub fn create(element: &Element, button: MouseButton) -> Result<Self> {
    let view = PassThroughView::new(MouseDragInput::new(element, button)?);
    Ok(Self::wrap("element drag", ElementDragController::new(view, element)))
  }
}

#[cfg(test)]
mod tests {
  use std::cell::Cell;

  use super::*;
  use crate::{
    compose::ViewBoxTransform,
    controller::{ExponentialZoom, PanDirection},
    dom::Document,
    geometry::ClientRect,
    error::Error,
    event::{DomEvent, WheelEvent},
    model::focus,
    scheduler::{Duration, TestScheduler},
  };

  #[choropleth_controls_macro::test]
  fn enable_and_disable_keep_their_meaning() {
    TestScheduler::init();
    let doc = Document::new();
    let svg = doc.create_element("svg");
    let model = MutableModel::new(ViewBox::new(0., 0., 1024., 1024.));
    let pan = PanDecorator::create(&svg, MouseButton::Left, model.clone(), TestScheduler, PanOptions {
      direction: PanDirection::Content,
      inertia: None,
      ..PanOptions::default()
    })
    .unwrap();
    assert!(pan.is_enabled());

    pan.disable().disable();
    svg.dispatch(&DomEvent::MouseDown(MouseEvent::left(0., 0.)));
    doc.dispatch(&DomEvent::MouseMove(MouseEvent::left(10., 0.)));
    assert_eq!(model.get().x, 0.);

    pan.enable().enable();
    svg.dispatch(&DomEvent::MouseDown(MouseEvent::left(0., 0.)));
    doc.dispatch(&DomEvent::MouseMove(MouseEvent::left(10., 0.)));
    assert_eq!(model.get().x, -10.);
  }

  #[choropleth_controls_macro::test]
  fn disabling_pan_stops_the_glide() {
    TestScheduler::init();
    let doc = Document::new();
    let svg = doc.create_element("svg");
    let model = MutableModel::new(ViewBox::new(0., 0., 100., 100.));
    let pan =
      PanDecorator::create(&svg, MouseButton::Left, model.clone(), TestScheduler, PanOptions::default())
        .unwrap();

    svg.dispatch(&DomEvent::MouseDown(MouseEvent::left(0., 0.)));
    doc.dispatch(&DomEvent::MouseMove(MouseEvent::left(10., 0.)));
    doc.dispatch(&DomEvent::MouseUp(MouseEvent::left(10., 0.)));
    pan.disable();
    TestScheduler::advance_by(Duration::from_millis(1000));
    assert_eq!(model.get().x, -10.);
  }

  #[choropleth_controls_macro::test]
  fn zoom_decorators_share_a_model() {
    let doc = Document::new();
    let svg = doc.create_element("svg");
    let model = MutableModel::new(ViewBox::new(0., 0., 100., 100.));
    let step = StepZoomDecorator::create(&svg, model.clone(), 20.).unwrap();
    let centre = focus(&model, ViewBox::center);
    let zoom = ZoomDecorator::create(&svg, model.clone(), centre, ExponentialZoom { base: 2., notch: 100. })
      .unwrap();

    zoom.disable();
    svg.dispatch(&DomEvent::Wheel(WheelEvent::vertical(100., 0., 0.)));
    assert_eq!(model.get(), ViewBox::new(-10., -10., 120., 120.));

    step.disable();
    zoom.enable();
    svg.dispatch(&DomEvent::Wheel(WheelEvent::vertical(100., 0., 0.)));
    assert_eq!(model.get(), ViewBox::new(-70., -70., 240., 240.));
  }

  #[choropleth_controls_macro::test]
  fn focus_zoom_keeps_the_point_under_the_pointer() {
    let doc = Document::new();
    let svg = doc.create_element("svg");
    svg.set_client_rect(ClientRect::new(0., 0., 100., 100.));
    let model = MutableModel::new(ViewBox::new(0., 0., 100., 100.));
    let transform = Rc::new(ViewBoxTransform::new(&svg, model.model()));
    let zoom = ZoomFocusDecorator::create(&svg, model.clone(), transform.clone(), ExponentialZoom {
      base: 2.,
      notch: 100.,
    })
    .unwrap();

    let pointer = Point::new(25., 75.);
    svg.dispatch(&DomEvent::Wheel(WheelEvent::vertical(-100., pointer.x, pointer.y)));
    assert_eq!(model.get(), ViewBox::new(12.5, 37.5, 50., 50.));
    assert_eq!(transform.to_content(pointer), Point::new(25., 75.));

    zoom.disable();
    svg.dispatch(&DomEvent::Wheel(WheelEvent::vertical(-100., 0., 0.)));
    assert_eq!(model.get().width, 50.);
  }

  #[choropleth_controls_macro::test]
  fn click_decorator_reports_clicks() {
    let doc = Document::new();
    let region = doc.create_element("region");
    let clicks = Rc::new(Cell::new(0));
    let c = clicks.clone();
    let click = ClickDecorator::create(&region, MouseButton::Left, move |_| c.set(c.get() + 1)).unwrap();
    region.dispatch(&DomEvent::Click(MouseEvent::left(0., 0.)));
    click.disable();
    region.dispatch(&DomEvent::Click(MouseEvent::left(0., 0.)));
    assert_eq!(clicks.get(), 1);
  }

  #[choropleth_controls_macro::test]
  fn element_drag_decorator_moves_the_element() {
    let doc = Document::new();
    let legend = doc.create_element("legend");
    let _drag = ElementDragDecorator::create(&legend, MouseButton::Left).unwrap();
    legend.dispatch(&DomEvent::MouseDown(MouseEvent::left(0., 0.)));
    doc.dispatch(&DomEvent::MouseMove(MouseEvent::left(4., 3.)));
    assert_eq!(legend.offset(), Point::new(4., 3.));
  }

  #[choropleth_controls_macro::test]
  fn creating_on_a_detached_element_fails() {
    let doc = Document::new();
    let svg = doc.create_element("svg");
    doc.remove_element("svg");
    let model = MutableModel::new(ViewBox::default());
    assert!(matches!(StepZoomDecorator::create(&svg, model, 20.), Err(Error::Detached { .. })));
  }
}
