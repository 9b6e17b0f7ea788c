//! Wiring of the map page.
//!
//! [`MapControls::install`] builds the whole graph for one SVG element
//! explicitly: the view box model, pan and zoom decorators driving it, and
//! the renderer writing it back to the element's `viewBox` attribute.
//! Nothing is global; dropping the returned value tears everything down.
use std::rc::Rc;

use tracing::{debug, info};

use crate::{
  config::{Settings, ZoomMode},
  controller::{ExponentialZoom, PanOptions},
  decorator::{PanDecorator, StepZoomDecorator, ZoomFocusDecorator},
  dom::{Document, Element},
  error::Result,
  geometry::{Point, ScreenTransform, ViewBox},
  model::{Model, MutableModel},
  scheduler::Scheduler,
  subject::SubjectSubscription,
  subscription::SubscriptionGuard,
};

/// Write `model` into the `viewBox` attribute of `element`, now and after
/// every change.
pub fn render_view_box(element: &Element, model: &MutableModel<ViewBox>) -> SubjectSubscription<ViewBox> {
  model.with(|vb| element.set_attribute("viewBox", vb.to_string()));
  let element = element.clone();
  model.subscribe(move |vb| element.set_attribute("viewBox", vb.to_string()))
}

/// Client positions to user units of an SVG element, through its current
/// view box and layout box. The browser equivalent is
/// `getScreenCTM().inverse()`, read again at every event.
pub struct ViewBoxTransform {
  element: Element,
  view_box: Model<ViewBox>,
}

impl ViewBoxTransform {
  pub fn new(element: &Element, view_box: Model<ViewBox>) -> Self {
    Self { element: element.clone(), view_box }
  }
}

impl ScreenTransform for ViewBoxTransform {
  fn to_content(&self, client: Point) -> Point {
    self.view_box.with(|vb| vb.client_to_user(self.element.client_rect(), client))
  }
}

pub enum ZoomControls {
  Step(StepZoomDecorator),
  Exponential(ZoomFocusDecorator<ViewBox, ExponentialZoom>),
}

impl ZoomControls {
  pub fn enable(&self) {
    match self {
      ZoomControls::Step(d) => {
        d.enable();
      }
      ZoomControls::Exponential(d) => {
        d.enable();
      }
    }
  }

  pub fn disable(&self) {
    match self {
      ZoomControls::Step(d) => {
        d.disable();
      }
      ZoomControls::Exponential(d) => {
        d.disable();
      }
    }
  }

  pub fn is_enabled(&self) -> bool {
    match self {
      ZoomControls::Step(d) => d.is_enabled(),
      ZoomControls::Exponential(d) => d.is_enabled(),
    }
  }
}

/// Pan and zoom controls attached to the map's SVG element.
pub struct MapControls<S> {
  svg: Element,
  view_box: MutableModel<ViewBox>,
  initial: ViewBox,
  pan: PanDecorator<ViewBox, S>,
  zoom: ZoomControls,
  _render: SubscriptionGuard<SubjectSubscription<ViewBox>>,
}

impl<S: Scheduler> MapControls<S> {
  /// Fails with [`Error::ElementNotFound`](crate::error::Error) when
  /// `svg_id` names no element of `document`.
  pub fn install(document: &Document, svg_id: &str, settings: &Settings, scheduler: S) -> Result<Self> {
    let svg = document.element(svg_id)?;
    let view_box = MutableModel::new(settings.initial_view_box);
    let transform: Rc<dyn ScreenTransform> =
      Rc::new(ViewBoxTransform::new(&svg, view_box.model()));

    let options = PanOptions {
      direction: settings.pan.direction,
      inertia: settings.pan.inertia.map(Into::into),
      transform: transform.clone(),
    };
    let pan = PanDecorator::create(&svg, settings.pan.button, view_box.clone(), scheduler, options)?;

    let zoom = match settings.zoom.mode {
      ZoomMode::Step => ZoomControls::Step(StepZoomDecorator::create(&svg, view_box.clone(), settings.zoom.step)?),
      ZoomMode::Exponential => ZoomControls::Exponential(ZoomFocusDecorator::create(
        &svg,
        view_box.clone(),
        transform,
        settings.zoom.curve(),
      )?),
    };

    let render = SubscriptionGuard::new(render_view_box(&svg, &view_box));
    info!(svg = svg_id, zoom = ?settings.zoom.mode, "map controls installed");
    Ok(MapControls { svg, view_box, initial: settings.initial_view_box, pan, zoom, _render: render })
  }

  pub fn element(&self) -> &Element { &self.svg }

  pub fn view_box(&self) -> &MutableModel<ViewBox> { &self.view_box }

  pub fn pan(&self) -> &PanDecorator<ViewBox, S> { &self.pan }

  pub fn zoom(&self) -> &ZoomControls { &self.zoom }

  pub fn enable(&self) {
    self.pan.enable();
    self.zoom.enable();
  }

  pub fn disable(&self) {
    self.pan.disable();
    self.zoom.disable();
  }

  /// Go back to the initial view box.
  pub fn reset(&self) {
    let initial = self.initial;
    debug!(%initial, "view box reset");
    self.view_box.apply(move |vb| *vb = initial);
  }
}
