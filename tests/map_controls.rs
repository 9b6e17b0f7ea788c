//! End-to-end tests of the map page wiring.
//!
//! Events go in through the document, come out as `viewBox` attribute
//! writes, region fills and element offsets.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use choropleth_controls::prelude::*;

fn init_tracing() {
  let _ = tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_test_writer()
    .try_init();
}

fn view_box(svg: &Element) -> ViewBox {
  let attr = svg.attribute("viewBox").unwrap_or_default();
  let v: Vec<f64> = attr.split(' ').map(|n| n.parse().unwrap()).collect();
  ViewBox::new(v[0], v[1], v[2], v[3])
}

fn touches(points: &[(f64, f64)]) -> TouchEvent {
  TouchEvent {
    touches: points
      .iter()
      .enumerate()
      .map(|(i, &(client_x, client_y))| Touch { identifier: i as i64, client_x, client_y })
      .collect(),
  }
}

#[choropleth_controls_macro::test]
fn drag_glides_then_settles() {
  init_tracing();
  TestScheduler::init();
  let doc = Document::new();
  let svg = doc.create_element("map");
  let _controls = MapControls::install(&doc, "map", &Settings::default(), TestScheduler).unwrap();

  svg.dispatch(&DomEvent::MouseDown(MouseEvent::left(100., 100.)));
  doc.dispatch(&DomEvent::MouseMove(MouseEvent::left(90., 100.)));
  doc.dispatch(&DomEvent::MouseUp(MouseEvent::left(90., 100.)));
  assert_eq!(view_box(&svg).x, 10.);

  let mut xs = vec![view_box(&svg).x];
  for _ in 0..40 {
    TestScheduler::advance_by(Duration::from_millis(30));
    xs.push(view_box(&svg).x);
  }
  // Moves right with shrinking steps, then stops.
  assert!(xs.windows(2).all(|w| w[1] >= w[0]));
  let settled = *xs.last().unwrap();
  assert!((settled - 171.665).abs() < 0.01, "settled at {settled}");
  assert!(TestScheduler::is_empty());
}

#[choropleth_controls_macro::test]
fn settings_switch_to_exponential_zoom() {
  init_tracing();
  TestScheduler::init();
  let doc = Document::new();
  let svg = doc.create_element("map");
  svg.set_client_rect(ClientRect::new(0., 0., 1024., 1024.));
  let settings = Settings::from_json(
    r#"{ "zoom": { "mode": "exponential", "base": 2, "notch": 100 }, "pan": { "inertia": null } }"#,
  )
  .unwrap();
  let _controls = MapControls::install(&doc, "map", &settings, TestScheduler).unwrap();

  // Zoom in about the pointer, in the middle of the map.
  svg.dispatch(&DomEvent::Wheel(WheelEvent::vertical(-100., 512., 512.)));
  assert_eq!(view_box(&svg), ViewBox::new(256., 256., 512., 512.));

  // At half the width a 6px drag is 3 user units.
  svg.dispatch(&DomEvent::MouseDown(MouseEvent::left(0., 0.)));
  doc.dispatch(&DomEvent::MouseMove(MouseEvent::left(-6., 0.)));
  doc.dispatch(&DomEvent::MouseUp(MouseEvent::left(-6., 0.)));
  assert!(TestScheduler::is_empty());
  assert_eq!(view_box(&svg), ViewBox::new(259., 256., 512., 512.));

  // Zooming at the top left corner keeps that corner in place.
  svg.dispatch(&DomEvent::Wheel(WheelEvent::vertical(-100., 0., 0.)));
  assert_eq!(view_box(&svg), ViewBox::new(259., 256., 256., 256.));
}

#[choropleth_controls_macro::test]
fn zero_interval_settings_are_refused() {
  let settings = Settings::from_json(r#"{ "pan": { "inertia": { "interval_ms": 0 } } }"#);
  assert!(matches!(settings, Err(Error::Config(_))));
}

#[choropleth_controls_macro::test]
fn one_finger_pans_a_camera() {
  TestScheduler::init();
  let doc = Document::new();
  let canvas = doc.create_element("globe");
  let camera = MutableModel::new(Camera::default());
  let view = PassThroughView::new(TouchDragInput::new(&canvas, 1).unwrap());
  let options = PanOptions { direction: PanDirection::Camera, inertia: None, ..PanOptions::default() };
  let _pan = PanController::new(view, camera.clone(), TestScheduler, options);

  canvas.dispatch(&DomEvent::TouchStart(touches(&[(10., 10.)])));
  doc.dispatch(&DomEvent::TouchMove(touches(&[(15., 12.)])));
  doc.dispatch(&DomEvent::TouchEnd(touches(&[])));

  let eye = camera.get().eye;
  assert_eq!((eye.x, eye.y, eye.z), (5., 2., 1.));

  // Two fingers are not a pan.
  canvas.dispatch(&DomEvent::TouchStart(touches(&[(0., 0.), (1., 1.)])));
  doc.dispatch(&DomEvent::TouchMove(touches(&[(50., 50.), (51., 51.)])));
  assert_eq!(camera.get().eye.x, 5.);
}

#[choropleth_controls_macro::test]
fn timeline_drives_region_colours() {
  TestScheduler::init();
  let doc = Document::new();
  let regions = ["06", "13", "83"].map(|id| doc.create_element(id));
  let heat: Vec<HashMap<&str, f64>> = vec![
    HashMap::from([("06", 0.1), ("13", 0.2)]),
    HashMap::from([("06", 0.3), ("83", 0.4)]),
    HashMap::from([("13", 0.5)]),
  ];

  let timeline = Timeline::new(heat.len() - 1, Duration::from_millis(30), TestScheduler);
  let c_doc = doc.clone();
  let _colouring = timeline.subscribe(move |&day| {
    for (id, value) in &heat[day] {
      if let Ok(region) = c_doc.element(id) {
        region.set_attribute("data-heat", value.to_string());
      }
    }
  });

  timeline.refresh();
  timeline.toggle_play();
  TestScheduler::advance_by(Duration::from_millis(100));

  let fills: Vec<_> = regions.iter().map(|r| r.attribute("data-heat")).collect();
  assert_eq!(fills, [Some("0.3".to_owned()), Some("0.5".to_owned()), Some("0.4".to_owned())]);
  assert!(!timeline.is_playing());
}

#[choropleth_controls_macro::test]
fn derived_models_follow_the_view_box() {
  let model = MutableModel::new(ViewBox::new(0., 0., 100., 50.));
  let other = MutableModel::new(ViewBox::new(0., 0., 10., 10.));
  let ratio = focus(&model, |vb: &ViewBox| vb.width / vb.height);
  let both = watch_all(&[model.model(), other.model()]);

  let seen = Rc::new(RefCell::new(Vec::new()));
  let s = seen.clone();
  let _ratio_sub = ratio.subscribe(move |r| s.borrow_mut().push(*r));
  let widths = Rc::new(RefCell::new(Vec::new()));
  let w = widths.clone();
  let _both_sub = both.subscribe(move |all: &Vec<ViewBox>| w.borrow_mut().push(all[0].width + all[1].width));

  model.apply(|vb| vb.height = 100.);
  other.apply(|vb| vb.width = 20.);
  ratio.disconnect();
  model.apply(|vb| vb.width = 200.);

  assert_eq!(*seen.borrow(), vec![1.]);
  assert_eq!(*widths.borrow(), vec![110., 120., 220.]);
}

#[cfg(all(not(target_arch = "wasm32"), feature = "timer"))]
#[choropleth_controls_macro::test]
fn local_scheduler_runs_the_glide_in_real_time() {
  use futures::executor::LocalPool;

  let mut pool = LocalPool::new();
  let scheduler = LocalScheduler::new(pool.spawner());
  let doc = Document::new();
  let svg = doc.create_element("map");
  let model = MutableModel::new(Point::ZERO);
  let view = PassThroughView::new(MouseDragInput::new(&svg, MouseButton::Left).unwrap());
  let inertia = InertiaConfig {
    duration: Duration::from_millis(60),
    interval: Duration::from_millis(5),
    hold_threshold: Duration::from_millis(1000),
  };
  let options = PanOptions { direction: PanDirection::Camera, inertia: Some(inertia), ..PanOptions::default() };
  let _pan = PanController::new(view, model.clone(), scheduler, options);

  svg.dispatch(&DomEvent::MouseDown(MouseEvent::left(0., 0.)));
  doc.dispatch(&DomEvent::MouseMove(MouseEvent::left(4., 0.)));
  doc.dispatch(&DomEvent::MouseUp(MouseEvent::left(4., 0.)));
  pool.run();

  assert!(model.get().x > 4.);
}
