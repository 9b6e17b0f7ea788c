//! # choropleth-controls: pan and zoom for an SVG map
//!
//! The interaction layer of a choropleth map page. Raw pointer, wheel, touch
//! and click events go in; mutations of an observable view box (or camera)
//! come out, with an eased glide after a released drag.
//!
//! ## Quick Start
//!
//! ```rust
//! use choropleth_controls::prelude::*;
//!
//! TestScheduler::init();
//! let document = Document::new();
//! let svg = document.create_element("map");
//! let controls = MapControls::install(&document, "map", &Settings::default(), TestScheduler)?;
//!
//! svg.dispatch(&DomEvent::Wheel(WheelEvent::vertical(120., 0., 0.)));
//! assert_eq!(svg.attribute("viewBox").as_deref(), Some("-10 -10 1044 1044"));
//! assert_eq!(controls.view_box().get().width, 1044.);
//! # Ok::<(), choropleth_controls::error::Error>(())
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Subject`] | Publish-only multicast of values to callbacks |
//! | [`Input`] | Native events adapted to `down`/`move`/`up`/`delta`/`click` |
//! | [`View`] | Relay between an input and a controller |
//! | [`Controller`] | Turns view events into model mutations |
//! | [`MutableModel`] | An observable value mutated in place |
//! | [`Decorator`] | Input, view and controller bundled behind `enable`/`disable` |
//! | [`Scheduler`] | Cancellable timers for the glide and the timeline |
//!
//! Everything is single threaded: values are shared with `Rc` and
//! `RefCell`, and timers run later on the same thread.
//!
//! ## Feature Flags
//!
//! - **`timer`** (default): [`LocalScheduler`], a real-time scheduler on a
//!   `futures` local executor. On wasm32 the browser event loop is used and
//!   the scheduler is always available.
//!
//! [`Subject`]: subject::Subject
//! [`Input`]: input::Input
//! [`View`]: view::View
//! [`Controller`]: controller::Controller
//! [`MutableModel`]: model::MutableModel
//! [`Decorator`]: decorator::Decorator
//! [`Scheduler`]: scheduler::Scheduler
//! [`LocalScheduler`]: scheduler::LocalScheduler
pub mod compose;
pub mod config;
pub mod controller;
pub mod decorator;
pub mod dom;
pub mod error;
pub mod event;
pub mod geometry;
pub mod input;
pub mod model;
pub mod prelude;
pub mod scheduler;
pub mod subject;
pub mod subscription;
pub mod timeline;
pub mod view;

pub use error::{Error, Result};

#[cfg(all(doctest, not(target_arch = "wasm32")))]
mod __markdown_doctests {
  mod readme {
    #![doc = include_str!("../README.md")]
  }
}
