//! Tunable constants of the map controls, loadable from JSON.
//!
//! Every field has a default, so a partial document only overrides what it
//! names:
//!
//! ```
//! use choropleth_controls::config::{Settings, ZoomMode};
//!
//! let settings = Settings::from_json(r#"{ "zoom": { "mode": "exponential" } }"#).unwrap();
//! assert_eq!(settings.zoom.mode, ZoomMode::Exponential);
//! assert_eq!(settings.pan.inertia.map(|i| i.interval_ms), Some(30));
//! ```
use serde::{de::Error as _, Deserialize, Deserializer, Serialize};

use crate::{
  controller::{ExponentialZoom, InertiaConfig, PanDirection, DEFAULT_ZOOM_STEP},
  error::Result,
  event::MouseButton,
  geometry::ViewBox,
  scheduler::Duration,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
  pub pan: PanSettings,
  pub zoom: ZoomSettings,
  pub timeline: TimelineSettings,
  pub initial_view_box: ViewBox,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      pan: PanSettings::default(),
      zoom: ZoomSettings::default(),
      timeline: TimelineSettings::default(),
      initial_view_box: ViewBox::new(0., 0., 1024., 1024.),
    }
  }
}

impl Settings {
  /// Fails with [`Error::Config`](crate::error::Error) on malformed JSON
  /// and on a zero `interval_ms`.
  pub fn from_json(json: &str) -> Result<Self> { Ok(serde_json::from_str(json)?) }
}

/// Timer periods of zero would tick forever at one instant.
fn period_ms<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u64, D::Error> {
  match u64::deserialize(deserializer)? {
    0 => Err(D::Error::custom("interval_ms must be at least 1")),
    ms => Ok(ms),
  }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanSettings {
  pub button: MouseButton,
  pub direction: PanDirection,
  /// `null` turns the glide off.
  pub inertia: Option<InertiaSettings>,
}

impl Default for PanSettings {
  fn default() -> Self {
    Self {
      button: MouseButton::default(),
      direction: PanDirection::default(),
      inertia: Some(InertiaSettings::default()),
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InertiaSettings {
  pub duration_ms: u64,
  #[serde(deserialize_with = "period_ms")]
  pub interval_ms: u64,
  pub hold_threshold_ms: u64,
}

impl Default for InertiaSettings {
  fn default() -> Self { Self { duration_ms: 1000, interval_ms: 30, hold_threshold_ms: 10 } }
}

impl From<InertiaSettings> for InertiaConfig {
  fn from(s: InertiaSettings) -> Self {
    InertiaConfig {
      duration: Duration::from_millis(s.duration_ms),
      interval: Duration::from_millis(s.interval_ms),
      hold_threshold: Duration::from_millis(s.hold_threshold_ms),
    }
  }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoomMode {
  /// Fixed-size steps, only the wheel direction counts.
  #[default]
  Step,
  /// [`ExponentialZoom`] about the point under the pointer.
  Exponential,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomSettings {
  pub mode: ZoomMode,
  pub step: f64,
  pub base: f64,
  pub notch: f64,
}

impl Default for ZoomSettings {
  fn default() -> Self {
    let curve = ExponentialZoom::default();
    Self { mode: ZoomMode::default(), step: DEFAULT_ZOOM_STEP, base: curve.base, notch: curve.notch }
  }
}

impl ZoomSettings {
  pub fn curve(&self) -> ExponentialZoom { ExponentialZoom { base: self.base, notch: self.notch } }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineSettings {
  #[serde(deserialize_with = "period_ms")]
  pub interval_ms: u64,
}

impl Default for TimelineSettings {
  fn default() -> Self { Self { interval_ms: 30 } }
}

impl TimelineSettings {
  pub fn interval(&self) -> Duration { Duration::from_millis(self.interval_ms) }
}
