//! Plain geometry: points, the SVG viewBox rectangle, a 3D camera, and the
//! screen-to-content mappings used by controllers.
use std::{
  fmt,
  ops::{Add, AddAssign, Mul, Neg, Sub},
};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
  pub x: f64,
  pub y: f64,
}

impl Point {
  pub const ZERO: Point = Point { x: 0., y: 0. };

  #[inline]
  pub const fn new(x: f64, y: f64) -> Self { Self { x, y } }

  #[inline]
  pub fn is_zero(&self) -> bool { self.x == 0. && self.y == 0. }

  #[inline]
  pub fn length(&self) -> f64 { self.x.hypot(self.y) }
}

impl Add for Point {
  type Output = Point;
  #[inline]
  fn add(self, rhs: Point) -> Point { Point::new(self.x + rhs.x, self.y + rhs.y) }
}

impl AddAssign for Point {
  #[inline]
  fn add_assign(&mut self, rhs: Point) { *self = *self + rhs }
}

impl Sub for Point {
  type Output = Point;
  #[inline]
  fn sub(self, rhs: Point) -> Point { Point::new(self.x - rhs.x, self.y - rhs.y) }
}

impl Mul<f64> for Point {
  type Output = Point;
  #[inline]
  fn mul(self, rhs: f64) -> Point { Point::new(self.x * rhs, self.y * rhs) }
}

impl Neg for Point {
  type Output = Point;
  #[inline]
  fn neg(self) -> Point { Point::new(-self.x, -self.y) }
}

/// The visible window of an SVG canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewBox {
  pub x: f64,
  pub y: f64,
  pub width: f64,
  pub height: f64,
}

impl ViewBox {
  pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
    Self { x, y, width, height }
  }

  #[inline]
  pub fn origin(&self) -> Point { Point::new(self.x, self.y) }

  pub fn center(&self) -> Point {
    Point::new(self.x + self.width / 2., self.y + self.height / 2.)
  }

  /// The user-space point under `client` when this view box is shown in
  /// `rect`, scaled to fit and centred (SVG's default `xMidYMid meet`).
  /// Without a usable layout one user unit is one pixel from the origin.
  pub fn client_to_user(&self, rect: Option<ClientRect>, client: Point) -> Point {
    let Some(rect) = rect.filter(|r| r.width > 0. && r.height > 0.) else {
      return self.origin() + client;
    };
    let scale = (self.width / rect.width).max(self.height / rect.height);
    let shown = Point::new(rect.width * scale, rect.height * scale);
    let origin = Point::new(self.x - (shown.x - self.width) / 2., self.y - (shown.y - self.height) / 2.);
    origin + Point::new(client.x - rect.left, client.y - rect.top) * scale
  }
}

/// Layout box of an element in client pixels, as `getBoundingClientRect()`
/// reports it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientRect {
  pub left: f64,
  pub top: f64,
  pub width: f64,
  pub height: f64,
}

impl ClientRect {
  pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
    Self { left, top, width, height }
  }
}

/// Formats as the SVG `viewBox` attribute value: `"x y width height"`.
impl fmt::Display for ViewBox {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {} {} {}", self.x, self.y, self.width, self.height)
  }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
  pub x: f64,
  pub y: f64,
  pub z: f64,
}

impl Vec3 {
  pub const fn new(x: f64, y: f64, z: f64) -> Self { Self { x, y, z } }
}

/// A perspective camera looking from `eye` at `look`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Camera {
  pub eye: Vec3,
  pub look: Vec3,
  /// Vertical field of view, in degrees.
  pub fov: f64,
}

impl Default for Camera {
  fn default() -> Self { Self { eye: Vec3::new(0., 0., 1.), look: Vec3::default(), fov: 45. } }
}

/// Values a pan gesture can shift.
pub trait Translate {
  fn translate(&mut self, delta: Point);
}

impl Translate for ViewBox {
  fn translate(&mut self, delta: Point) {
    self.x += delta.x;
    self.y += delta.y;
  }
}

impl Translate for Point {
  fn translate(&mut self, delta: Point) { *self += delta }
}

/// Moves eye and look together, so the viewing direction is kept.
impl Translate for Camera {
  fn translate(&mut self, delta: Point) {
    self.eye.x += delta.x;
    self.eye.y += delta.y;
    self.look.x += delta.x;
    self.look.y += delta.y;
  }
}

/// Values a zoom gesture can scale about a fixed point.
pub trait Scale {
  /// Scale by `factor` keeping `focus` in place; `factor > 1` shows more
  /// content.
  fn scale_about(&mut self, focus: Point, factor: f64);
}

impl Scale for ViewBox {
  fn scale_about(&mut self, focus: Point, factor: f64) {
    self.x = focus.x + (self.x - focus.x) * factor;
    self.y = focus.y + (self.y - focus.y) * factor;
    self.width *= factor;
    self.height *= factor;
  }
}

impl Scale for Camera {
  fn scale_about(&mut self, focus: Point, factor: f64) {
    for p in [&mut self.eye, &mut self.look] {
      p.x = focus.x + (p.x - focus.x) * factor;
      p.y = focus.y + (p.y - focus.y) * factor;
    }
    self.fov = (self.fov * factor).clamp(1., 179.);
  }
}

/// A 2D affine matrix laid out like `SVGMatrix`:
///
/// ```text
/// | a c e |
/// | b d f |
/// | 0 0 1 |
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
  pub a: f64,
  pub b: f64,
  pub c: f64,
  pub d: f64,
  pub e: f64,
  pub f: f64,
}

impl Default for Matrix {
  fn default() -> Self { Self::IDENTITY }
}

impl Matrix {
  pub const IDENTITY: Matrix = Matrix { a: 1., b: 0., c: 0., d: 1., e: 0., f: 0. };

  pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
    Self { a, b, c, d, e, f }
  }

  pub fn determinant(&self) -> f64 { self.a * self.d - self.b * self.c }

  pub fn inverse(&self) -> Result<Matrix> {
    let det = self.determinant();
    if det == 0. || !det.is_finite() {
      return Err(Error::SingularTransform);
    }
    Ok(Matrix {
      a: self.d / det,
      b: -self.b / det,
      c: -self.c / det,
      d: self.a / det,
      e: (self.c * self.f - self.d * self.e) / det,
      f: (self.b * self.e - self.a * self.f) / det,
    })
  }

  pub fn apply(&self, p: Point) -> Point {
    Point::new(self.a * p.x + self.c * p.y + self.e, self.b * p.x + self.d * p.y + self.f)
  }
}

/// Maps a client (screen) position to the coordinate space a controller
/// mutates.
pub trait ScreenTransform {
  fn to_content(&self, client: Point) -> Point;
}

impl<F: Fn(Point) -> Point> ScreenTransform for F {
  fn to_content(&self, client: Point) -> Point { self(client) }
}

/// Screen pixels, unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct Identity;

impl ScreenTransform for Identity {
  fn to_content(&self, client: Point) -> Point { client }
}

/// Naive mapping: client position relative to the target's bounding rect.
#[derive(Clone, Copy, Debug, Default)]
pub struct BoundingRect {
  pub left: f64,
  pub top: f64,
}

impl ScreenTransform for BoundingRect {
  fn to_content(&self, client: Point) -> Point {
    Point::new(client.x - self.left, client.y - self.top)
  }
}

/// Matrix-accurate mapping through the inverse of the element's screen
/// transform (`getScreenCTM()` in a browser).
#[derive(Clone, Copy, Debug)]
pub struct ScreenMatrix {
  to_content: Matrix,
}

impl ScreenMatrix {
  /// Fails with [`Error::SingularTransform`] when `screen_ctm` can't be
  /// inverted.
  pub fn from_screen_ctm(screen_ctm: Matrix) -> Result<Self> {
    Ok(Self { to_content: screen_ctm.inverse()? })
  }
}

impl ScreenTransform for ScreenMatrix {
  fn to_content(&self, client: Point) -> Point { self.to_content.apply(client) }
}
