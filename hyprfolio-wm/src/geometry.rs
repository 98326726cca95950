// ---------------------------------------------------------------------------
// Geometry primitives
// ---------------------------------------------------------------------------
//
// Pixel coordinates are f64 so even splits (W/3, safe_h/2) stay exact. The
// origin is the top-left corner of the desktop container.
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ── Viewport ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
	pub width: f64,
	pub height: f64,
	/// Strip kept free at the bottom so windows never touch the screen edge.
	pub bottom_margin: f64,
}

impl Viewport {
	pub const DEFAULT_BOTTOM_MARGIN: f64 = 10.0;

	pub fn new(width: f64, height: f64) -> Self {
		Self {
			width,
			height,
			bottom_margin: Self::DEFAULT_BOTTOM_MARGIN,
		}
	}

	pub fn safe_height(&self) -> f64 {
		(self.height - self.bottom_margin).max(0.0)
	}
}

impl Default for Viewport {
	fn default() -> Self {
		Self::new(1920.0, 1080.0)
	}
}

// ── Rect ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
	pub x: f64,
	pub y: f64,
	pub width: f64,
	pub height: f64,
}

impl Rect {
	pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
		Self {
			x,
			y,
			width,
			height,
		}
	}

	pub fn right(&self) -> f64 {
		self.x + self.width
	}

	pub fn bottom(&self) -> f64 {
		self.y + self.height
	}

	/// True when the whole rect sits inside `[0, viewport]` on both axes.
	pub fn is_within(&self, viewport: &Viewport) -> bool {
		self.x >= 0.0
			&& self.y >= 0.0
			&& self.x <= viewport.width - self.width
			&& self.y <= viewport.height - self.height
	}
}

// ── Size limits ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeLimits {
	pub min_width: f64,
	pub min_height: f64,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max_width: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max_height: Option<f64>,
}

impl Default for SizeLimits {
	fn default() -> Self {
		Self {
			min_width: 200.0,
			min_height: 150.0,
			max_width: None,
			max_height: None,
		}
	}
}

/// Clamp a top-left corner so a box of `width` x `height` stays on screen.
/// The lower bound wins when the box is larger than the viewport.
pub fn clamp_position(x: f64, y: f64, width: f64, height: f64, viewport: &Viewport) -> (f64, f64) {
	let max_x = viewport.width - width;
	let max_y = viewport.height - height;
	(x.min(max_x).max(0.0), y.min(max_y).max(0.0))
}

/// Clamp a size to `[min, min(max, viewport)]` on each axis. The minimum wins
/// over the viewport.
pub fn clamp_size(width: f64, height: f64, limits: &SizeLimits, viewport: &Viewport) -> (f64, f64) {
	let upper_w = limits.max_width.map_or(viewport.width, |m| m.min(viewport.width));
	let upper_h = limits
		.max_height
		.map_or(viewport.height, |m| m.min(viewport.height));
	(
		width.min(upper_w).max(limits.min_width),
		height.min(upper_h).max(limits.min_height),
	)
}

// ── Edges ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
	Left,
	Right,
	Top,
	Bottom,
}

impl Edge {
	pub fn opposite(self) -> Self {
		match self {
			Self::Left => Self::Right,
			Self::Right => Self::Left,
			Self::Top => Self::Bottom,
			Self::Bottom => Self::Top,
		}
	}

	/// The half of the usable screen a window snapped to this edge occupies.
	pub fn half_of(self, viewport: &Viewport) -> Rect {
		let w = viewport.width;
		let h = viewport.safe_height();
		match self {
			Self::Left => Rect::new(0.0, 0.0, w / 2.0, h),
			Self::Right => Rect::new(w / 2.0, 0.0, w / 2.0, h),
			Self::Top => Rect::new(0.0, 0.0, w, h / 2.0),
			Self::Bottom => Rect::new(0.0, h / 2.0, w, h / 2.0),
		}
	}
}

/// Which screen borders a tiled or snapped window touches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeTags {
	pub left: bool,
	pub right: bool,
	pub top: bool,
	pub bottom: bool,
}

impl EdgeTags {
	pub fn only(edge: Edge) -> Self {
		let mut tags = Self::default();
		tags.set(edge);
		tags
	}

	pub fn set(&mut self, edge: Edge) {
		match edge {
			Edge::Left => self.left = true,
			Edge::Right => self.right = true,
			Edge::Top => self.top = true,
			Edge::Bottom => self.bottom = true,
		}
	}

	pub fn clear(&mut self) {
		*self = Self::default();
	}

	pub fn is_empty(&self) -> bool {
		!(self.left || self.right || self.top || self.bottom)
	}
}
