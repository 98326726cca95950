use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WmError;
use crate::geometry::{EdgeTags, Rect, Viewport};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
	#[default]
	Horizontal,
	Vertical,
	Grid,
}

impl FromStr for Layout {
	type Err = WmError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"horizontal" => Ok(Self::Horizontal),
			"vertical" => Ok(Self::Vertical),
			"grid" => Ok(Self::Grid),
			other => Err(WmError::InvalidOperation(format!(
				"Unknown layout: {}",
				other
			))),
		}
	}
}

impl fmt::Display for Layout {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Horizontal => "horizontal",
			Self::Vertical => "vertical",
			Self::Grid => "grid",
		})
	}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tile {
	pub rect: Rect,
	pub edges: EdgeTags,
}

/// Split the usable area into `count` cells for `layout`, in window order.
///
/// Horizontal cells span the safe height, vertical cells the full width. The
/// grid uses `ceil(sqrt(n))` columns and as many rows as needed. Border cells
/// are tagged with the screen edge they touch; a cell in the first column or
/// row is never also tagged with the last.
pub fn tile(layout: Layout, count: usize, viewport: &Viewport) -> Vec<Tile> {
	if count == 0 {
		return Vec::new();
	}

	let width = viewport.width;
	let safe_h = viewport.safe_height();
	let n = count as f64;

	match layout {
		Layout::Horizontal => {
			let w = width / n;
			(0..count)
				.map(|i| Tile {
					rect: Rect::new(i as f64 * w, 0.0, w, safe_h),
					edges: span_edges(i, count, true),
				})
				.collect()
		}
		Layout::Vertical => {
			let h = safe_h / n;
			(0..count)
				.map(|i| Tile {
					rect: Rect::new(0.0, i as f64 * h, width, h),
					edges: span_edges(i, count, false),
				})
				.collect()
		}
		Layout::Grid => {
			let cols = (n.sqrt().ceil() as usize).max(1);
			let rows = count.div_ceil(cols);
			let w = width / cols as f64;
			let h = safe_h / rows as f64;
			(0..count)
				.map(|i| {
					let col = i % cols;
					let row = i / cols;
					let mut edges = EdgeTags::default();
					if col == 0 {
						edges.left = true;
					} else if col == cols - 1 {
						edges.right = true;
					}
					if row == 0 {
						edges.top = true;
					} else if row == rows - 1 {
						edges.bottom = true;
					}
					Tile {
						rect: Rect::new(col as f64 * w, row as f64 * h, w, h),
						edges,
					}
				})
				.collect()
		}
	}
}

fn span_edges(index: usize, count: usize, horizontal: bool) -> EdgeTags {
	let mut edges = EdgeTags::default();
	let first = index == 0;
	let last = index == count - 1;
	match (horizontal, first, last) {
		(true, true, _) => edges.left = true,
		(true, false, true) => edges.right = true,
		(false, true, _) => edges.top = true,
		(false, false, true) => edges.bottom = true,
		_ => {}
	}
	edges
}
