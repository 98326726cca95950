// ---------------------------------------------------------------------------
// Snap-on-drag
// ---------------------------------------------------------------------------
//
// Pure decision logic for a window being dragged. The manager feeds in the
// proposed position and the rects of the other visible windows; it owns the
// drag session and applies the result.
// ---------------------------------------------------------------------------

use serde::Serialize;

use crate::geometry::{Edge, Rect, Viewport};
use crate::window::WindowId;

pub const DEFAULT_SNAP_THRESHOLD: f64 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SnapSource {
	Screen,
	Window { id: WindowId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SnapTarget {
	pub edge: Edge,
	#[serde(flatten)]
	pub source: SnapSource,
}

impl SnapTarget {
	pub fn is_screen(&self) -> bool {
		self.source == SnapSource::Screen
	}
}

/// Where a dragged window ends up for one pointer move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SnapDecision {
	pub x: f64,
	pub y: f64,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub target: Option<SnapTarget>,
}

/// An in-progress drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
	pub window: WindowId,
	pub target: Option<SnapTarget>,
}

/// Test a proposed top-left corner for a window of `size` against the screen
/// edges and then the edges of `others`, in order.
///
/// Screen edges pull both axes independently. The reported edge follows the
/// priority left, right, top, bottom. Window edges are only considered when no
/// screen edge matched, and the first window with a matching edge wins.
pub fn check_for_snap(
	x: f64,
	y: f64,
	size: (f64, f64),
	viewport: &Viewport,
	others: &[(WindowId, Rect)],
	threshold: f64,
) -> SnapDecision {
	let (width, height) = size;
	let mut decision = SnapDecision { x, y, target: None };

	let horizontal = if x < threshold {
		decision.x = 0.0;
		Some(Edge::Left)
	} else if x + width > viewport.width - threshold {
		decision.x = viewport.width - width;
		Some(Edge::Right)
	} else {
		None
	};

	let vertical = if y < threshold {
		decision.y = 0.0;
		Some(Edge::Top)
	} else if y + height > viewport.height - threshold {
		decision.y = viewport.height - height - viewport.bottom_margin;
		Some(Edge::Bottom)
	} else {
		None
	};

	if let Some(edge) = horizontal.or(vertical) {
		decision.target = Some(SnapTarget {
			edge,
			source: SnapSource::Screen,
		});
		return decision;
	}

	for &(id, rect) in others {
		let hit = if (x + width - rect.x).abs() < threshold {
			decision.x = rect.x - width;
			Some(Edge::Right)
		} else if (x - rect.right()).abs() < threshold {
			decision.x = rect.right();
			Some(Edge::Left)
		} else if (y + height - rect.y).abs() < threshold {
			decision.y = rect.y - height;
			Some(Edge::Bottom)
		} else if (y - rect.bottom()).abs() < threshold {
			decision.y = rect.bottom();
			Some(Edge::Top)
		} else {
			None
		};

		if let Some(edge) = hit {
			decision.target = Some(SnapTarget {
				edge,
				source: SnapSource::Window { id },
			});
			break;
		}
	}

	decision
}

#[cfg(test)]
mod tests {
	use super::*;

	fn vp() -> Viewport {
		Viewport::new(1000.0, 800.0)
	}

	#[test]
	fn free_position_does_not_snap() {
		let d = check_for_snap(300.0, 200.0, (400.0, 300.0), &vp(), &[], 25.0);
		assert_eq!(d, SnapDecision { x: 300.0, y: 200.0, target: None });
	}

	#[test]
	fn left_edge_snaps() {
		let d = check_for_snap(12.0, 200.0, (400.0, 300.0), &vp(), &[], 25.0);
		assert_eq!(d.x, 0.0);
		assert_eq!(d.y, 200.0);
		assert_eq!(d.target.unwrap().edge, Edge::Left);
		assert!(d.target.unwrap().is_screen());
	}

	#[test]
	fn right_edge_aligns_to_border() {
		let d = check_for_snap(590.0, 200.0, (400.0, 300.0), &vp(), &[], 25.0);
		assert_eq!(d.x, 600.0);
		assert_eq!(d.target.unwrap().edge, Edge::Right);
	}

	#[test]
	fn bottom_edge_keeps_margin() {
		let d = check_for_snap(300.0, 490.0, (400.0, 300.0), &vp(), &[], 25.0);
		assert_eq!(d.y, 490.0);
		assert_eq!(d.target.unwrap().edge, Edge::Bottom);
	}

	#[test]
	fn corner_pulls_both_axes_and_reports_horizontal_edge() {
		let d = check_for_snap(5.0, 5.0, (400.0, 300.0), &vp(), &[], 25.0);
		assert_eq!((d.x, d.y), (0.0, 0.0));
		assert_eq!(d.target.unwrap().edge, Edge::Left);
	}

	#[test]
	fn window_edges_checked_in_order() {
		let others = [
			(2, Rect::new(800.0, 600.0, 100.0, 100.0)),
			(3, Rect::new(100.0, 100.0, 200.0, 200.0)),
		];
		// Left side of the dragged window lands near window 3's right edge.
		let d = check_for_snap(310.0, 400.0, (200.0, 150.0), &vp(), &others, 25.0);
		assert_eq!(d.x, 300.0);
		assert_eq!(
			d.target,
			Some(SnapTarget {
				edge: Edge::Left,
				source: SnapSource::Window { id: 3 },
			})
		);
	}

	#[test]
	fn screen_edge_wins_over_window_edge() {
		let others = [(2, Rect::new(0.0, 0.0, 10.0, 10.0))];
		let d = check_for_snap(20.0, 300.0, (200.0, 150.0), &vp(), &others, 25.0);
		assert!(d.target.unwrap().is_screen());
	}
}
