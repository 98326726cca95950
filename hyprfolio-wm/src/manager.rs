// ---------------------------------------------------------------------------
// WindowManager — workspace/window registry
// ---------------------------------------------------------------------------
//
// Owns every window record (global map, creation order) and the membership
// set of each workspace. Public operations keep the one-window-one-workspace
// invariant themselves; `record_membership` lets a presentation layer report
// drift, which `verify_workspace_integrity` reconciles.
// ---------------------------------------------------------------------------

use std::time::Instant;

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::config::{WmConfig, WorkspaceLayout, MAX_WORKSPACES};
use crate::error::WmError;
use crate::geometry::{clamp_position, clamp_size, Edge, EdgeTags, Rect, Viewport};
use crate::snap::{check_for_snap, DragSession, SnapDecision, SnapTarget};
use crate::tiling::{self, Layout};
use crate::window::{
	BuiltinContent, ContentFactory, ContentKind, WindowContent, WindowId, WindowOptions,
	WindowRecord, WindowState, DEFAULT_HEIGHT, DEFAULT_WIDTH,
};

const CASCADE_STEP: f64 = 30.0;
const CASCADE_SPAN_X: f64 = 400.0;
const CASCADE_SPAN_Y: f64 = 300.0;
const FLOATING_INSET: f64 = 10.0;

// ---------------------------------------------------------------------------
// Public result types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Reassignment {
	pub old: WindowId,
	pub new: WindowId,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityReport {
	/// Extra memberships removed from ids found in several workspaces.
	pub duplicates_removed: usize,
	/// Live windows that were in no workspace and joined the current one.
	pub orphans_adopted: usize,
	/// Workspace entries pointing at missing or closing windows.
	pub dangling_dropped: usize,
}

impl IntegrityReport {
	pub fn total(&self) -> usize {
		self.duplicates_removed + self.orphans_adopted + self.dangling_dropped
	}

	pub fn is_clean(&self) -> bool {
		self.total() == 0
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkspaceInfo {
	pub id: usize,
	pub name: String,
	pub active: bool,
	pub windows: Vec<WindowId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WmEvent {
	#[serde(rename_all = "camelCase")]
	Created {
		id: WindowId,
		workspace: usize,
		window_type: String,
	},
	Focused { id: WindowId },
	Minimized { id: WindowId },
	MaximizeToggled { id: WindowId, maximized: bool },
	MovedToWorkspace { id: WindowId, workspace: usize },
	Closing { id: WindowId },
	Removed { id: WindowId },
	WorkspaceSwitched { from: usize, to: usize },
	Snapped {
		id: WindowId,
		edge: Edge,
		sibling: Option<WindowId>,
	},
	Tiled { layout: Layout, windows: Vec<WindowId> },
	ContentReady { id: WindowId, kind: ContentKind },
	ContentFailed { id: WindowId, message: String },
	RunCommand { window: WindowId, command: String },
	Repaired { windows: Vec<Reassignment> },
}

// ---------------------------------------------------------------------------
// WindowManager
// ---------------------------------------------------------------------------

pub struct WindowManager {
	config: WmConfig,
	viewport: Viewport,
	windows: IndexMap<WindowId, WindowRecord>,
	/// Index `i` holds workspace `i + 1`.
	workspaces: Vec<IndexSet<WindowId>>,
	current: usize,
	active: Option<WindowId>,
	next_id: WindowId,
	touch_seq: u64,
	drag: Option<DragSession>,
	content: Box<dyn ContentFactory + Send>,
	pending_events: Vec<WmEvent>,
}

impl WindowManager {
	pub fn new(config: WmConfig) -> Self {
		Self::with_content_factory(config, Box::new(BuiltinContent))
	}

	pub fn with_content_factory(config: WmConfig, content: Box<dyn ContentFactory + Send>) -> Self {
		let count = config.workspace_count.clamp(1, MAX_WORKSPACES);
		Self {
			viewport: config.viewport,
			config,
			windows: IndexMap::new(),
			workspaces: vec![IndexSet::new(); count],
			current: 1,
			active: None,
			next_id: 1,
			touch_seq: 0,
			drag: None,
			content,
			pending_events: Vec::new(),
		}
	}

	// -- Queries ----------------------------------------------------------

	pub fn viewport(&self) -> &Viewport {
		&self.viewport
	}

	pub fn workspace_count(&self) -> usize {
		self.workspaces.len()
	}

	pub fn current_workspace(&self) -> usize {
		self.current
	}

	pub fn active_window_id(&self) -> Option<WindowId> {
		self.active
	}

	/// Look up a window by id. Closing windows still resolve until purged.
	pub fn get_window(&self, id: WindowId) -> Option<&WindowRecord> {
		self.windows.get(&id)
	}

	pub fn windows(&self) -> impl Iterator<Item = &WindowRecord> {
		self.windows.values()
	}

	pub fn workspace_windows(&self, workspace: usize) -> Option<&IndexSet<WindowId>> {
		workspace
			.checked_sub(1)
			.and_then(|i| self.workspaces.get(i))
	}

	/// First workspace holding `id`.
	pub fn workspace_of(&self, id: WindowId) -> Option<usize> {
		self.workspaces
			.iter()
			.position(|set| set.contains(&id))
			.map(|i| i + 1)
	}

	pub fn workspaces(&self) -> Vec<WorkspaceInfo> {
		self.workspaces
			.iter()
			.enumerate()
			.map(|(i, set)| WorkspaceInfo {
				id: i + 1,
				name: self.config.profile(i + 1).name,
				active: i + 1 == self.current,
				windows: set.iter().copied().collect(),
			})
			.collect()
	}

	pub fn drag_session(&self) -> Option<&DragSession> {
		self.drag.as_ref()
	}

	// -- Helpers (private) ------------------------------------------------

	fn check_workspace(&self, workspace: usize) -> Result<(), WmError> {
		if workspace == 0 || workspace > self.workspaces.len() {
			return Err(WmError::OutOfRange {
				workspace,
				count: self.workspaces.len(),
			});
		}
		Ok(())
	}

	fn open_window_mut(&mut self, id: WindowId) -> Result<&mut WindowRecord, WmError> {
		match self.windows.get_mut(&id) {
			Some(w) if w.is_open() => Ok(w),
			_ => Err(WmError::NotFound(id)),
		}
	}

	fn current_set(&self) -> &IndexSet<WindowId> {
		&self.workspaces[self.current - 1]
	}

	fn next_touch(&mut self) -> u64 {
		self.touch_seq += 1;
		self.touch_seq
	}

	/// Focus `id` and blur everything else. Focusing also restores a minimized
	/// window.
	fn focus_internal(&mut self, id: WindowId) {
		let seq = self.next_touch();
		for (wid, w) in self.windows.iter_mut() {
			if *wid == id {
				w.focused = true;
				w.minimized = false;
				w.touched = seq;
			} else {
				w.focused = false;
			}
		}
		self.active = Some(id);
		self.pending_events.push(WmEvent::Focused { id });
	}

	fn blur_all(&mut self) {
		for w in self.windows.values_mut() {
			w.focused = false;
		}
		self.active = None;
	}

	/// Make `workspace` current and focus its most recently touched window.
	fn activate(&mut self, workspace: usize) {
		self.current = workspace;
		let target = self
			.current_set()
			.iter()
			.filter_map(|id| self.windows.get(id))
			.filter(|w| w.is_open())
			.max_by_key(|w| w.touched)
			.map(|w| w.id);
		match target {
			Some(id) => self.focus_internal(id),
			None => self.blur_all(),
		}
	}

	fn default_position(&self, options: &WindowOptions) -> (f64, f64) {
		let vp = &self.viewport;
		match self.windows.values().rev().find(|w| w.is_open()) {
			Some(last) => (
				cascade(last.rect.x, vp.width - CASCADE_SPAN_X),
				cascade(last.rect.y, vp.height - CASCADE_SPAN_Y),
			),
			None => {
				let width = options.width.unwrap_or(DEFAULT_WIDTH);
				let height = options.height.unwrap_or(DEFAULT_HEIGHT);
				(
					((vp.width - width) / 2.0).floor().max(0.0),
					((vp.height - height) / 3.0).floor().max(0.0),
				)
			}
		}
	}

	/// Drop every window and membership, emitting `Removed` for each record.
	fn clear_all(&mut self) {
		for id in self.windows.keys() {
			self.pending_events.push(WmEvent::Removed { id: *id });
		}
		self.windows.clear();
		for set in &mut self.workspaces {
			set.clear();
		}
		self.active = None;
		self.drag = None;
	}

	// -- Window lifecycle -------------------------------------------------

	/// Create a window in `workspace` (the current one when `None`).
	///
	/// Unset `x`/`y` options cascade from the last live window, or center the
	/// very first one. The window is focused only when it lands in the current
	/// workspace. A content factory failure leaves the window in place with
	/// fallback content.
	pub fn create_window(
		&mut self,
		window_type: &str,
		title: &str,
		mut options: WindowOptions,
		workspace: Option<usize>,
	) -> Result<WindowId, WmError> {
		let target = workspace.unwrap_or(self.current);
		self.check_workspace(target)?;

		if !options.has_position() {
			let (x, y) = self.default_position(&options);
			options.x = Some(x);
			options.y = Some(y);
		}

		let id = self.next_id;
		self.next_id += 1;

		self.windows
			.insert(id, WindowRecord::new(id, window_type, title, &options));
		self.workspaces[target - 1].insert(id);
		tracing::debug!(id, window_type, workspace = target, "Created window");
		self.pending_events.push(WmEvent::Created {
			id,
			workspace: target,
			window_type: window_type.to_string(),
		});

		if target == self.current {
			self.focus_internal(id);
		} else {
			let seq = self.next_touch();
			if let Some(w) = self.windows.get_mut(&id) {
				w.touched = seq;
			}
		}

		let content = match self.content.create(id, window_type) {
			Ok(kind) => {
				self.pending_events.push(WmEvent::ContentReady {
					id,
					kind: kind.clone(),
				});
				WindowContent::Ready { kind }
			}
			Err(e) => {
				tracing::warn!(id, window_type, error = %e, "Content creation failed, showing fallback");
				let message = e.to_string();
				self.pending_events.push(WmEvent::ContentFailed {
					id,
					message: message.clone(),
				});
				WindowContent::Fallback { message }
			}
		};
		if let Some(w) = self.windows.get_mut(&id) {
			w.content = content;
		}

		Ok(id)
	}

	/// Take the window out of its workspace now and schedule the record for
	/// purging after the close grace period.
	pub fn close_window(&mut self, id: WindowId) -> Result<(), WmError> {
		let purge_at = Instant::now() + self.config.close_grace;
		let w = self.open_window_mut(id)?;
		w.state = WindowState::Closing { purge_at };
		w.focused = false;

		for set in &mut self.workspaces {
			set.shift_remove(&id);
		}
		if self.drag.is_some_and(|d| d.window == id) {
			self.drag = None;
		}
		tracing::debug!(id, "Closing window");
		self.pending_events.push(WmEvent::Closing { id });

		if self.active == Some(id) {
			self.active = None;
			let next = self.windows.values().find(|w| w.is_open()).map(|w| w.id);
			if let Some(next) = next {
				self.focus_internal(next);
			}
		}
		Ok(())
	}

	/// Remove closing windows whose grace period ended at or before `now`.
	pub fn purge_expired(&mut self, now: Instant) -> Vec<WindowId> {
		let expired: Vec<WindowId> = self
			.windows
			.values()
			.filter(|w| matches!(w.state, WindowState::Closing { purge_at } if purge_at <= now))
			.map(|w| w.id)
			.collect();

		for id in &expired {
			self.windows.shift_remove(id);
			for set in &mut self.workspaces {
				set.shift_remove(id);
			}
			tracing::debug!(id, "Purged window");
			self.pending_events.push(WmEvent::Removed { id: *id });
		}
		expired
	}

	// -- Focus / state ----------------------------------------------------

	pub fn focus_window(&mut self, id: WindowId) -> Result<(), WmError> {
		self.open_window_mut(id)?;
		self.focus_internal(id);
		Ok(())
	}

	pub fn minimize_window(&mut self, id: WindowId) -> Result<(), WmError> {
		self.open_window_mut(id)?.minimized = true;
		self.pending_events.push(WmEvent::Minimized { id });
		Ok(())
	}

	/// Maximize to the usable area, or restore the geometry saved when the
	/// window was maximized. Returns the new maximized flag.
	pub fn toggle_maximize(&mut self, id: WindowId) -> Result<bool, WmError> {
		let vp = self.viewport;
		let w = self.open_window_mut(id)?;
		if w.maximized {
			if let Some(rect) = w.restore.take() {
				w.rect = rect;
			}
			w.maximized = false;
		} else {
			w.restore = Some(w.rect);
			w.rect = Rect::new(0.0, 0.0, vp.width, vp.safe_height());
			w.maximized = true;
		}
		let maximized = w.maximized;
		self.pending_events
			.push(WmEvent::MaximizeToggled { id, maximized });
		Ok(maximized)
	}

	/// Move the window's top-left corner, clamped into the viewport.
	pub fn set_position(&mut self, id: WindowId, x: f64, y: f64) -> Result<Rect, WmError> {
		let vp = self.viewport;
		let w = self.open_window_mut(id)?;
		apply_position(w, x, y, &vp, false);
		Ok(w.rect)
	}

	/// Resize within the window's limits and the viewport.
	pub fn set_size(&mut self, id: WindowId, width: f64, height: f64) -> Result<Rect, WmError> {
		let vp = self.viewport;
		let w = self.open_window_mut(id)?;
		if !w.resizable {
			return Err(WmError::InvalidOperation(format!(
				"Window {} is not resizable",
				id
			)));
		}
		apply_size(w, width, height, &vp);
		Ok(w.rect)
	}

	/// Bring the focused window back above the bottom of the viewport before
	/// handing it out: shrink it when it can stay above its minimum height,
	/// otherwise move it up.
	pub fn get_active_window(&mut self) -> Option<&WindowRecord> {
		let id = self.active?;
		let vp = self.viewport;
		if let Some(w) = self.windows.get_mut(&id) {
			ensure_safe_position(w, &vp);
		}
		self.windows.get(&id)
	}

	/// Un-minimize every window of the current workspace and pull off-screen
	/// ones back into view. Returns how many windows changed.
	pub fn force_window_visibility(&mut self) -> usize {
		let vp = self.viewport;
		let ids: Vec<WindowId> = self.current_set().iter().copied().collect();
		let mut changed = 0;

		for id in ids {
			let Some(w) = self.windows.get_mut(&id) else {
				continue;
			};
			if !w.is_open() {
				continue;
			}
			let mut touched = false;
			if w.minimized {
				w.minimized = false;
				touched = true;
			}
			if !w.rect.is_within(&vp) {
				tracing::debug!(id, "Window off-screen, repositioning");
				let (x, y) = (w.rect.x, w.rect.y);
				apply_position(w, x, y, &vp, true);
				touched = true;
			}
			if touched {
				changed += 1;
			}
		}
		changed
	}

	pub fn set_viewport(&mut self, width: f64, height: f64) {
		self.viewport.width = width;
		self.viewport.height = height;
		tracing::debug!(width, height, "Viewport changed");
	}

	// -- Workspaces -------------------------------------------------------

	/// Make `workspace` current. Membership never changes; the most recently
	/// touched window there gets focus.
	pub fn switch_to_workspace(&mut self, workspace: usize) -> Result<(), WmError> {
		if let Err(e) = self.check_workspace(workspace) {
			tracing::error!(workspace, "Invalid workspace ID");
			return Err(e);
		}
		let from = self.current;
		tracing::debug!(from, to = workspace, "Switching workspace");
		self.pending_events.push(WmEvent::WorkspaceSwitched {
			from,
			to: workspace,
		});
		self.activate(workspace);
		Ok(())
	}

	pub fn move_window_to_workspace(&mut self, id: WindowId, workspace: usize) -> Result<(), WmError> {
		self.check_workspace(workspace)?;
		self.open_window_mut(id)?;

		for set in &mut self.workspaces {
			set.shift_remove(&id);
		}
		self.workspaces[workspace - 1].insert(id);

		if workspace != self.current && self.active == Some(id) {
			if let Some(w) = self.windows.get_mut(&id) {
				w.focused = false;
			}
			self.active = None;
		}
		self.pending_events
			.push(WmEvent::MovedToWorkspace { id, workspace });
		Ok(())
	}

	/// Close everything in `workspace` and open a single window of
	/// `window_type` laid out by the workspace profile.
	pub fn initialize_workspace(&mut self, workspace: usize, window_type: &str) -> Result<WindowId, WmError> {
		self.check_workspace(workspace)?;

		let existing: Vec<WindowId> = self.workspaces[workspace - 1].iter().copied().collect();
		for id in existing {
			if let Err(e) = self.close_window(id) {
				tracing::debug!(id, error = %e, "Skipping stale workspace entry");
			}
		}
		self.workspaces[workspace - 1].clear();

		let profile = self.config.profile(workspace);
		let vp = self.viewport;
		let safe_h = vp.safe_height();
		let options = match profile.layout {
			WorkspaceLayout::Fixed => WindowOptions {
				maximized: Some(true),
				..WindowOptions::default()
			}
			.at(0.0, 0.0)
			.sized(vp.width, safe_h),
			WorkspaceLayout::Cascaded => WindowOptions {
				maximized: Some(false),
				..WindowOptions::default()
			}
			.at(FLOATING_INSET, FLOATING_INSET)
			.sized(
				DEFAULT_WIDTH.min(vp.width - 2.0 * FLOATING_INSET),
				DEFAULT_HEIGHT.min(safe_h),
			),
		};

		let id = self.create_window(window_type, &profile.name, options, Some(workspace))?;
		if let Some(command) = profile.command {
			self.pending_events.push(WmEvent::RunCommand {
				window: id,
				command,
			});
		}
		tracing::info!(workspace, id, "Workspace initialized");
		Ok(id)
	}

	/// Insert a membership exactly as reported, without reconciling it.
	pub fn record_membership(&mut self, workspace: usize, id: WindowId) -> Result<(), WmError> {
		self.check_workspace(workspace)?;
		self.workspaces[workspace - 1].insert(id);
		tracing::debug!(workspace, id, "Recorded external membership");
		Ok(())
	}

	// -- Layout -----------------------------------------------------------

	/// Lay out every open window of the current workspace, minimized ones
	/// included. Minimized windows get their cell but stay minimized. Returns
	/// the tiled ids in layout order.
	pub fn tile_windows(&mut self, layout: Layout) -> Vec<WindowId> {
		let vp = self.viewport;
		let ids: Vec<WindowId> = self
			.current_set()
			.iter()
			.copied()
			.filter(|id| self.windows.get(id).is_some_and(WindowRecord::is_open))
			.collect();

		let tiles = tiling::tile(layout, ids.len(), &vp);
		for (id, tile) in ids.iter().zip(tiles) {
			if let Some(w) = self.windows.get_mut(id) {
				place(w, tile.rect, tile.edges, &vp);
			}
		}

		tracing::debug!(%layout, count = ids.len(), "Tiled windows");
		self.pending_events.push(WmEvent::Tiled {
			layout,
			windows: ids.clone(),
		});
		ids
	}

	// -- Drag / snap ------------------------------------------------------

	pub fn begin_drag(&mut self, id: WindowId) -> Result<(), WmError> {
		self.open_window_mut(id)?;
		self.focus_internal(id);
		self.drag = Some(DragSession {
			window: id,
			target: None,
		});
		Ok(())
	}

	/// Apply one pointer move to the dragged window and report where it went.
	pub fn drag_to(&mut self, x: f64, y: f64) -> Result<SnapDecision, WmError> {
		let session = self.drag.ok_or(WmError::NoActiveDrag)?;
		let id = session.window;
		let vp = self.viewport;

		let size = match self.windows.get(&id) {
			Some(w) if w.is_open() => (w.rect.width, w.rect.height),
			_ => {
				self.drag = None;
				return Err(WmError::NotFound(id));
			}
		};
		let others: Vec<(WindowId, Rect)> = self
			.current_set()
			.iter()
			.filter(|other| **other != id)
			.filter_map(|other| self.windows.get(other))
			.filter(|w| w.is_visible())
			.map(|w| (w.id, w.rect))
			.collect();

		let mut decision = check_for_snap(x, y, size, &vp, &others, self.config.snap_threshold);
		if let Some(w) = self.windows.get_mut(&id) {
			apply_position(w, decision.x, decision.y, &vp, false);
			decision.x = w.rect.x;
			decision.y = w.rect.y;
		}
		self.drag = Some(DragSession {
			window: id,
			target: decision.target,
		});
		Ok(decision)
	}

	/// Release the drag. A screen-edge snap fills that half of the screen and
	/// tiles the first other visible window into the other half.
	pub fn end_drag(&mut self) -> Result<Option<SnapTarget>, WmError> {
		let session = self.drag.take().ok_or(WmError::NoActiveDrag)?;
		if let Some(target) = session.target.filter(SnapTarget::is_screen) {
			self.finalize_snap(session.window, target.edge);
		}
		self.verify_workspace_integrity();
		Ok(session.target)
	}

	fn finalize_snap(&mut self, id: WindowId, edge: Edge) {
		let vp = self.viewport;
		if let Some(w) = self.windows.get_mut(&id) {
			place(w, edge.half_of(&vp), EdgeTags::only(edge), &vp);
		}

		let sibling = self.workspace_of(id).and_then(|ws| {
			self.workspaces[ws - 1]
				.iter()
				.copied()
				.find(|&other| other != id && self.windows.get(&other).is_some_and(WindowRecord::is_visible))
		});
		if let Some(other) = sibling.and_then(|sid| self.windows.get_mut(&sid)) {
			let opposite = edge.opposite();
			place(other, opposite.half_of(&vp), EdgeTags::only(opposite), &vp);
		}

		tracing::debug!(id, ?edge, ?sibling, "Window snapped");
		self.pending_events.push(WmEvent::Snapped { id, edge, sibling });
	}

	// -- Integrity / repair -----------------------------------------------

	/// Reconcile workspace membership with the window map:
	/// duplicates keep the current workspace (else the first), live windows in
	/// no workspace join the current one, and entries for missing or closing
	/// windows are dropped. A second call right after finds nothing.
	pub fn verify_workspace_integrity(&mut self) -> IntegrityReport {
		let mut report = IntegrityReport::default();
		let current = self.current;

		let mut membership: IndexMap<WindowId, Vec<usize>> = IndexMap::new();
		for (i, set) in self.workspaces.iter().enumerate() {
			for id in set {
				membership.entry(*id).or_default().push(i + 1);
			}
		}

		for (id, spaces) in &membership {
			if spaces.len() < 2 {
				continue;
			}
			let keep = if spaces.contains(&current) { current } else { spaces[0] };
			tracing::warn!(id, ?spaces, keep, "Window found in several workspaces");
			for &ws in spaces {
				if ws != keep {
					self.workspaces[ws - 1].shift_remove(id);
					report.duplicates_removed += 1;
				}
			}
		}

		let orphans: Vec<WindowId> = self
			.windows
			.values()
			.filter(|w| w.is_open() && !membership.contains_key(&w.id))
			.map(|w| w.id)
			.collect();
		for id in orphans {
			tracing::warn!(id, workspace = current, "Window in no workspace, adopting");
			self.workspaces[current - 1].insert(id);
			report.orphans_adopted += 1;
		}

		for ws in 1..=self.workspaces.len() {
			let dangling: Vec<WindowId> = self.workspaces[ws - 1]
				.iter()
				.copied()
				.filter(|id| !self.windows.get(id).is_some_and(WindowRecord::is_open))
				.collect();
			for id in dangling {
				tracing::warn!(id, workspace = ws, "Workspace references missing window");
				self.workspaces[ws - 1].shift_remove(&id);
				report.dangling_dropped += 1;
			}
		}

		if !report.is_clean() {
			tracing::info!(fixed = report.total(), "Fixed workspace integrity issues");
			self.activate(current);
		}
		report
	}

	/// Rebuild every live window from a snapshot of its type, title, options
	/// and workspace. Ids are reassigned; the returned pairs map old to new.
	pub fn repair_window_manager(&mut self) -> Vec<Reassignment> {
		let current = self.current;
		let snapshots: Vec<(WindowId, String, String, WindowOptions, usize)> = self
			.windows
			.values()
			.filter(|w| w.is_open())
			.map(|w| {
				(
					w.id,
					w.window_type.clone(),
					w.title.clone(),
					w.options(),
					self.workspace_of(w.id).unwrap_or(current),
				)
			})
			.collect();

		tracing::warn!(windows = snapshots.len(), "Rebuilding window workspaces");
		self.clear_all();

		let mut mapping = Vec::with_capacity(snapshots.len());
		for (old, window_type, title, options, workspace) in snapshots {
			match self.create_window(&window_type, &title, options, Some(workspace)) {
				Ok(new) => mapping.push(Reassignment { old, new }),
				Err(e) => tracing::error!(old, error = %e, "Failed to recreate window"),
			}
		}

		self.activate(current);
		self.pending_events.push(WmEvent::Repaired {
			windows: mapping.clone(),
		});
		mapping
	}

	/// Drop every window and open a single terminal in the current workspace.
	pub fn reinitialize(&mut self) -> Result<WindowId, WmError> {
		tracing::info!("Reinitializing window manager");
		self.clear_all();
		self.create_window("terminal", "Terminal", WindowOptions::default(), None)
	}

	// -- Events -----------------------------------------------------------

	pub fn drain_events(&mut self) -> Vec<WmEvent> {
		std::mem::take(&mut self.pending_events)
	}
}

// ---------------------------------------------------------------------------
// Geometry application
// ---------------------------------------------------------------------------

fn cascade(previous: f64, span: f64) -> f64 {
	if span <= 0.0 {
		return 0.0;
	}
	(previous + CASCADE_STEP).rem_euclid(span)
}

/// A manual move clears the snapped state; layout moves keep it.
fn apply_position(w: &mut WindowRecord, x: f64, y: f64, vp: &Viewport, layout: bool) {
	let (x, y) = clamp_position(x, y, w.rect.width, w.rect.height, vp);
	w.rect.x = x;
	w.rect.y = y;
	if !layout {
		w.snapped = false;
		w.edges.clear();
	}
}

fn apply_size(w: &mut WindowRecord, width: f64, height: f64, vp: &Viewport) {
	let (width, height) = clamp_size(width, height, &w.limits, vp);
	w.rect.width = width;
	w.rect.height = height;
}

/// Size first so the position clamp sees the final dimensions.
fn place(w: &mut WindowRecord, rect: Rect, edges: EdgeTags, vp: &Viewport) {
	w.maximized = false;
	w.restore = None;
	apply_size(w, rect.width, rect.height, vp);
	apply_position(w, rect.x, rect.y, vp, true);
	w.edges = edges;
	w.snapped = true;
}

fn ensure_safe_position(w: &mut WindowRecord, vp: &Viewport) {
	if w.rect.bottom() > vp.height {
		let Rect { x, y, width, height } = w.rect;
		let new_height = vp.height - y - vp.bottom_margin;
		if new_height >= w.limits.min_height {
			apply_size(w, width, new_height, vp);
		} else {
			let y = (vp.height - height - vp.bottom_margin).max(0.0);
			apply_position(w, x, y, vp, true);
		}
	}
	if w.maximized {
		w.rect.y = 0.0;
		w.rect.height = vp.safe_height();
	}
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
