// ---------------------------------------------------------------------------
// WmServer — JSON-RPC dispatcher
// ---------------------------------------------------------------------------
//
// Routes NDJSON JSON-RPC 2.0 requests to WindowManager operations. Requests
// and the purge timer share one task: `run` selects over the next stdin line
// and the purge interval, so closed windows disappear on schedule even while
// the client is idle. Events are flushed as `wm/event` notifications before
// the response they belong to.
// ---------------------------------------------------------------------------

use std::io::Write;
use std::time::Instant;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::time::MissedTickBehavior;

use crate::config::{WmConfig, MAX_WORKSPACES};
use crate::error::WmError;
use crate::manager::WindowManager;
use crate::protocol::*;
use crate::tiling::Layout;
use crate::transport::NdjsonTransport;

pub struct WmServer<W: Write> {
	transport: NdjsonTransport<W>,
	config: WmConfig,
	wm: WindowManager,
}

impl<W: Write> WmServer<W> {
	pub fn new(transport: NdjsonTransport<W>, config: WmConfig) -> Self {
		Self {
			wm: WindowManager::new(config.clone()),
			transport,
			config,
		}
	}

	pub fn into_transport(self) -> NdjsonTransport<W> {
		self.transport
	}

	pub fn manager(&self) -> &WindowManager {
		&self.wm
	}

	/// Main loop: serve requests until EOF, purging closed windows on every
	/// tick of the purge interval.
	pub async fn run<R: AsyncBufRead + Unpin>(&mut self, reader: R) -> Result<(), WmError> {
		let mut lines = reader.lines();
		let mut purge = tokio::time::interval(self.config.purge_interval);
		purge.set_missed_tick_behavior(MissedTickBehavior::Delay);

		loop {
			tokio::select! {
				line = lines.next_line() => match line? {
					Some(line) => self.handle_line(&line),
					None => break,
				},
				tick = purge.tick() => self.purge(tick.into_std()),
			}
		}

		tracing::debug!("Input closed, stopping");
		Ok(())
	}

	/// Handle one raw input line.
	pub fn handle_line(&mut self, line: &str) {
		let trimmed = line.trim();
		if trimmed.is_empty() {
			return;
		}

		match serde_json::from_str::<JsonRpcRequest>(trimmed) {
			Ok(req) => self.dispatch(req),
			Err(e) => {
				tracing::warn!("Parse error: {}", e);
				self.transport
					.write_error(0, INTERNAL_ERROR, "Parse error: invalid JSON", None);
			}
		}
	}

	/// Drop windows whose close grace ended by `now` and notify the client.
	pub fn purge(&mut self, now: Instant) {
		let removed = self.wm.purge_expired(now);
		if !removed.is_empty() {
			tracing::trace!(count = removed.len(), "Purged closed windows");
		}
		let events = self.wm.drain_events();
		self.transport.write_events("wm/event", events);
	}

	// ── Dispatch ──────────────────────────────────────────────────────────

	fn dispatch(&mut self, req: JsonRpcRequest) {
		let id = req.id;
		tracing::debug!(id, method = %req.method, "Dispatching request");

		let result = match req.method.as_str() {
			"wm/initialize" => self.handle_initialize(req.params),

			// -- Windows -------------------------------------------------
			"wm/createWindow" => parse_params::<CreateWindowParams>(req.params).and_then(|p| {
				let title = p.title.unwrap_or_else(|| p.window_type.clone());
				let id = self
					.wm
					.create_window(&p.window_type, &title, p.options, p.workspace)?;
				Ok(serde_json::json!({ "id": id }))
			}),
			"wm/closeWindow" => parse_params::<WindowIdParams>(req.params).and_then(|p| {
				self.wm.close_window(p.id)?;
				Ok(serde_json::json!({}))
			}),
			"wm/getWindow" => parse_params::<WindowIdParams>(req.params).and_then(|p| {
				serde_json::to_value(self.wm.get_window(p.id)).map_err(WmError::from)
			}),
			"wm/listWindows" => {
				let windows: Vec<_> = self.wm.windows().collect();
				Ok(serde_json::json!({ "windows": windows }))
			}
			"wm/getActiveWindow" => {
				serde_json::to_value(self.wm.get_active_window()).map_err(WmError::from)
			}
			"wm/focusWindow" => parse_params::<WindowIdParams>(req.params).and_then(|p| {
				self.wm.focus_window(p.id)?;
				Ok(serde_json::json!({}))
			}),
			"wm/minimizeWindow" => parse_params::<WindowIdParams>(req.params).and_then(|p| {
				self.wm.minimize_window(p.id)?;
				Ok(serde_json::json!({}))
			}),
			"wm/toggleMaximize" => parse_params::<WindowIdParams>(req.params).and_then(|p| {
				let maximized = self.wm.toggle_maximize(p.id)?;
				Ok(serde_json::json!({ "maximized": maximized }))
			}),
			"wm/setPosition" => parse_params::<PositionParams>(req.params).and_then(|p| {
				let rect = self.wm.set_position(p.id, p.x, p.y)?;
				Ok(serde_json::to_value(rect)?)
			}),
			"wm/setSize" => parse_params::<SizeParams>(req.params).and_then(|p| {
				let rect = self.wm.set_size(p.id, p.width, p.height)?;
				Ok(serde_json::to_value(rect)?)
			}),
			"wm/forceVisibility" => {
				let changed = self.wm.force_window_visibility();
				Ok(serde_json::json!({ "changed": changed }))
			}
			"wm/setViewport" => parse_params::<ViewportParams>(req.params).and_then(|p| {
				self.wm.set_viewport(p.width, p.height);
				Ok(serde_json::to_value(self.wm.viewport())?)
			}),

			// -- Workspaces ----------------------------------------------
			"wm/switchWorkspace" => parse_params::<WorkspaceParams>(req.params).and_then(|p| {
				self.wm.switch_to_workspace(p.workspace)?;
				Ok(serde_json::json!({ "workspace": self.wm.current_workspace() }))
			}),
			"wm/moveToWorkspace" => {
				parse_params::<MoveToWorkspaceParams>(req.params).and_then(|p| {
					self.wm.move_window_to_workspace(p.id, p.workspace)?;
					Ok(serde_json::json!({}))
				})
			}
			"wm/initializeWorkspace" => {
				parse_params::<InitializeWorkspaceParams>(req.params).and_then(|p| {
					let window_type = p.window_type.as_deref().unwrap_or("terminal");
					let id = self.wm.initialize_workspace(p.workspace, window_type)?;
					Ok(serde_json::json!({ "id": id }))
				})
			}
			"wm/listWorkspaces" => Ok(serde_json::json!({
				"current": self.wm.current_workspace(),
				"workspaces": self.wm.workspaces(),
			})),
			"wm/recordMembership" => parse_params::<MembershipParams>(req.params).and_then(|p| {
				self.wm.record_membership(p.workspace, p.id)?;
				Ok(serde_json::json!({}))
			}),

			// -- Layout --------------------------------------------------
			"wm/tile" => parse_optional_params::<TileParams>(req.params).and_then(|p| {
				let layout = match p.layout {
					Some(name) => name.parse::<Layout>()?,
					None => Layout::default(),
				};
				let windows = self.wm.tile_windows(layout);
				Ok(serde_json::json!({ "layout": layout, "windows": windows }))
			}),
			"wm/beginDrag" => parse_params::<WindowIdParams>(req.params).and_then(|p| {
				self.wm.begin_drag(p.id)?;
				Ok(serde_json::json!({}))
			}),
			"wm/dragTo" => parse_params::<PointParams>(req.params).and_then(|p| {
				let decision = self.wm.drag_to(p.x, p.y)?;
				Ok(serde_json::to_value(decision)?)
			}),
			"wm/endDrag" => self
				.wm
				.end_drag()
				.map(|target| serde_json::json!({ "snapped": target })),

			// -- Maintenance ---------------------------------------------
			"wm/verifyIntegrity" => {
				let report = self.wm.verify_workspace_integrity();
				Ok(serde_json::json!({ "report": report, "clean": report.is_clean() }))
			}
			"wm/repair" => {
				let windows = self.wm.repair_window_manager();
				Ok(serde_json::json!({ "windows": windows }))
			}
			"wm/reinitialize" => self
				.wm
				.reinitialize()
				.map(|id| serde_json::json!({ "id": id })),

			_ => {
				self.transport.write_error(
					id,
					METHOD_NOT_FOUND,
					format!("Unknown method: {}", req.method),
					None,
				);
				return;
			}
		};

		let events = self.wm.drain_events();
		self.transport.write_events("wm/event", events);

		match result {
			Ok(value) => self.transport.write_response(id, value),
			Err(WmError::Json(e)) => {
				self.transport
					.write_error(id, INVALID_PARAMS, format!("Invalid params: {}", e), None)
			}
			Err(e) => self.transport.write_error(
				id,
				WM_ERROR,
				e.to_string(),
				Some(e.to_json_rpc_error()),
			),
		}
	}

	// ── Initialize ────────────────────────────────────────────────────────

	/// Replace the registry with an empty one, overriding the startup
	/// configuration with any provided params.
	fn handle_initialize(&mut self, params: serde_json::Value) -> Result<serde_json::Value, WmError> {
		let p: InitializeParams = parse_optional_params(params)?;

		let mut config = self.config.clone();
		if let Some(count) = p.workspaces {
			if count == 0 || count > MAX_WORKSPACES {
				return Err(WmError::InvalidOperation(format!(
					"Workspace count {} outside 1..={}",
					count, MAX_WORKSPACES
				)));
			}
			config.workspace_count = count;
		}
		if let Some(width) = p.width {
			config.viewport.width = width;
		}
		if let Some(height) = p.height {
			config.viewport.height = height;
		}
		if let Some(margin) = p.bottom_margin {
			config.viewport.bottom_margin = margin;
		}
		if let Some(threshold) = p.snap_threshold {
			config.snap_threshold = threshold;
		}

		self.wm = WindowManager::new(config);
		tracing::info!(
			workspaces = self.wm.workspace_count(),
			width = self.wm.viewport().width,
			height = self.wm.viewport().height,
			"Window manager initialized"
		);

		Ok(serde_json::json!({
			"workspaces": self.wm.workspace_count(),
			"viewport": self.wm.viewport(),
		}))
	}
}

fn parse_params<T: serde::de::DeserializeOwned>(params: serde_json::Value) -> Result<T, WmError> {
	Ok(serde_json::from_value(params)?)
}

fn parse_optional_params<T: serde::de::DeserializeOwned + Default>(
	params: serde_json::Value,
) -> Result<T, WmError> {
	if params.is_null() {
		return Ok(T::default());
	}
	parse_params(params)
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use super::*;
	use serde_json::Value;

	fn server() -> WmServer<Vec<u8>> {
		WmServer::new(NdjsonTransport::new(Vec::new()), WmConfig::default())
	}

	fn output(server: WmServer<Vec<u8>>) -> Vec<Value> {
		let out = server.into_transport().into_inner();
		String::from_utf8(out)
			.unwrap()
			.lines()
			.map(|l| serde_json::from_str(l).unwrap())
			.collect()
	}

	fn responses(lines: &[Value]) -> Vec<&Value> {
		lines.iter().filter(|l| l.get("id").is_some()).collect()
	}

	#[test]
	fn create_emits_events_before_response() {
		let mut s = server();
		s.handle_line(r#"{"jsonrpc":"2.0","id":1,"method":"wm/createWindow","params":{"type":"terminal"}}"#);
		let out = output(s);
		assert_eq!(out.len(), 4);
		assert_eq!(out[0]["method"], "wm/event");
		assert_eq!(out[0]["params"]["type"], "created");
		assert_eq!(out[0]["params"]["windowType"], "terminal");
		assert_eq!(out[1]["params"]["type"], "focused");
		assert_eq!(out[2]["params"]["type"], "contentReady");
		assert_eq!(out[3]["id"], 1);
		assert_eq!(out[3]["result"]["id"], 1);
	}

	#[test]
	fn get_window_reports_record_or_null() {
		let mut s = server();
		s.handle_line(r#"{"jsonrpc":"2.0","id":1,"method":"wm/createWindow","params":{"type":"text","title":"Notes"}}"#);
		s.handle_line(r#"{"jsonrpc":"2.0","id":2,"method":"wm/getWindow","params":{"id":1}}"#);
		s.handle_line(r#"{"jsonrpc":"2.0","id":3,"method":"wm/getWindow","params":{"id":9}}"#);
		let out = output(s);
		let r = responses(&out);
		assert_eq!(r[1]["result"]["title"], "Notes");
		assert_eq!(r[1]["result"]["type"], "text");
		assert_eq!(r[1]["result"]["content"]["kind"], "textEditor");
		assert!(r[2]["result"].is_null());
	}

	#[test]
	fn wm_errors_carry_code() {
		let mut s = server();
		s.handle_line(r#"{"jsonrpc":"2.0","id":5,"method":"wm/switchWorkspace","params":{"workspace":7}}"#);
		s.handle_line(r#"{"jsonrpc":"2.0","id":6,"method":"wm/closeWindow","params":{"id":3}}"#);
		let out = output(s);
		assert_eq!(out[0]["error"]["code"], WM_ERROR);
		assert_eq!(out[0]["error"]["data"]["wmCode"], "WM_OUT_OF_RANGE");
		assert_eq!(out[1]["error"]["data"]["wmCode"], "WM_NOT_FOUND");
	}

	#[test]
	fn bad_params_and_unknown_layout() {
		let mut s = server();
		s.handle_line(r#"{"jsonrpc":"2.0","id":1,"method":"wm/setSize","params":{"id":1}}"#);
		s.handle_line(r#"{"jsonrpc":"2.0","id":2,"method":"wm/tile","params":{"layout":"spiral"}}"#);
		let out = output(s);
		let r = responses(&out);
		assert_eq!(r[0]["error"]["code"], INVALID_PARAMS);
		assert_eq!(r[1]["error"]["data"]["wmCode"], "WM_INVALID_OPERATION");
	}

	#[test]
	fn unknown_method_and_garbage() {
		let mut s = server();
		s.handle_line(r#"{"jsonrpc":"2.0","id":4,"method":"wm/nope"}"#);
		s.handle_line("not json");
		s.handle_line("   ");
		let out = output(s);
		assert_eq!(out.len(), 2);
		assert_eq!(out[0]["error"]["code"], METHOD_NOT_FOUND);
		assert_eq!(out[1]["error"]["code"], INTERNAL_ERROR);
	}

	#[test]
	fn purge_notifies_removal() {
		let mut s = server();
		s.handle_line(r#"{"jsonrpc":"2.0","id":1,"method":"wm/createWindow","params":{"type":"terminal"}}"#);
		s.handle_line(r#"{"jsonrpc":"2.0","id":2,"method":"wm/closeWindow","params":{"id":1}}"#);
		s.purge(Instant::now() + Duration::from_secs(1));
		assert!(s.manager().get_window(1).is_none());

		let out = output(s);
		let last = out.last().unwrap();
		assert_eq!(last["method"], "wm/event");
		assert_eq!(last["params"]["type"], "removed");
		assert_eq!(last["params"]["id"], 1);
	}

	#[test]
	fn initialize_overrides_workspace_count() {
		let mut s = server();
		s.handle_line(r#"{"jsonrpc":"2.0","id":1,"method":"wm/initialize","params":{"workspaces":3,"width":1280}}"#);
		s.handle_line(r#"{"jsonrpc":"2.0","id":2,"method":"wm/listWorkspaces"}"#);
		let out = output(s);
		assert_eq!(out[0]["result"]["workspaces"], 3);
		assert_eq!(out[0]["result"]["viewport"]["width"], 1280.0);
		let spaces = out[1]["result"]["workspaces"].as_array().unwrap();
		assert_eq!(spaces.len(), 3);
		assert_eq!(spaces[0]["name"], "Welcome to Hyprfolio");
		assert_eq!(spaces[0]["active"], true);
	}

	#[test]
	fn initialize_rejects_oversized_workspace_count() {
		let mut s = server();
		s.handle_line(r#"{"jsonrpc":"2.0","id":1,"method":"wm/initialize","params":{"workspaces":18446744073709551615}}"#);
		s.handle_line(r#"{"jsonrpc":"2.0","id":2,"method":"wm/initialize","params":{"workspaces":0}}"#);
		s.handle_line(r#"{"jsonrpc":"2.0","id":3,"method":"wm/listWorkspaces"}"#);
		assert_eq!(s.manager().workspace_count(), 6);

		let out = output(s);
		assert_eq!(out[0]["error"]["code"], WM_ERROR);
		assert_eq!(out[0]["error"]["data"]["wmCode"], "WM_INVALID_OPERATION");
		assert_eq!(out[1]["error"]["data"]["wmCode"], "WM_INVALID_OPERATION");
		assert_eq!(out[2]["result"]["workspaces"].as_array().unwrap().len(), 6);
	}

	#[tokio::test]
	async fn run_serves_until_eof() {
		let input = concat!(
			r#"{"jsonrpc":"2.0","id":1,"method":"wm/createWindow","params":{"type":"terminal"}}"#,
			"\n",
			r#"{"jsonrpc":"2.0","id":2,"method":"wm/listWindows"}"#,
			"\n",
		);
		let mut s = server();
		s.run(input.as_bytes()).await.unwrap();

		let out = output(s);
		let r = responses(&out);
		assert_eq!(r.len(), 2);
		assert_eq!(r[1]["result"]["windows"][0]["id"], 1);
	}
}
