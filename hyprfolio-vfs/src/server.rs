// ---------------------------------------------------------------------------
// VfsServer — JSON-RPC dispatcher
// ---------------------------------------------------------------------------
//
// Routes incoming JSON-RPC 2.0 requests (NDJSON, one per line) to VirtualFs
// operations. Events produced by a request are flushed as `vfs/event`
// notifications before the response line.
// ---------------------------------------------------------------------------

use std::io::{BufRead, Write};

use crate::config::VfsConfig;
use crate::error::VfsError;
use crate::path::VfsLimits;
use crate::protocol::*;
use crate::transport::NdjsonTransport;
use crate::vfs::VirtualFs;

pub struct VfsServer<W: Write> {
	transport: NdjsonTransport<W>,
	config: VfsConfig,
	vfs: VirtualFs,
}

impl<W: Write> VfsServer<W> {
	/// Create a server whose file system is built from `config`.
	pub fn new(transport: NdjsonTransport<W>, config: VfsConfig) -> Result<Self, VfsError> {
		let mut vfs = VirtualFs::from_config(&config)?;
		// Seeding noise is not interesting to a client that has not connected yet.
		vfs.drain_events();
		Ok(Self {
			transport,
			config,
			vfs,
		})
	}

	pub fn into_transport(self) -> NdjsonTransport<W> {
		self.transport
	}

	/// Main loop: read JSON-RPC messages line by line until EOF.
	pub fn run<R: BufRead>(&mut self, reader: R) -> Result<(), VfsError> {
		for line_result in reader.lines() {
			let line = line_result?;
			let trimmed = line.trim();
			if trimmed.is_empty() {
				continue;
			}

			match serde_json::from_str::<JsonRpcRequest>(trimmed) {
				Ok(req) => self.dispatch(req),
				Err(e) => {
					tracing::warn!("Parse error: {}", e);
					self.transport.write_error(
						0,
						INTERNAL_ERROR,
						"Parse error: invalid JSON",
						None,
					);
				}
			}
		}

		Ok(())
	}

	// ── Dispatch ──────────────────────────────────────────────────────────

	fn dispatch(&mut self, req: JsonRpcRequest) {
		let id = req.id;
		tracing::debug!(id, method = %req.method, "Dispatching request");

		let result = match req.method.as_str() {
			"vfs/initialize" => self.handle_initialize(req.params),

			// -- Navigation ----------------------------------------------
			"vfs/pwd" => Ok(serde_json::json!({ "path": self.vfs.pwd() })),
			"vfs/cd" => parse_params::<PathParams>(req.params).and_then(|p| {
				self.vfs.cd(&p.path)?;
				Ok(serde_json::json!({ "path": self.vfs.pwd() }))
			}),
			"vfs/ls" => parse_params::<OptionalPathParams>(req.params).and_then(|p| {
				let entries = self.vfs.ls(p.path.as_deref())?;
				Ok(serde_json::json!({ "entries": entries }))
			}),
			"vfs/stat" => parse_params::<PathParams>(req.params).and_then(|p| {
				let info = self.vfs.stat(&p.path)?;
				Ok(serde_json::to_value(info)?)
			}),
			"vfs/resolvePath" => parse_params::<PathParams>(req.params)
				.map(|p| serde_json::json!({ "path": self.vfs.resolve_path(&p.path) })),
			"vfs/complete" => parse_params::<CompleteParams>(req.params).map(|p| {
				serde_json::json!({ "completions": self.vfs.complete_path(&p.partial) })
			}),

			// -- Mutation ------------------------------------------------
			"vfs/mkdir" => parse_params::<PathParams>(req.params).and_then(|p| {
				self.vfs.mkdir(&p.path)?;
				Ok(serde_json::json!({}))
			}),
			"vfs/readFile" => parse_params::<PathParams>(req.params).and_then(|p| {
				let content = self.vfs.read_file(&p.path)?;
				Ok(serde_json::json!({ "content": content }))
			}),
			"vfs/writeFile" => parse_params::<WriteFileParams>(req.params).and_then(|p| {
				self.vfs.write_file(&p.path, &p.content)?;
				Ok(serde_json::json!({}))
			}),
			"vfs/rm" => parse_params::<PathParams>(req.params).and_then(|p| {
				self.vfs.rm(&p.path)?;
				Ok(serde_json::json!({}))
			}),

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

		let events = self.vfs.drain_events();
		self.transport.write_events("vfs/event", events);

		match result {
			Ok(value) => self.transport.write_response(id, value),
			Err(VfsError::Json(e)) => {
				self.transport
					.write_error(id, INVALID_PARAMS, format!("Invalid params: {}", e), None)
			}
			Err(e) => self.transport.write_error(
				id,
				VFS_ERROR,
				e.to_string(),
				Some(e.to_json_rpc_error()),
			),
		}
	}

	// ── Initialize ────────────────────────────────────────────────────────

	/// Rebuild the file system, overriding the startup configuration with any
	/// provided params.
	fn handle_initialize(
		&mut self,
		params: serde_json::Value,
	) -> Result<serde_json::Value, VfsError> {
		let p: InitializeParams = if params.is_null() {
			InitializeParams {
				user: None,
				seed: None,
				limits: None,
			}
		} else {
			parse_params(params)?
		};

		let defaults = &self.config.limits;
		let limits = match p.limits {
			Some(l) => VfsLimits {
				max_path_depth: l.max_path_depth.unwrap_or(defaults.max_path_depth),
				max_name_length: l.max_name_length.unwrap_or(defaults.max_name_length),
				max_node_count: l.max_node_count.unwrap_or(defaults.max_node_count),
			},
			None => defaults.clone(),
		};
		let config = VfsConfig {
			user: p.user.unwrap_or_else(|| self.config.user.clone()),
			seed: p.seed.unwrap_or(self.config.seed),
			limits,
		};

		self.vfs = VirtualFs::from_config(&config)?;
		tracing::info!(user = %config.user, seed = config.seed, "VFS initialized");

		Ok(serde_json::json!({ "cwd": self.vfs.pwd() }))
	}
}

fn parse_params<T: serde::de::DeserializeOwned>(params: serde_json::Value) -> Result<T, VfsError> {
	Ok(serde_json::from_value(params)?)
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::Value;

	fn run(input: &str) -> Vec<Value> {
		let transport = NdjsonTransport::new(Vec::new());
		let mut server = VfsServer::new(transport, VfsConfig::default()).unwrap();
		server.run(input.as_bytes()).unwrap();
		let out = server.into_transport().into_inner();
		String::from_utf8(out)
			.unwrap()
			.lines()
			.map(|l| serde_json::from_str(l).unwrap())
			.collect()
	}

	#[test]
	fn pwd_reports_seeded_home() {
		let out = run(r#"{"jsonrpc":"2.0","id":1,"method":"vfs/pwd"}"#);
		assert_eq!(out[0]["result"]["path"], "/home/guest");
	}

	#[test]
	fn cd_emits_event_before_response() {
		let out = run(r#"{"jsonrpc":"2.0","id":7,"method":"vfs/cd","params":{"path":"/tmp"}}"#);
		assert_eq!(out.len(), 2);
		assert_eq!(out[0]["method"], "vfs/event");
		assert_eq!(out[0]["params"]["type"], "directoryChanged");
		assert_eq!(out[1]["id"], 7);
		assert_eq!(out[1]["result"]["path"], "/tmp");
	}

	#[test]
	fn vfs_errors_carry_code() {
		let out = run(r#"{"jsonrpc":"2.0","id":2,"method":"vfs/readFile","params":{"path":"/nope"}}"#);
		assert_eq!(out[0]["error"]["code"], VFS_ERROR);
		assert_eq!(out[0]["error"]["data"]["vfsCode"], "VFS_NOT_FOUND");
	}

	#[test]
	fn bad_params_are_invalid_params() {
		let out = run(r#"{"jsonrpc":"2.0","id":3,"method":"vfs/mkdir","params":{}}"#);
		assert_eq!(out[0]["error"]["code"], INVALID_PARAMS);
	}

	#[test]
	fn unknown_method_and_garbage() {
		let out = run("{\"jsonrpc\":\"2.0\",\"id\":4,\"method\":\"vfs/nope\"}\nnot json\n");
		assert_eq!(out[0]["error"]["code"], METHOD_NOT_FOUND);
		assert_eq!(out[1]["error"]["code"], INTERNAL_ERROR);
	}

	#[test]
	fn initialize_without_seed_resets_tree() {
		let out = run(concat!(
			r#"{"jsonrpc":"2.0","id":1,"method":"vfs/initialize","params":{"seed":false}}"#,
			"\n",
			r#"{"jsonrpc":"2.0","id":2,"method":"vfs/ls"}"#,
		));
		assert_eq!(out[0]["result"]["cwd"], "/");
		assert_eq!(out[1]["result"]["entries"].as_array().unwrap().len(), 0);
	}
}
