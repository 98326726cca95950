// ---------------------------------------------------------------------------
// Integration tests for hyprfolio-wm-engine
//
// Each test spawns the binary, communicates over JSON-RPC 2.0 / NDJSON stdio,
// and verifies responses and `wm/event` notifications.
// ---------------------------------------------------------------------------

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Helper
// ---------------------------------------------------------------------------

struct WmProcess {
    child: Child,
    reader: BufReader<std::process::ChildStdout>,
    next_id: AtomicU64,
    events: Vec<Value>,
}

impl WmProcess {
    fn spawn(args: &[&str]) -> Self {
        let bin = env!("CARGO_BIN_EXE_hyprfolio-wm-engine");
        let mut child = Command::new(bin)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .expect("failed to spawn hyprfolio-wm-engine");

        let stdout = child.stdout.take().expect("no stdout");

        Self {
            child,
            reader: BufReader::new(stdout),
            next_id: AtomicU64::new(1),
            events: Vec::new(),
        }
    }

    fn send(&mut self, method: &str, params: Value) -> Result<Value, Value> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let stdin = self.child.stdin.as_mut().expect("no stdin");
        let mut line = serde_json::to_string(&request).unwrap();
        line.push('\n');
        stdin.write_all(line.as_bytes()).unwrap();
        stdin.flush().unwrap();

        loop {
            let mut buf = String::new();
            let bytes_read = self
                .reader
                .read_line(&mut buf)
                .expect("failed to read from stdout");
            if bytes_read == 0 {
                panic!("unexpected EOF while waiting for response to id={}", id);
            }
            let buf = buf.trim();
            if buf.is_empty() {
                continue;
            }
            let parsed: Value = serde_json::from_str(buf)
                .unwrap_or_else(|e| panic!("invalid JSON from engine: {e}\nline: {buf}"));

            if parsed.get("id").is_none() {
                self.events.push(parsed);
                continue;
            }
            assert_eq!(parsed["id"].as_u64(), Some(id), "response id mismatch");

            return match parsed.get("error") {
                Some(error) => Err(error.clone()),
                None => Ok(parsed.get("result").cloned().unwrap_or(Value::Null)),
            };
        }
    }

    fn call(&mut self, method: &str, params: Value) -> Value {
        self.send(method, params)
            .unwrap_or_else(|e| panic!("expected success, got error: {e}"))
    }

    fn call_err(&mut self, method: &str, params: Value) -> Value {
        match self.send(method, params) {
            Err(e) => e,
            Ok(v) => panic!("expected error, got success: {v}"),
        }
    }

    fn create(&mut self, params: Value) -> u64 {
        self.call("wm/createWindow", params)["id"].as_u64().unwrap()
    }

    fn saw_event(&self, kind: &str) -> bool {
        self.events.iter().any(|e| e["params"]["type"] == kind)
    }
}

impl Drop for WmProcess {
    fn drop(&mut self) {
        drop(self.child.stdin.take());
        let _ = self.child.wait();
    }
}

fn window_ids(value: &Value) -> Vec<u64> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_u64().unwrap())
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn workspace_membership_survives_switch() {
    let mut proc = WmProcess::spawn(&[]);
    let first = proc.create(json!({"type": "terminal"}));
    let other = proc.create(json!({"type": "terminal", "workspace": 2}));
    assert!(other > first);

    let spaces = proc.call("wm/listWorkspaces", json!({}));
    assert_eq!(window_ids(&spaces["workspaces"][0]["windows"]), vec![first]);
    assert_eq!(window_ids(&spaces["workspaces"][1]["windows"]), vec![other]);

    proc.call("wm/switchWorkspace", json!({"workspace": 2}));
    let spaces = proc.call("wm/listWorkspaces", json!({}));
    assert_eq!(spaces["current"], 2);
    assert_eq!(window_ids(&spaces["workspaces"][1]["windows"]), vec![other]);

    let active = proc.call("wm/getActiveWindow", json!({}));
    assert_eq!(active["id"], other);
    assert!(proc.saw_event("workspaceSwitched"));
}

#[test]
fn out_of_range_and_unknown_window_errors() {
    let mut proc = WmProcess::spawn(&["--workspaces", "3"]);
    let err = proc.call_err("wm/switchWorkspace", json!({"workspace": 4}));
    assert_eq!(err["data"]["wmCode"], "WM_OUT_OF_RANGE");

    let err = proc.call_err("wm/closeWindow", json!({"id": 99}));
    assert_eq!(err["data"]["wmCode"], "WM_NOT_FOUND");

    let err = proc.call_err("wm/endDrag", json!({}));
    assert_eq!(err["data"]["wmCode"], "WM_NO_ACTIVE_DRAG");
}

#[test]
fn closed_window_purged_by_timer() {
    let mut proc = WmProcess::spawn(&["--close-grace-ms", "200", "--purge-interval-ms", "10"]);
    let id = proc.create(json!({"type": "terminal"}));
    proc.call("wm/closeWindow", json!({"id": id}));

    let closing = proc.call("wm/getWindow", json!({"id": id}));
    assert_eq!(closing["state"], "closing");

    std::thread::sleep(Duration::from_millis(700));
    let gone = proc.call("wm/getWindow", json!({"id": id}));
    assert!(gone.is_null());
    assert!(proc.saw_event("removed"));
}

#[test]
fn grid_tiling_splits_usable_area() {
    let mut proc = WmProcess::spawn(&["--width", "1200", "--height", "810"]);
    for _ in 0..4 {
        proc.create(json!({"type": "terminal"}));
    }
    let tiled = proc.call("wm/tile", json!({"layout": "grid"}));
    assert_eq!(tiled["windows"].as_array().unwrap().len(), 4);

    let list = proc.call("wm/listWindows", json!({}));
    for w in list["windows"].as_array().unwrap() {
        assert_eq!(w["width"], 600.0);
        assert_eq!(w["height"], 400.0);
        assert_eq!(w["snapped"], true);
    }
}

#[test]
fn snap_left_tiles_sibling_right() {
    let mut proc = WmProcess::spawn(&["--width", "1000", "--height", "810"]);
    let a = proc.create(json!({"type": "text", "options": {"x": 300, "y": 100, "width": 400, "height": 300}}));
    let b = proc.create(json!({"type": "text", "options": {"x": 500, "y": 300, "width": 400, "height": 300}}));

    proc.call("wm/beginDrag", json!({"id": b}));
    let decision = proc.call("wm/dragTo", json!({"x": 12, "y": 300}));
    assert_eq!(decision["x"], 0.0);
    assert_eq!(decision["target"]["edge"], "left");
    assert_eq!(decision["target"]["kind"], "screen");

    let released = proc.call("wm/endDrag", json!({}));
    assert_eq!(released["snapped"]["edge"], "left");

    let wb = proc.call("wm/getWindow", json!({"id": b}));
    assert_eq!((wb["x"].as_f64(), wb["width"].as_f64()), (Some(0.0), Some(500.0)));
    assert_eq!(wb["height"], 800.0);
    let wa = proc.call("wm/getWindow", json!({"id": a}));
    assert_eq!((wa["x"].as_f64(), wa["width"].as_f64()), (Some(500.0), Some(500.0)));
    assert_eq!(wa["edges"]["right"], true);
    assert!(proc.saw_event("snapped"));
}

#[test]
fn integrity_fixes_duplicate_once() {
    let mut proc = WmProcess::spawn(&[]);
    let id = proc.create(json!({"type": "terminal"}));
    proc.call("wm/recordMembership", json!({"workspace": 3, "id": id}));
    proc.call("wm/recordMembership", json!({"workspace": 4, "id": 77}));

    let first = proc.call("wm/verifyIntegrity", json!({}));
    assert_eq!(first["report"]["duplicatesRemoved"], 1);
    assert_eq!(first["report"]["danglingDropped"], 1);
    assert_eq!(first["clean"], false);

    let second = proc.call("wm/verifyIntegrity", json!({}));
    assert_eq!(second["clean"], true);
}

#[test]
fn repair_preserves_type_title_and_workspace() {
    let mut proc = WmProcess::spawn(&[]);
    let a = proc.create(json!({"type": "text", "title": "Notes"}));
    let b = proc.create(json!({"type": "terminal", "workspace": 4}));

    let repaired = proc.call("wm/repair", json!({}));
    let pairs = repaired["windows"].as_array().unwrap();
    assert_eq!(pairs.len(), 2);
    assert_eq!(pairs[0]["old"], a);
    assert_eq!(pairs[1]["old"], b);

    let new_a = pairs[0]["new"].as_u64().unwrap();
    let new_b = pairs[1]["new"].as_u64().unwrap();
    let w = proc.call("wm/getWindow", json!({"id": new_a}));
    assert_eq!(w["type"], "text");
    assert_eq!(w["title"], "Notes");

    let spaces = proc.call("wm/listWorkspaces", json!({}));
    assert_eq!(window_ids(&spaces["workspaces"][3]["windows"]), vec![new_b]);
    assert!(proc.call("wm/getWindow", json!({"id": a})).is_null());
}

#[test]
fn initialize_workspace_opens_profile_window() {
    let mut proc = WmProcess::spawn(&[]);
    let id = proc.call("wm/initializeWorkspace", json!({"workspace": 3}))["id"]
        .as_u64()
        .unwrap();

    let w = proc.call("wm/getWindow", json!({"id": id}));
    assert_eq!(w["title"], "Projects");
    assert_eq!(w["maximized"], true);
    assert_eq!(w["height"], 1070.0);

    let run = proc
        .events
        .iter()
        .find(|e| e["params"]["type"] == "runCommand")
        .expect("no runCommand event");
    assert_eq!(run["params"]["command"], "projects");
    assert_eq!(run["params"]["window"], id);
}

#[test]
fn reinitialize_leaves_single_terminal() {
    let mut proc = WmProcess::spawn(&[]);
    proc.create(json!({"type": "text"}));
    proc.create(json!({"type": "text", "workspace": 5}));

    let id = proc.call("wm/reinitialize", json!({}))["id"].as_u64().unwrap();
    let list = proc.call("wm/listWindows", json!({}));
    let windows = list["windows"].as_array().unwrap();
    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0]["id"], id);
    assert_eq!(windows[0]["title"], "Terminal");
}
