use serde::Deserialize;

use crate::window::{WindowId, WindowOptions};

// ── JSON-RPC 2.0 error codes ────────────────────────────────────────────────

pub const INTERNAL_ERROR: i32 = -32603;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const WM_ERROR: i32 = -32000;

// ── Incoming request ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub id: u64,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

// ── Params ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    pub workspaces: Option<usize>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub bottom_margin: Option<f64>,
    pub snap_threshold: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWindowParams {
    #[serde(rename = "type")]
    pub window_type: String,
    pub title: Option<String>,
    #[serde(default)]
    pub options: WindowOptions,
    pub workspace: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct WindowIdParams {
    pub id: WindowId,
}

#[derive(Debug, Deserialize)]
pub struct PositionParams {
    pub id: WindowId,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Deserialize)]
pub struct SizeParams {
    pub id: WindowId,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Deserialize)]
pub struct ViewportParams {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Deserialize)]
pub struct WorkspaceParams {
    pub workspace: usize,
}

#[derive(Debug, Deserialize)]
pub struct MoveToWorkspaceParams {
    pub id: WindowId,
    pub workspace: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeWorkspaceParams {
    pub workspace: usize,
    #[serde(rename = "type")]
    pub window_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MembershipParams {
    pub workspace: usize,
    pub id: WindowId,
}

#[derive(Debug, Default, Deserialize)]
pub struct TileParams {
    pub layout: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PointParams {
    pub x: f64,
    pub y: f64,
}
