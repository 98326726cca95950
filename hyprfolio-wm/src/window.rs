use std::time::Instant;

use serde::{Deserialize, Serialize, Serializer};

use crate::error::WmError;
use crate::geometry::{EdgeTags, Rect, SizeLimits};

pub type WindowId = u64;

pub const DEFAULT_WIDTH: f64 = 800.0;
pub const DEFAULT_HEIGHT: f64 = 600.0;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Caller-supplied creation options. Anything left unset falls back to the
/// window defaults; an unset `x` or `y` triggers cascade placement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowOptions {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub x: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub y: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub width: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub height: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub min_width: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub min_height: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub max_width: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub max_height: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub resizable: Option<bool>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub maximized: Option<bool>,
}

impl WindowOptions {
	pub fn at(mut self, x: f64, y: f64) -> Self {
		self.x = Some(x);
		self.y = Some(y);
		self
	}

	pub fn sized(mut self, width: f64, height: f64) -> Self {
		self.width = Some(width);
		self.height = Some(height);
		self
	}

	pub fn has_position(&self) -> bool {
		self.x.is_some() && self.y.is_some()
	}
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentKind {
	Terminal,
	TextEditor,
	Generic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum WindowContent {
	Ready { kind: ContentKind },
	/// Content creation failed; the window stays and shows an error placeholder.
	Fallback { message: String },
}

/// Builds the content a new window displays. The registry never rolls a
/// window back when this fails.
pub trait ContentFactory {
	fn create(&self, id: WindowId, window_type: &str) -> Result<ContentKind, WmError>;
}

/// Terminal and text windows get their dedicated content, anything else a
/// generic panel.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinContent;

impl ContentFactory for BuiltinContent {
	fn create(&self, _id: WindowId, window_type: &str) -> Result<ContentKind, WmError> {
		Ok(match window_type {
			"terminal" => ContentKind::Terminal,
			"text" => ContentKind::TextEditor,
			_ => ContentKind::Generic,
		})
	}
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
	Open,
	/// Out of every workspace, but still resolvable by id until `purge_at`.
	Closing { purge_at: Instant },
}

impl Serialize for WindowState {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(match self {
			Self::Open => "open",
			Self::Closing { .. } => "closing",
		})
	}
}

// ---------------------------------------------------------------------------
// WindowRecord
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowRecord {
	pub id: WindowId,
	#[serde(rename = "type")]
	pub window_type: String,
	pub title: String,
	#[serde(flatten)]
	pub rect: Rect,
	#[serde(flatten)]
	pub limits: SizeLimits,
	pub resizable: bool,
	pub maximized: bool,
	pub focused: bool,
	pub minimized: bool,
	pub snapped: bool,
	pub edges: EdgeTags,
	pub content: WindowContent,
	pub state: WindowState,
	#[serde(skip)]
	pub(crate) restore: Option<Rect>,
	#[serde(skip)]
	pub(crate) touched: u64,
}

impl WindowRecord {
	/// Build a record from resolved options. `x`/`y` must already be placed.
	pub(crate) fn new(id: WindowId, window_type: &str, title: &str, options: &WindowOptions) -> Self {
		let defaults = SizeLimits::default();
		Self {
			id,
			window_type: window_type.to_string(),
			title: title.to_string(),
			rect: Rect::new(
				options.x.unwrap_or(0.0),
				options.y.unwrap_or(0.0),
				options.width.unwrap_or(DEFAULT_WIDTH),
				options.height.unwrap_or(DEFAULT_HEIGHT),
			),
			limits: SizeLimits {
				min_width: options.min_width.unwrap_or(defaults.min_width),
				min_height: options.min_height.unwrap_or(defaults.min_height),
				max_width: options.max_width,
				max_height: options.max_height,
			},
			resizable: options.resizable.unwrap_or(true),
			maximized: options.maximized.unwrap_or(false),
			focused: false,
			minimized: false,
			snapped: false,
			edges: EdgeTags::default(),
			content: WindowContent::Fallback {
				message: "Content not created yet".to_string(),
			},
			state: WindowState::Open,
			restore: None,
			touched: 0,
		}
	}

	pub fn is_open(&self) -> bool {
		self.state == WindowState::Open
	}

	/// Open and not minimized.
	pub fn is_visible(&self) -> bool {
		self.is_open() && !self.minimized
	}

	/// Current geometry and flags as creation options, so the window can be
	/// rebuilt exactly.
	pub fn options(&self) -> WindowOptions {
		WindowOptions {
			x: Some(self.rect.x),
			y: Some(self.rect.y),
			width: Some(self.rect.width),
			height: Some(self.rect.height),
			min_width: Some(self.limits.min_width),
			min_height: Some(self.limits.min_height),
			max_width: self.limits.max_width,
			max_height: self.limits.max_height,
			resizable: Some(self.resizable),
			maximized: Some(self.maximized),
		}
	}
}
