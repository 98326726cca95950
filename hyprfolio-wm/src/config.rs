use std::time::Duration;

use clap::Parser;

use crate::geometry::Viewport;
use crate::snap::DEFAULT_SNAP_THRESHOLD;

/// Upper bound on the number of workspaces a manager holds.
pub const MAX_WORKSPACES: usize = 64;

#[derive(Parser, Debug)]
#[command(name = "hyprfolio-wm-engine", about = "Workspace and window registry over JSON-RPC stdio")]
pub struct CliArgs {
	/// Number of workspaces
	#[arg(
		long,
		default_value = "6",
		env = "HYPRFOLIO_WM_WORKSPACES",
		value_parser = clap::value_parser!(u16).range(1..=MAX_WORKSPACES as i64)
	)]
	pub workspaces: u16,

	/// Desktop container width in pixels
	#[arg(long, default_value = "1920", env = "HYPRFOLIO_WM_WIDTH")]
	pub width: f64,

	/// Desktop container height in pixels
	#[arg(long, default_value = "1080", env = "HYPRFOLIO_WM_HEIGHT")]
	pub height: f64,

	/// Space kept free at the bottom of the screen
	#[arg(long, default_value = "10")]
	pub bottom_margin: f64,

	/// Distance in pixels at which a dragged window snaps
	#[arg(long, default_value = "25", env = "HYPRFOLIO_WM_SNAP_THRESHOLD")]
	pub snap_threshold: f64,

	/// Milliseconds a closed window stays resolvable before it is purged
	#[arg(long, default_value = "250", env = "HYPRFOLIO_WM_CLOSE_GRACE_MS")]
	pub close_grace_ms: u64,

	/// How often closed windows are purged, in milliseconds
	#[arg(long, default_value = "50")]
	pub purge_interval_ms: u64,

	/// Log level (trace, debug, info, warn, error)
	#[arg(long, default_value = "info", env = "HYPRFOLIO_WM_LOG_LEVEL")]
	pub log_level: String,
}

// ---------------------------------------------------------------------------
// Workspace profiles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceLayout {
	/// One maximized window covering the usable area.
	Fixed,
	/// A normal window near the top-left corner.
	Cascaded,
}

/// What `initialize_workspace` opens in a workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceProfile {
	pub name: String,
	pub command: Option<String>,
	pub layout: WorkspaceLayout,
}

impl WorkspaceProfile {
	pub fn new(name: &str, command: Option<&str>, layout: WorkspaceLayout) -> Self {
		Self {
			name: name.to_string(),
			command: command.map(str::to_string),
			layout,
		}
	}

	/// Profile for a workspace beyond the configured list.
	pub fn fallback(workspace: usize) -> Self {
		Self {
			name: format!("Workspace {}", workspace),
			command: None,
			layout: WorkspaceLayout::Cascaded,
		}
	}
}

pub fn default_profiles() -> Vec<WorkspaceProfile> {
	use WorkspaceLayout::{Cascaded, Fixed};
	vec![
		WorkspaceProfile::new("Welcome to Hyprfolio", Some("neofetch"), Fixed),
		WorkspaceProfile::new("About Me", Some("about"), Fixed),
		WorkspaceProfile::new("Projects", Some("projects"), Fixed),
		WorkspaceProfile::new("Skills", Some("skills"), Fixed),
		WorkspaceProfile::new("Contact", Some("contact"), Fixed),
		WorkspaceProfile::new("Interactive Terminal", Some("help"), Cascaded),
	]
}

// ---------------------------------------------------------------------------
// WmConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct WmConfig {
	pub workspace_count: usize,
	pub viewport: Viewport,
	pub snap_threshold: f64,
	pub close_grace: Duration,
	pub purge_interval: Duration,
	pub profiles: Vec<WorkspaceProfile>,
}

impl WmConfig {
	/// Profile for a 1-based workspace id.
	pub fn profile(&self, workspace: usize) -> WorkspaceProfile {
		workspace
			.checked_sub(1)
			.and_then(|i| self.profiles.get(i))
			.cloned()
			.unwrap_or_else(|| WorkspaceProfile::fallback(workspace))
	}
}

impl Default for WmConfig {
	fn default() -> Self {
		Self {
			workspace_count: 6,
			viewport: Viewport::default(),
			snap_threshold: DEFAULT_SNAP_THRESHOLD,
			close_grace: Duration::from_millis(250),
			purge_interval: Duration::from_millis(50),
			profiles: default_profiles(),
		}
	}
}

impl From<&CliArgs> for WmConfig {
	fn from(args: &CliArgs) -> Self {
		Self {
			workspace_count: usize::from(args.workspaces).clamp(1, MAX_WORKSPACES),
			viewport: Viewport {
				width: args.width,
				height: args.height,
				bottom_margin: args.bottom_margin,
			},
			snap_threshold: args.snap_threshold,
			close_grace: Duration::from_millis(args.close_grace_ms),
			purge_interval: Duration::from_millis(args.purge_interval_ms.max(1)),
			profiles: default_profiles(),
		}
	}
}
