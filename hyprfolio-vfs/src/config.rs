use clap::Parser;

use crate::path::VfsLimits;

#[derive(Parser, Debug)]
#[command(name = "hyprfolio-vfs-engine", about = "In-memory virtual file system over JSON-RPC stdio")]
pub struct CliArgs {
	/// User whose home directory is seeded and used as the starting directory
	#[arg(long, default_value = "guest", env = "HYPRFOLIO_VFS_USER")]
	pub user: String,

	/// Start with an empty tree instead of the seeded home layout
	#[arg(long)]
	pub no_seed: bool,

	/// Maximum number of nodes (root included)
	#[arg(long, default_value = "10000", env = "HYPRFOLIO_VFS_MAX_NODES")]
	pub max_nodes: usize,

	/// Maximum path depth
	#[arg(long, default_value = "32")]
	pub max_depth: usize,

	/// Maximum length of a single file or directory name
	#[arg(long, default_value = "255")]
	pub max_name_length: usize,

	/// Log level (trace, debug, info, warn, error)
	#[arg(long, default_value = "info", env = "HYPRFOLIO_VFS_LOG_LEVEL")]
	pub log_level: String,
}

/// Settings a [`VirtualFs`](crate::vfs::VirtualFs) is built from.
#[derive(Debug, Clone)]
pub struct VfsConfig {
	pub user: String,
	pub seed: bool,
	pub limits: VfsLimits,
}

impl Default for VfsConfig {
	fn default() -> Self {
		Self {
			user: "guest".to_string(),
			seed: true,
			limits: VfsLimits::default(),
		}
	}
}

impl From<&CliArgs> for VfsConfig {
	fn from(args: &CliArgs) -> Self {
		Self {
			user: args.user.clone(),
			seed: !args.no_seed,
			limits: VfsLimits {
				max_path_depth: args.max_depth,
				max_name_length: args.max_name_length,
				max_node_count: args.max_nodes,
			},
		}
	}
}
