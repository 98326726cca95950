// ---------------------------------------------------------------------------
// In-memory VFS core
// ---------------------------------------------------------------------------
//
// A single owned tree rooted at an unnamed directory, plus the current
// directory pointer. Every operation is synchronous and total: failures come
// back as `VfsError` values and leave the tree untouched.
// ---------------------------------------------------------------------------

use serde::Serialize;

use crate::config::VfsConfig;
use crate::error::VfsError;
use crate::node::{Directory, File, Metadata, Node};
use crate::path::{is_within, normalize_path, resolve_path, segments, split_parent, validate_path, VfsLimits, ROOT};

// ---------------------------------------------------------------------------
// Public result types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirEntry {
	pub name: String,
	pub is_directory: bool,
	pub metadata: Metadata,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
	pub name: String,
	pub metadata: Metadata,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub children: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
	/// The partial input with its final fragment completed. Directories end in `/`.
	pub text: String,
	pub name: String,
	pub is_directory: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum VfsEvent {
	DirectoryChanged { path: String },
	Mkdir { path: String },
	#[serde(rename_all = "camelCase")]
	Write { path: String, size: u64, is_new: bool },
	Remove { path: String },
}

// ---------------------------------------------------------------------------
// VirtualFs
// ---------------------------------------------------------------------------

pub struct VirtualFs {
	root: Node,
	cwd: String,
	limits: VfsLimits,
	node_count: usize,
	pending_events: Vec<VfsEvent>,
}

impl VirtualFs {
	// -- Constructors -----------------------------------------------------

	/// An empty tree: just the root, with the current directory at `/`.
	pub fn new(limits: VfsLimits) -> Self {
		Self {
			root: Node::Directory(Directory::new("")),
			cwd: ROOT.to_string(),
			limits,
			node_count: 1,
			pending_events: Vec::new(),
		}
	}

	/// Build a file system from engine configuration, seeding the home layout
	/// unless disabled.
	pub fn from_config(config: &VfsConfig) -> Result<Self, VfsError> {
		let mut vfs = Self::new(config.limits.clone());
		if config.seed {
			vfs.seed_home(&config.user)?;
		}
		Ok(vfs)
	}

	/// Create the standard directories and the portfolio files under
	/// `/home/<user>`, then move into that home directory. The user must be a
	/// single plain path segment.
	pub fn seed_home(&mut self, user: &str) -> Result<(), VfsError> {
		if matches!(user, "" | "." | "..") || user.contains('/') {
			return Err(VfsError::InvalidPath(format!("/home/{}", user)));
		}
		let home = normalize_path(&format!("/home/{}", user));

		for dir in ["/home", home.as_str(), "/etc", "/bin", "/usr", "/var", "/tmp"] {
			self.mkdir_if_missing(dir)?;
		}

		self.mkdir_if_missing(&format!("{}/about", home))?;
		self.write_file(
			&format!("{}/about/intro.txt", home),
			&format!(
				"Welcome to {user}'s portfolio!\n\nThis is a simulated Arch Linux environment \
				 running the Hyprland window manager. Feel free to explore using terminal commands."
			),
		)?;
		self.mkdir_if_missing(&format!("{}/projects", home))?;
		self.mkdir_if_missing(&format!("{}/skills", home))?;
		self.write_file(
			&format!("{}/welcome.txt", home),
			"Welcome to Hyprfolio!\n\nType \"help\" to see available commands or try \
			 \"about\", \"projects\", or \"skills\" to learn more.",
		)?;
		self.write_file(
			&format!("{}/resume.txt", home),
			&format!(
				"{}\n==========\n\nEDUCATION\n---------\n\nEXPERIENCE\n----------\n\nSKILLS\n------\n",
				user.to_uppercase()
			),
		)?;

		self.cwd = home;
		self.pending_events.clear();
		self.pending_events.push(VfsEvent::DirectoryChanged {
			path: self.cwd.clone(),
		});

		tracing::debug!(cwd = %self.cwd, nodes = self.node_count, "Seeded home layout");
		Ok(())
	}

	// -- Helpers (private) ------------------------------------------------

	fn mkdir_if_missing(&mut self, path: &str) -> Result<(), VfsError> {
		match self.mkdir(path) {
			Ok(()) | Err(VfsError::AlreadyExists(_)) => Ok(()),
			Err(e) => Err(e),
		}
	}

	fn assert_valid_path(&self, normalized: &str) -> Result<(), VfsError> {
		match validate_path(normalized, &self.limits) {
			Some(err) => Err(VfsError::InvalidPath(format!("{}: {}", err, normalized))),
			None => Ok(()),
		}
	}

	fn assert_node_limit(&self) -> Result<(), VfsError> {
		if self.node_count >= self.limits.max_node_count {
			return Err(VfsError::LimitExceeded(format!(
				"Maximum node count exceeded ({})",
				self.limits.max_node_count
			)));
		}
		Ok(())
	}

	fn find_normalized(&self, normalized: &str) -> Option<&Node> {
		let mut current = &self.root;
		for seg in segments(normalized) {
			current = current.as_directory()?.child(seg)?;
		}
		Some(current)
	}

	fn find_dir_mut(&mut self, normalized: &str) -> Result<&mut Directory, VfsError> {
		let mut current = &mut self.root;
		for seg in segments(normalized) {
			let dir = current.as_directory_mut().ok_or_else(|| {
				VfsError::NotADirectory(format!("Not a directory: {}", normalized))
			})?;
			current = dir.child_mut(seg).ok_or_else(|| {
				VfsError::NotFound(format!("No such file or directory: {}", normalized))
			})?;
		}
		current
			.as_directory_mut()
			.ok_or_else(|| VfsError::NotADirectory(format!("Not a directory: {}", normalized)))
	}

	// -- Path utilities ---------------------------------------------------

	/// Resolve `path` against the current directory into an absolute,
	/// normalized path.
	pub fn resolve_path(&self, path: &str) -> String {
		resolve_path(&self.cwd, path)
	}

	/// Look up a node. Returns `None` when any segment is missing or a file
	/// is traversed as if it were a directory.
	pub fn find_node(&self, path: &str) -> Option<&Node> {
		let normalized = self.resolve_path(path);
		self.find_normalized(&normalized)
	}

	// -- Navigation -------------------------------------------------------

	pub fn pwd(&self) -> &str {
		&self.cwd
	}

	pub fn cd(&mut self, path: &str) -> Result<(), VfsError> {
		let normalized = self.resolve_path(path);
		match self.find_normalized(&normalized).map(Node::is_directory) {
			None => Err(VfsError::NotFound(format!(
				"No such directory: {}",
				normalized
			))),
			Some(false) => Err(VfsError::NotADirectory(format!(
				"Not a directory: {}",
				normalized
			))),
			Some(true) => {
				tracing::debug!(from = %self.cwd, to = %normalized, "Changed directory");
				self.cwd = normalized;
				self.pending_events.push(VfsEvent::DirectoryChanged {
					path: self.cwd.clone(),
				});
				Ok(())
			}
		}
	}

	/// List the direct children of `path` (the current directory when `None`)
	/// in insertion order.
	pub fn ls(&self, path: Option<&str>) -> Result<Vec<DirEntry>, VfsError> {
		let normalized = self.resolve_path(path.unwrap_or("."));
		let node = self
			.find_normalized(&normalized)
			.ok_or_else(|| VfsError::NotFound(format!("No such directory: {}", normalized)))?;
		let dir = node
			.as_directory()
			.ok_or_else(|| VfsError::NotADirectory(format!("Not a directory: {}", normalized)))?;

		Ok(dir
			.children()
			.map(|child| DirEntry {
				name: child.name().to_string(),
				is_directory: child.is_directory(),
				metadata: child.metadata().clone(),
			})
			.collect())
	}

	pub fn stat(&self, path: &str) -> Result<NodeInfo, VfsError> {
		let normalized = self.resolve_path(path);
		let node = self.find_normalized(&normalized).ok_or_else(|| {
			VfsError::NotFound(format!("No such file or directory: {}", normalized))
		})?;

		Ok(NodeInfo {
			name: node.name().to_string(),
			metadata: node.metadata().clone(),
			children: node.as_directory().map(Directory::child_names),
		})
	}

	// -- Directory operations ---------------------------------------------

	pub fn mkdir(&mut self, path: &str) -> Result<(), VfsError> {
		let normalized = self.resolve_path(path);
		let (parent_path, name) = split_parent(&normalized);
		if name.is_empty() {
			return Err(VfsError::InvalidOperation(
				"Cannot create root directory".to_string(),
			));
		}
		self.assert_valid_path(&normalized)?;
		self.assert_node_limit()?;

		let parent = self.find_dir_mut(parent_path)?;
		if parent.has_child(name) {
			return Err(VfsError::AlreadyExists(format!(
				"File exists: {}",
				normalized
			)));
		}
		parent.add_child(Node::Directory(Directory::new(name)));
		self.node_count += 1;

		tracing::debug!(path = %normalized, "Created directory");
		self.pending_events.push(VfsEvent::Mkdir { path: normalized });
		Ok(())
	}

	// -- File operations --------------------------------------------------

	pub fn read_file(&self, path: &str) -> Result<String, VfsError> {
		let normalized = self.resolve_path(path);
		match self.find_normalized(&normalized) {
			Some(Node::File(f)) => Ok(f.content().to_string()),
			Some(Node::Directory(_)) => Err(VfsError::NotAFile(format!(
				"Is a directory: {}",
				normalized
			))),
			None => Err(VfsError::NotFound(format!(
				"No such file: {}",
				normalized
			))),
		}
	}

	/// Create the file, or overwrite its content when one already exists at
	/// that name. Overwrites keep the creation time.
	pub fn write_file(&mut self, path: &str, content: &str) -> Result<(), VfsError> {
		let normalized = self.resolve_path(path);
		let (parent_path, name) = split_parent(&normalized);
		if name.is_empty() {
			return Err(VfsError::InvalidOperation(
				"Cannot write to root directory as a file".to_string(),
			));
		}
		self.assert_valid_path(&normalized)?;

		let at_limit = self.assert_node_limit();
		let parent = self.find_dir_mut(parent_path)?;

		let is_new = match parent.child_mut(name) {
			Some(Node::File(existing)) => {
				existing.update_content(content);
				false
			}
			Some(Node::Directory(_)) => {
				return Err(VfsError::NotAFile(format!(
					"Cannot overwrite directory with file: {}",
					normalized
				)));
			}
			None => {
				at_limit?;
				parent.add_child(Node::File(File::new(name, content)));
				true
			}
		};
		if is_new {
			self.node_count += 1;
		}

		let size = content.len() as u64;
		tracing::debug!(path = %normalized, size, is_new, "Wrote file");
		self.pending_events.push(VfsEvent::Write {
			path: normalized,
			size,
			is_new,
		});
		Ok(())
	}

	/// Detach the node at `path` from its parent. Directories go with their
	/// whole subtree. If the current directory was inside the removed subtree
	/// it moves to the removed node's parent.
	pub fn rm(&mut self, path: &str) -> Result<(), VfsError> {
		let normalized = self.resolve_path(path);
		if normalized == ROOT {
			return Err(VfsError::InvalidOperation(
				"Cannot remove root directory".to_string(),
			));
		}
		let (parent_path, name) = split_parent(&normalized);

		let parent = self.find_dir_mut(parent_path)?;
		let removed = parent.remove_child(name).ok_or_else(|| {
			VfsError::NotFound(format!("No such file or directory: {}", normalized))
		})?;
		self.node_count -= removed.subtree_len();

		tracing::debug!(path = %normalized, nodes = removed.subtree_len(), "Removed node");

		if is_within(&self.cwd, &normalized) {
			self.cwd = parent_path.to_string();
			self.pending_events.push(VfsEvent::Remove {
				path: normalized,
			});
			self.pending_events.push(VfsEvent::DirectoryChanged {
				path: self.cwd.clone(),
			});
		} else {
			self.pending_events.push(VfsEvent::Remove {
				path: normalized,
			});
		}
		Ok(())
	}

	// -- Completion -------------------------------------------------------

	/// Complete the last path fragment of `partial` against the children of
	/// its directory. An unlistable directory yields no completions.
	pub fn complete_path(&self, partial: &str) -> Vec<Completion> {
		let (dir_part, fragment) = match partial.rfind('/') {
			Some(pos) => {
				let dir = &partial[..pos];
				(if dir.is_empty() { ROOT } else { dir }, &partial[pos + 1..])
			}
			None => (".", partial),
		};

		let entries = match self.ls(Some(dir_part)) {
			Ok(entries) => entries,
			Err(_) => return Vec::new(),
		};

		entries
			.into_iter()
			.filter(|e| e.name.starts_with(fragment))
			.map(|e| {
				let mut text = if dir_part == "." {
					e.name.clone()
				} else if dir_part.ends_with('/') {
					format!("{}{}", dir_part, e.name)
				} else {
					format!("{}/{}", dir_part, e.name)
				};
				if e.is_directory {
					text.push('/');
				}
				Completion {
					text,
					name: e.name,
					is_directory: e.is_directory,
				}
			})
			.collect()
	}

	// -- Events / metrics -------------------------------------------------

	pub fn drain_events(&mut self) -> Vec<VfsEvent> {
		std::mem::take(&mut self.pending_events)
	}

	/// Total nodes in the tree, root included.
	pub fn node_count(&self) -> usize {
		self.node_count
	}
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
