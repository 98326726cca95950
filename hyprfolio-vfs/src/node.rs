// ---------------------------------------------------------------------------
// Tree nodes
// ---------------------------------------------------------------------------
//
// Every directory exclusively owns its children, so the tree has no shared
// ownership and no cycles: a node is reachable from root by exactly one path.
// ---------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Permissions {
	pub read: bool,
	pub write: bool,
	pub execute: bool,
}

impl Permissions {
	pub const FILE: Self = Self {
		read: true,
		write: true,
		execute: false,
	};

	pub const DIRECTORY: Self = Self {
		read: true,
		write: true,
		execute: true,
	};
}

/// Metadata shared by both node kinds. `content_type` and `size` are only
/// present on files.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
	pub created: DateTime<Utc>,
	pub modified: DateTime<Utc>,
	pub permissions: Permissions,
	#[serde(rename = "type", skip_serializing_if = "Option::is_none")]
	pub content_type: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub size: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct File {
	name: String,
	content: String,
	metadata: Metadata,
}

impl File {
	pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
		let now = Utc::now();
		let content = content.into();
		let size = content.len() as u64;
		Self {
			name: name.into(),
			content,
			metadata: Metadata {
				created: now,
				modified: now,
				permissions: Permissions::FILE,
				content_type: Some(DEFAULT_CONTENT_TYPE.to_string()),
				size: Some(size),
			},
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn content(&self) -> &str {
		&self.content
	}

	pub fn metadata(&self) -> &Metadata {
		&self.metadata
	}

	pub fn size(&self) -> u64 {
		self.content.len() as u64
	}

	/// Replace the content, bumping `modified` and the derived size.
	/// `created` is left untouched.
	pub fn update_content(&mut self, content: impl Into<String>) {
		self.content = content.into();
		self.metadata.modified = Utc::now();
		self.metadata.size = Some(self.size());
	}
}

#[derive(Debug, Clone)]
pub struct Directory {
	name: String,
	metadata: Metadata,
	children: IndexMap<String, Node>,
}

impl Directory {
	pub fn new(name: impl Into<String>) -> Self {
		let now = Utc::now();
		Self {
			name: name.into(),
			metadata: Metadata {
				created: now,
				modified: now,
				permissions: Permissions::DIRECTORY,
				content_type: None,
				size: None,
			},
			children: IndexMap::new(),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn metadata(&self) -> &Metadata {
		&self.metadata
	}

	/// Insert a child under its own name. Callers check for collisions first;
	/// an existing entry with the same name is replaced in place.
	pub fn add_child(&mut self, child: Node) {
		self.children.insert(child.name().to_string(), child);
		self.metadata.modified = Utc::now();
	}

	/// Detach a child, preserving the insertion order of the remaining ones.
	pub fn remove_child(&mut self, name: &str) -> Option<Node> {
		let removed = self.children.shift_remove(name);
		if removed.is_some() {
			self.metadata.modified = Utc::now();
		}
		removed
	}

	pub fn child(&self, name: &str) -> Option<&Node> {
		self.children.get(name)
	}

	pub fn child_mut(&mut self, name: &str) -> Option<&mut Node> {
		self.children.get_mut(name)
	}

	pub fn has_child(&self, name: &str) -> bool {
		self.children.contains_key(name)
	}

	/// Children in insertion order.
	pub fn children(&self) -> impl Iterator<Item = &Node> {
		self.children.values()
	}

	pub fn child_names(&self) -> Vec<String> {
		self.children.keys().cloned().collect()
	}
}

#[derive(Debug, Clone)]
pub enum Node {
	File(File),
	Directory(Directory),
}

impl Node {
	pub fn name(&self) -> &str {
		match self {
			Node::File(f) => f.name(),
			Node::Directory(d) => d.name(),
		}
	}

	pub fn metadata(&self) -> &Metadata {
		match self {
			Node::File(f) => f.metadata(),
			Node::Directory(d) => d.metadata(),
		}
	}

	pub fn is_directory(&self) -> bool {
		matches!(self, Node::Directory(_))
	}

	pub fn as_directory(&self) -> Option<&Directory> {
		match self {
			Node::Directory(d) => Some(d),
			Node::File(_) => None,
		}
	}

	pub fn as_directory_mut(&mut self) -> Option<&mut Directory> {
		match self {
			Node::Directory(d) => Some(d),
			Node::File(_) => None,
		}
	}

	/// Number of nodes in this subtree, including `self`.
	pub fn subtree_len(&self) -> usize {
		match self {
			Node::File(_) => 1,
			Node::Directory(d) => 1 + d.children().map(Node::subtree_len).sum::<usize>(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn file_size_tracks_content() {
		let mut f = File::new("a.txt", "hello");
		assert_eq!(f.metadata().size, Some(5));
		let created = f.metadata().created;
		f.update_content("hello world");
		assert_eq!(f.metadata().size, Some(11));
		assert_eq!(f.metadata().created, created);
		assert!(f.metadata().modified >= created);
	}

	#[test]
	fn directory_keeps_insertion_order() {
		let mut d = Directory::new("d");
		d.add_child(Node::File(File::new("zeta", "")));
		d.add_child(Node::File(File::new("alpha", "")));
		d.add_child(Node::Directory(Directory::new("mid")));
		assert_eq!(d.child_names(), vec!["zeta", "alpha", "mid"]);

		d.remove_child("zeta");
		assert_eq!(d.child_names(), vec!["alpha", "mid"]);
	}

	#[test]
	fn remove_missing_child_keeps_modified() {
		let mut d = Directory::new("d");
		let before = d.metadata().modified;
		assert!(d.remove_child("nope").is_none());
		assert_eq!(d.metadata().modified, before);
	}

	#[test]
	fn subtree_len_counts_descendants() {
		let mut inner = Directory::new("inner");
		inner.add_child(Node::File(File::new("x", "1")));
		let mut outer = Directory::new("outer");
		outer.add_child(Node::Directory(inner));
		outer.add_child(Node::File(File::new("y", "2")));
		assert_eq!(Node::Directory(outer).subtree_len(), 4);
	}

	#[test]
	fn default_permissions_differ_by_kind() {
		let f = File::new("f", "");
		let d = Directory::new("d");
		assert!(!f.metadata().permissions.execute);
		assert!(d.metadata().permissions.execute);
		assert!(d.metadata().content_type.is_none());
	}
}
