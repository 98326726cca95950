pub mod config;
pub mod error;
pub mod node;
pub mod path;
pub mod protocol;
pub mod server;
pub mod transport;
pub mod vfs;

pub use error::VfsError;
pub use node::{Directory, File, Metadata, Node, Permissions};
pub use vfs::{Completion, DirEntry, NodeInfo, VfsEvent, VirtualFs};
