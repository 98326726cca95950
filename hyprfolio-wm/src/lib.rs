pub mod config;
pub mod error;
pub mod geometry;
pub mod manager;
pub mod protocol;
pub mod server;
pub mod snap;
pub mod tiling;
pub mod transport;
pub mod window;

pub use error::WmError;
pub use geometry::{Edge, Rect, Viewport};
pub use manager::{IntegrityReport, Reassignment, WindowManager, WmEvent, WorkspaceInfo};
pub use tiling::Layout;
pub use window::{ContentFactory, ContentKind, WindowId, WindowOptions, WindowRecord};
