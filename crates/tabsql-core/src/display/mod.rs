pub mod notice;
pub mod progress;
pub mod render;
pub mod table;

pub use notice::{NOTICE_TTL, Notice, NoticeKind, Notices};
pub use progress::{OperationStatus, ProgressSpinner, display_status, format_status};
pub use render::{CellView, HeaderCell, RenderMode, RenderedView, ResultRenderer};
pub use table::TableDisplay;
