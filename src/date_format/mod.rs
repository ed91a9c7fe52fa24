//! Store date patterns (`M/d/yy h:mm a` style) compiled to chrono formats.

mod api;

pub use api::{DateFormat, DatePatternParser, DEFAULT_PATTERN};
