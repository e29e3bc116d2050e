pub mod formatter;
pub mod storage;

pub use formatter::{
    format_json, format_report, get_terminal_width, should_use_colors, wrap, Report,
};
pub use storage::save_report;
