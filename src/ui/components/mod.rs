//! UI components

pub mod modal;
pub mod resource_table;
pub mod status_bar;
pub mod stream_view;
pub mod terminal_view;

pub use modal::{centered_rect, render_column_picker, render_help_overlay, render_modal};
pub use resource_table::{render_container_table, render_resource_table, state_color};
pub use status_bar::render_header;
pub use stream_view::render_stream;
pub use terminal_view::render_terminal;
