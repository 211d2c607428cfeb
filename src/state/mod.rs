//! Application state management

pub mod app_state;
pub mod columns;
pub mod confirm;
pub mod grouping;
pub mod list;
pub mod selection;
pub mod stats;
pub mod stream;
pub mod terminal;
pub mod view;

pub use app_state::{AppState, Notification};
pub use list::{LoadOutcome, LoadTicket, Resource};
pub use selection::HeaderCheck;
pub use view::{ListView, ResourceView};
