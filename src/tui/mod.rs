mod input;
mod keymap;
mod renderer;
mod spinner;
mod theme;

pub use input::handle_key;
pub use keymap::{Binding, KeyMap, KeyPress, RowKeyMap};
pub use renderer::{Renderer, page_counts_text, total_counts_text};
pub use spinner::Spinner;
pub use theme::Theme;
