pub mod api;
pub mod change_tree;
pub mod console;
pub mod logging;
pub mod model;
pub mod tui_shell;
