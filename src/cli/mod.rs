pub mod menu;
pub mod prompt;

pub use menu::run_interactive_mode;
