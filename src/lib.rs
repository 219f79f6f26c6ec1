pub mod app;
pub mod demotype;
pub mod draw;
pub mod hotkey;
pub mod logging;
pub mod settings;
pub mod timer;
