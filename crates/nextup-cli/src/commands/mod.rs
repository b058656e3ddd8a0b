pub mod config;
pub mod context;
pub mod daemon;
pub mod lookup;
pub mod order;
pub mod pick;
pub mod prompts;
pub mod settings;
pub mod sync;
pub mod sync_ui;
