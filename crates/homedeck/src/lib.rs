pub mod actions;
pub mod client;
pub mod config;
pub mod host;
pub mod icon;
pub mod presentation;

pub use actions::ActionContext;
pub use actions::ActionKind;
pub use actions::ActionRegistry;
pub use actions::Timing;
pub use client::ControlClient;
pub use client::Endpoint;
pub use client::HttpControlClient;
pub use config::Config;
pub use config::LogLevel;
pub use host::Plugin;
pub use host::PluginArgs;
