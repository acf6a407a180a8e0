pub mod commands;
pub mod interaction;
pub mod render;
pub mod runtime;

pub use interaction::InteractionRouter;
pub use runtime::DiscordRuntime;
