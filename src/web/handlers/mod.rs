pub mod achievement_handlers;
pub mod ai_handlers;
pub mod application_handlers;
pub mod auth_handlers;
pub mod chat_handlers;
pub mod profile_handlers;
pub mod system_handlers;

pub use achievement_handlers::*;
pub use ai_handlers::*;
pub use application_handlers::*;
pub use auth_handlers::*;
pub use chat_handlers::*;
pub use profile_handlers::*;
pub use system_handlers::*;
