pub mod assistant;
pub mod career;
pub mod response;

pub use assistant::{ProfileDraft, SelectedAchievement, TailorResult};
pub use career::{
    Achievement, AchievementInput, Application, ApplicationInput, ApplicationStatus, ChatMessage,
    ChatRole, Profile, ProfileInput, User,
};
