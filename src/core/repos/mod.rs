// src/core/repos/mod.rs
//! One repository per table. Every statement that touches user-owned rows is
//! scoped by `user_id`.

pub mod achievements;
pub mod applications;
pub mod chat;
pub mod profiles;
pub mod users;

pub use achievements::AchievementRepository;
pub use applications::ApplicationRepository;
pub use chat::ChatRepository;
pub use profiles::ProfileRepository;
pub use users::UserRepository;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::core::Database;

    pub async fn db_with_users(emails: &[&str]) -> (Database, Vec<i64>) {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        let repo = super::UserRepository::new(&db);
        let mut ids = Vec::new();
        for email in emails {
            ids.push(repo.create(email, "salt:hash").await.unwrap().id);
        }
        (db, ids)
    }
}
