pub mod appreciations;
pub mod auth;
pub mod exchanges;
pub mod flags;
pub mod jobs;
pub mod notes;
pub mod users;
