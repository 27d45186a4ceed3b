pub mod appreciation_repo;
pub mod event_repo;
pub mod exchange_repo;
pub mod flag_repo;
pub mod job_repo;
pub mod message_repo;
pub mod private_note_repo;
pub mod rate_limit_repo;
pub mod settings_repo;
pub mod user_repo;

pub use appreciation_repo::AppreciationRepo;
pub use event_repo::EventRepo;
pub use exchange_repo::{ExchangeOrder, ExchangeRepo, ExchangeRole};
pub use flag_repo::FlagRepo;
pub use job_repo::JobRepo;
pub use message_repo::MessageRepo;
pub use private_note_repo::PrivateNoteRepo;
pub use rate_limit_repo::{RateLimitDecision, RateLimitRepo};
pub use settings_repo::SettingsRepo;
pub use user_repo::UserRepo;
