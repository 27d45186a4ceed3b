pub mod appreciation;
pub mod exchange;
pub mod flag;
pub mod job;
pub mod message;
pub mod private_note;
pub mod user;
