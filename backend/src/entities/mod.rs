pub mod job_card;
pub mod trainset;
