pub mod assignments;
pub mod health;
pub mod jobs;
pub mod qc;
pub mod time_entries;
pub mod workers;
pub mod workshop;
