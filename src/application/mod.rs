pub mod availability;
pub mod connections;
pub mod insights;
pub mod journal;
pub mod similarity;
