pub mod participant;
pub mod prediction;
