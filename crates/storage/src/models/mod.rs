pub mod participant;
pub mod prediction;

pub use participant::ParticipantRow;
pub use prediction::PredictionRow;
