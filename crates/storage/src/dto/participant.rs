use serde::{Deserialize, Serialize};
use tournament::Participant;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateParticipantRequest {
    #[validate(length(min = 1, max = 64, message = "name must be between 1 and 64 characters"))]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ParticipantResponse {
    pub participant_id: String,
    pub name: String,
}

impl From<Participant> for ParticipantResponse {
    fn from(participant: Participant) -> Self {
        Self {
            participant_id: participant.id,
            name: participant.name,
        }
    }
}
