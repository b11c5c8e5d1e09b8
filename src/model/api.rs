use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDto {
    pub error: String,
}

/// Count returned by bulk operations such as "mark all read".
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CountDto {
    pub count: u64,
}
