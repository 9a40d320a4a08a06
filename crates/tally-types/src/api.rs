use serde::{Deserialize, Serialize};

// -- Users --

/// Fields are optional so a missing name gets our own validation message
/// instead of a deserialization rejection.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub nombre: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codigo_usuario: Option<String>,
}

// -- Points --

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PointsRequest {
    pub codigo_usuario: Option<String>,
    pub operacion: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PointsResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub puntos: Option<u64>,
}

/// Body of every rejected mutation.
#[derive(Debug, Serialize, Deserialize)]
pub struct FailureResponse {
    pub success: bool,
    pub message: String,
}

// -- Misc --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub store: String,
}
