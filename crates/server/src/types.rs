use metaprompt::PromptSource;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize, Default)]
pub struct DebugParams {
    pub debug: Option<bool>,
}

#[derive(Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<Value>,
    pub result: T,
}

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize, Deserialize)]
pub struct AssembleResponse {
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct GeneratePromptRequest {
    pub query: String,
    #[serde(default)]
    pub temperature: Option<f32>,
}

#[derive(Serialize)]
pub struct GeneratePromptResponse {
    pub prompt: String,
    pub metadata: PromptMetadata,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptMetadata {
    pub query: String,
    #[serde(flatten)]
    pub source: PromptSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}
