use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub subject: String,
    pub roles: Vec<String>,
}
