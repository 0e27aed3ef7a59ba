use serde::Serialize;

/// Body of the root endpoint.
#[derive(Debug, Serialize)]
pub struct Welcome {
    pub message: String,
}
