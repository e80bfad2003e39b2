use serde::Serialize;

/// Success envelope: every 2xx body carries a status code, a payload and a
/// human-readable message.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub data: T,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status: u16, data: T, message: impl Into<String>) -> Self {
        Self {
            status,
            data,
            message: message.into(),
        }
    }

    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self::new(200, data, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_carries_status_data_and_message() {
        let body = ApiResponse::ok(vec!["a", "b"], "fetched");
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("\"status\":200"));
        assert!(json.contains("\"data\":[\"a\",\"b\"]"));
        assert!(json.contains("\"message\":\"fetched\""));
    }
}
