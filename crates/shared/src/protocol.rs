use serde::{Deserialize, Serialize};

/// Every backend response wraps its payload as `{ success, message, data }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub data: T,
}

fn default_success() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    #[serde(default)]
    pub total_page: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListPayload<T> {
    #[serde(default = "Vec::new")]
    pub result: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
}

/// One page of a server-paginated collection.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionPage<T> {
    pub items: Vec<T>,
    pub total_count: u64,
}

impl<T> CollectionPage<T> {
    /// Servers that omit `meta` only tell us about the page they sent.
    pub fn from_list(payload: ListPayload<T>) -> Self {
        let total_count = payload
            .meta
            .map(|meta| meta.total)
            .unwrap_or(payload.result.len() as u64);
        Self {
            items: payload.result,
            total_count,
        }
    }
}

/// A file selected for upload alongside a multipart patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub filename: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Multipart patch for `PATCH /user/update-user-data/{id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserUpdate {
    pub first_name: String,
    pub last_name: String,
    pub age: String,
    pub gender: String,
    pub is_notification: bool,
    pub image: Option<ImageUpload>,
}

/// Multipart patch for `PATCH /user/update-profile`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub phone: String,
    pub image: Option<ImageUpload>,
}

/// JSON body shared by question creation and question update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionPayload {
    pub question: String,
    pub options: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_envelope_uses_meta_total_when_present() {
        let raw = r#"{
            "success": true,
            "message": "ok",
            "data": {
                "result": [1, 2, 3],
                "meta": { "page": 2, "limit": 3, "total": 95, "totalPage": 32 }
            }
        }"#;
        let envelope: Envelope<ListPayload<u32>> = serde_json::from_str(raw).expect("decode");
        let page = CollectionPage::from_list(envelope.data);
        assert_eq!(page.items, vec![1, 2, 3]);
        assert_eq!(page.total_count, 95);
    }

    #[test]
    fn list_without_meta_counts_items() {
        let raw = r#"{ "data": { "result": ["a", "b"] } }"#;
        let envelope: Envelope<ListPayload<String>> = serde_json::from_str(raw).expect("decode");
        assert!(envelope.success);
        assert_eq!(CollectionPage::from_list(envelope.data).total_count, 2);
    }
}
