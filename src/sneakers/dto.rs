use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Listing condition, mirroring the marketplace's fixed vocabulary.
pub const CONDITIONS: [&str; 4] = ["New", "Used - Like New", "Used - Good", "Used - Fair"];
pub const STATUSES: [&str; 3] = ["Available", "Sold", "Pending"];

pub fn is_valid_condition(s: &str) -> bool {
    CONDITIONS.contains(&s)
}

pub fn is_valid_status(s: &str) -> bool {
    STATUSES.contains(&s)
}

#[derive(Debug, Deserialize)]
pub struct MarketQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SellerSummary {
    pub id: Uuid,
    pub username: String,
    pub seller_score: f64,
}

#[derive(Debug, Serialize)]
pub struct SneakerListItem {
    pub id: Uuid,
    pub brand: String,
    pub model: String,
    pub size: f64,
    pub price: f64,
    pub condition: String,
    pub status: String,
    pub seller: SellerSummary,
    pub images: Vec<String>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct CommentView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: Option<String>,
    pub text: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct SneakerDetails {
    pub id: Uuid,
    pub brand: String,
    pub model: String,
    pub size: f64,
    pub price: f64,
    pub condition: String,
    pub description: Option<String>,
    pub status: String,
    pub seller: SellerSummary,
    pub images: Vec<String>,
    pub comments: Vec<CommentView>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condition_vocabulary_is_closed() {
        assert!(is_valid_condition("New"));
        assert!(is_valid_condition("Used - Like New"));
        assert!(is_valid_condition("Used - Good"));
        assert!(is_valid_condition("Used - Fair"));
        assert!(!is_valid_condition("new"));
        assert!(!is_valid_condition("Mint"));
    }

    #[test]
    fn status_vocabulary_is_closed() {
        assert!(is_valid_status("Available"));
        assert!(is_valid_status("Sold"));
        assert!(is_valid_status("Pending"));
        assert!(!is_valid_status("available"));
        assert!(!is_valid_status("Archived"));
    }
}
