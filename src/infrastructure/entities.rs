//! Database entities

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Educator,
}

#[derive(Debug, Clone, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub role: Role,
    pub name: String,
    pub bio: Option<String>,
    pub subjects: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// Lowercased, trimmed subject keywords from the comma-separated `subjects` column.
    pub fn subject_keywords(&self) -> Vec<String> {
        self.subjects
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Open,
    Accepted,
    Closed,
}

#[derive(Debug, Clone, FromRow)]
pub struct Request {
    pub id: Uuid,
    pub student_id: Uuid,
    pub title: String,
    pub subject: String,
    pub description: String,
    pub curriculum_link: Option<String>,
    pub exam_date: Option<NaiveDate>,
    pub budget_min: Option<f64>,
    pub budget_max: Option<f64>,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OfferStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, FromRow)]
pub struct Offer {
    pub id: Uuid,
    pub request_id: Uuid,
    pub educator_id: Uuid,
    pub price: f64,
    pub timeline: String,
    pub study_plan: String,
    pub status: OfferStatus,
    pub created_at: DateTime<Utc>,
}

/// An offer read together with the request it was made against.
///
/// Only produced by filtered reads, so holding one means the ownership filter matched.
#[derive(Debug, Clone, FromRow)]
pub struct OfferWithRequest {
    pub offer_id: Uuid,
    pub educator_id: Uuid,
    pub offer_status: OfferStatus,
    pub request_id: Uuid,
    pub student_id: Uuid,
    pub request_status: RequestStatus,
}

/// An offer together with the public profile of the educator who made it.
#[derive(Debug, Clone, FromRow)]
pub struct OfferWithEducator {
    #[sqlx(flatten)]
    pub offer: Offer,
    pub educator_name: String,
    pub educator_bio: Option<String>,
    pub educator_subjects: Option<String>,
}

/// An offer together with the headline of the request it was made against.
#[derive(Debug, Clone, FromRow)]
pub struct OfferWithRequestSummary {
    #[sqlx(flatten)]
    pub offer: Offer,
    pub request_title: String,
    pub request_subject: String,
    pub request_exam_date: Option<NaiveDate>,
    pub request_curriculum_link: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct Conversation {
    pub id: Uuid,
    pub request_id: Uuid,
    pub student_id: Uuid,
    pub educator_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn has_participant(&self, user_id: Uuid) -> bool {
        self.student_id == user_id || self.educator_id == user_id
    }
}

/// A conversation with the request title and both participants' names.
#[derive(Debug, Clone, FromRow)]
pub struct ConversationSummary {
    #[sqlx(flatten)]
    pub conversation: Conversation,
    pub request_title: String,
    pub request_subject: String,
    pub student_name: String,
    pub educator_name: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
