//! Inputs and outputs of the marketplace services.

use crate::core::error::MarketplaceError;
use crate::infrastructure::entities::{Offer, Profile, Request, Role};
use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

/// The resolved profile of whoever is calling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerIdentity {
    pub id: Uuid,
    pub role: Role,
}

impl CallerIdentity {
    pub fn require_student(&self, action: &str) -> Result<(), MarketplaceError> {
        self.require(Role::Student, action)
    }

    pub fn require_educator(&self, action: &str) -> Result<(), MarketplaceError> {
        self.require(Role::Educator, action)
    }

    fn require(&self, role: Role, action: &str) -> Result<(), MarketplaceError> {
        if self.role == role {
            Ok(())
        } else {
            Err(MarketplaceError::unauthorized(format!(
                "only {}s can {action}",
                match role {
                    Role::Student => "student",
                    Role::Educator => "educator",
                }
            )))
        }
    }
}

impl From<&Profile> for CallerIdentity {
    fn from(profile: &Profile) -> Self {
        CallerIdentity {
            id: profile.id,
            role: profile.role,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewProfile {
    pub role: Role,
    pub name: String,
    pub bio: Option<String>,
    pub subjects: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewRequest {
    pub title: String,
    pub subject: String,
    pub description: String,
    pub curriculum_link: Option<String>,
    pub exam_date: Option<NaiveDate>,
    pub budget_min: Option<f64>,
    pub budget_max: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct NewOffer {
    pub price: f64,
    pub timeline: String,
    pub study_plan: String,
}

/// Result of accepting an offer.
///
/// `conversation_id` is `None` when the offer was accepted but the conversation could not be
/// created; accepting the same offer again provisions it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AcceptOfferOutcome {
    pub success: bool,
    pub conversation_id: Option<Uuid>,
}

/// An open request as seen by an educator browsing the marketplace.
#[derive(Debug, Clone)]
pub struct MarketplaceEntry {
    pub request: Request,
    pub matches_subjects: bool,
    pub already_offered: bool,
}

/// A request with the outcome of its bidding, as seen by the caller.
///
/// `accepted_offer` and `conversation_id` are only filled in for the owning student.
#[derive(Debug, Clone)]
pub struct RequestDetail {
    pub request: Request,
    pub accepted_offer: Option<Offer>,
    pub conversation_id: Option<Uuid>,
}

pub(crate) fn required(field: &str, value: String) -> Result<String, MarketplaceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(MarketplaceError::invalid(format!("{field} is required")))
    } else {
        Ok(trimmed.to_owned())
    }
}

pub(crate) fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
