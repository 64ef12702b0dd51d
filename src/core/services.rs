//! Implementations for the services the app needs.
//!

use crate::core::error::MarketplaceError;
use crate::core::model::{
    CallerIdentity, MarketplaceEntry, NewProfile, NewRequest, RequestDetail, optional, required,
};
use crate::core::traits::{ConversationService, ProfileService, RequestService};
use crate::infrastructure::entities::{
    Conversation, ConversationSummary, Message, Profile, Request, RequestStatus, Role,
};
use crate::infrastructure::error::StoreError;
use crate::infrastructure::traits::{
    ConversationRepository, OfferRepository, ProfileRepository, RequestRepository,
};
use async_trait::async_trait;
use chrono::Utc;
use di::{Ref, injectable};
use log::info;
use std::collections::HashSet;
use uuid::Uuid;

#[injectable(ProfileService)]
pub struct MarketplaceProfileService {
    repo: Ref<dyn ProfileRepository>,
}

#[async_trait]
impl ProfileService for MarketplaceProfileService {
    async fn create_profile(
        &self,
        user_id: Uuid,
        profile: NewProfile,
    ) -> Result<Profile, MarketplaceError> {
        let name = required("name", profile.name)?;
        let (bio, subjects) = match profile.role {
            Role::Educator => (optional(profile.bio), optional(profile.subjects)),
            Role::Student => (None, None),
        };

        if self.repo.find_profile(user_id).await?.is_some() {
            return Err(MarketplaceError::conflict("profile already exists"));
        }

        let created = self
            .repo
            .create_profile(Profile {
                id: user_id,
                role: profile.role,
                name,
                bio,
                subjects,
                created_at: Utc::now(),
            })
            .await
            .map_err(|e| match e {
                StoreError::Duplicate => MarketplaceError::conflict("profile already exists"),
                e => e.into(),
            })?;

        info!("onboarded {user_id} as {:?}", created.role);
        Ok(created)
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<Profile, MarketplaceError> {
        self.repo
            .find_profile(user_id)
            .await?
            .ok_or(MarketplaceError::NotFound { what: "profile" })
    }
}

#[injectable(RequestService)]
pub struct MarketplaceRequestService {
    requests: Ref<dyn RequestRepository>,
    offers: Ref<dyn OfferRepository>,
    profiles: Ref<dyn ProfileRepository>,
    conversations: Ref<dyn ConversationRepository>,
}

fn validate_budget(request: &NewRequest) -> Result<(), MarketplaceError> {
    for budget in [request.budget_min, request.budget_max].into_iter().flatten() {
        if !budget.is_finite() || budget < 0.0 {
            return Err(MarketplaceError::invalid("budget must be a non-negative amount"));
        }
    }

    if let (Some(min), Some(max)) = (request.budget_min, request.budget_max) {
        if min > max {
            return Err(MarketplaceError::invalid(
                "budget_min cannot exceed budget_max",
            ));
        }
    }

    Ok(())
}

fn matches_subjects(keywords: &[String], subject: &str) -> bool {
    let subject = subject.to_lowercase();
    keywords.iter().any(|keyword| subject.contains(keyword.as_str()))
}

#[async_trait]
impl RequestService for MarketplaceRequestService {
    async fn create_request(
        &self,
        caller: &CallerIdentity,
        request: NewRequest,
    ) -> Result<Request, MarketplaceError> {
        caller.require_student("create requests")?;
        validate_budget(&request)?;

        let created = self
            .requests
            .create_request(Request {
                id: Uuid::new_v4(),
                student_id: caller.id,
                title: required("title", request.title)?,
                subject: required("subject", request.subject)?,
                description: required("description", request.description)?,
                curriculum_link: optional(request.curriculum_link),
                exam_date: request.exam_date,
                budget_min: request.budget_min,
                budget_max: request.budget_max,
                status: RequestStatus::Open,
                created_at: Utc::now(),
            })
            .await?;

        info!("request {} opened by {}", created.id, caller.id);
        Ok(created)
    }

    async fn list_my_requests(
        &self,
        caller: &CallerIdentity,
    ) -> Result<Vec<Request>, MarketplaceError> {
        caller.require_student("list their requests")?;
        Ok(self.requests.list_requests_by_student(caller.id).await?)
    }

    async fn list_marketplace(
        &self,
        caller: &CallerIdentity,
    ) -> Result<Vec<MarketplaceEntry>, MarketplaceError> {
        caller.require_educator("browse the marketplace")?;

        let keywords = self
            .profiles
            .find_profile(caller.id)
            .await?
            .map(|profile| profile.subject_keywords())
            .unwrap_or_default();

        let offered: HashSet<Uuid> = self
            .offers
            .list_offers_by_educator(caller.id)
            .await?
            .into_iter()
            .map(|summary| summary.offer.request_id)
            .collect();

        Ok(self
            .requests
            .list_open_requests()
            .await?
            .into_iter()
            .map(|request| MarketplaceEntry {
                matches_subjects: matches_subjects(&keywords, &request.subject),
                already_offered: offered.contains(&request.id),
                request,
            })
            .collect())
    }

    async fn get_request(
        &self,
        caller: &CallerIdentity,
        request_id: Uuid,
    ) -> Result<RequestDetail, MarketplaceError> {
        let request = self
            .requests
            .find_request(request_id)
            .await?
            .ok_or(MarketplaceError::NotFound { what: "request" })?;

        let owner = request.student_id == caller.id;
        let visible =
            owner || (caller.role == Role::Educator && request.status == RequestStatus::Open);
        if !visible {
            return Err(MarketplaceError::NotFound { what: "request" });
        }

        if !owner || request.status == RequestStatus::Open {
            return Ok(RequestDetail {
                request,
                accepted_offer: None,
                conversation_id: None,
            });
        }

        let accepted_offer = self.offers.find_accepted_offer(request.id).await?;
        let conversation_id = self
            .conversations
            .find_conversation_for_request(request.id)
            .await?
            .map(|conversation| conversation.id);

        Ok(RequestDetail {
            request,
            accepted_offer,
            conversation_id,
        })
    }
}

#[injectable(ConversationService)]
pub struct MarketplaceConversationService {
    repo: Ref<dyn ConversationRepository>,
}

impl MarketplaceConversationService {
    async fn participant_conversation(
        &self,
        caller: &CallerIdentity,
        conversation_id: Uuid,
    ) -> Result<Conversation, MarketplaceError> {
        self.repo
            .find_conversation(conversation_id)
            .await?
            .filter(|conversation| conversation.has_participant(caller.id))
            .ok_or(MarketplaceError::NotFound {
                what: "conversation",
            })
    }
}

#[async_trait]
impl ConversationService for MarketplaceConversationService {
    async fn list_conversations(
        &self,
        caller: &CallerIdentity,
    ) -> Result<Vec<ConversationSummary>, MarketplaceError> {
        Ok(self.repo.list_conversations(caller.id).await?)
    }

    async fn get_conversation(
        &self,
        caller: &CallerIdentity,
        conversation_id: Uuid,
    ) -> Result<ConversationSummary, MarketplaceError> {
        self.repo
            .find_conversation_summary(conversation_id)
            .await?
            .filter(|summary| summary.conversation.has_participant(caller.id))
            .ok_or(MarketplaceError::NotFound {
                what: "conversation",
            })
    }

    async fn list_messages(
        &self,
        caller: &CallerIdentity,
        conversation_id: Uuid,
    ) -> Result<Vec<Message>, MarketplaceError> {
        let conversation = self
            .participant_conversation(caller, conversation_id)
            .await?;
        Ok(self.repo.list_conversation_messages(conversation.id).await?)
    }

    async fn post_message(
        &self,
        caller: &CallerIdentity,
        conversation_id: Uuid,
        content: String,
    ) -> Result<Message, MarketplaceError> {
        let content = required("content", content)?;
        let conversation = self
            .participant_conversation(caller, conversation_id)
            .await?;

        Ok(self
            .repo
            .create_message_in_conversation(Message {
                id: Uuid::new_v4(),
                conversation_id: conversation.id,
                sender_id: caller.id,
                content,
                created_at: Utc::now(),
            })
            .await?)
    }
}
