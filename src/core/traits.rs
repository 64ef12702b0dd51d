//! DI "Interfaces"

use crate::core::error::MarketplaceError;
use crate::core::model::{
    AcceptOfferOutcome, CallerIdentity, MarketplaceEntry, NewOffer, NewProfile, NewRequest,
    RequestDetail,
};
use crate::infrastructure::entities;
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait ProfileService: Send + Sync {
    /// Creates the profile for a freshly authenticated user.
    ///
    /// Returns `Conflict` if the user already has a profile.
    async fn create_profile(
        &self,
        user_id: Uuid,
        profile: NewProfile,
    ) -> Result<entities::Profile, MarketplaceError>;

    /// Returns `NotFound` if the user has not been onboarded yet.
    async fn get_profile(&self, user_id: Uuid) -> Result<entities::Profile, MarketplaceError>;

    /// Resolves an authenticated user into a role-tagged caller.
    ///
    /// Users without a profile are `Unauthorized`.
    async fn resolve_caller(&self, user_id: Uuid) -> Result<CallerIdentity, MarketplaceError> {
        match self.get_profile(user_id).await {
            Ok(profile) => Ok(CallerIdentity::from(&profile)),
            Err(MarketplaceError::NotFound { .. }) => Err(MarketplaceError::unauthorized(
                "complete onboarding before using the marketplace",
            )),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
pub trait RequestService: Send + Sync {
    async fn create_request(
        &self,
        caller: &CallerIdentity,
        request: NewRequest,
    ) -> Result<entities::Request, MarketplaceError>;

    /// A student's own requests, newest first.
    async fn list_my_requests(
        &self,
        caller: &CallerIdentity,
    ) -> Result<Vec<entities::Request>, MarketplaceError>;

    /// All open requests, newest first, annotated for the calling educator.
    async fn list_marketplace(
        &self,
        caller: &CallerIdentity,
    ) -> Result<Vec<MarketplaceEntry>, MarketplaceError>;

    /// Owners see their request in any status, educators only while it is open.
    async fn get_request(
        &self,
        caller: &CallerIdentity,
        request_id: Uuid,
    ) -> Result<RequestDetail, MarketplaceError>;
}

#[async_trait]
pub trait OfferService: Send + Sync {
    async fn submit_offer(
        &self,
        caller: &CallerIdentity,
        request_id: Uuid,
        offer: NewOffer,
    ) -> Result<entities::Offer, MarketplaceError>;

    /// Offers on the caller's request, each with the educator's public profile.
    async fn list_offers_for_request(
        &self,
        caller: &CallerIdentity,
        request_id: Uuid,
    ) -> Result<Vec<entities::OfferWithEducator>, MarketplaceError>;

    async fn list_my_offers(
        &self,
        caller: &CallerIdentity,
    ) -> Result<Vec<entities::OfferWithRequestSummary>, MarketplaceError>;

    /// Accepts `offer_id` on behalf of the student owning `request_id`, rejects every other offer
    /// on the request and provisions the conversation between the two parties.
    ///
    /// Accepting the already-winning offer again is a retry and only provisions a missing
    /// conversation. Accepting any other offer once the request is no longer open is a
    /// `Conflict`.
    async fn accept_offer(
        &self,
        offer_id: Uuid,
        request_id: Uuid,
        caller: &CallerIdentity,
    ) -> Result<AcceptOfferOutcome, MarketplaceError>;
}

#[async_trait]
pub trait ConversationService: Send + Sync {
    /// Lists all conversations the caller takes part in.
    async fn list_conversations(
        &self,
        caller: &CallerIdentity,
    ) -> Result<Vec<entities::ConversationSummary>, MarketplaceError>;

    /// Returns `NotFound` if the caller is not a participant.
    async fn get_conversation(
        &self,
        caller: &CallerIdentity,
        conversation_id: Uuid,
    ) -> Result<entities::ConversationSummary, MarketplaceError>;

    /// List all messages in a conversation, oldest first.
    ///
    /// Returns `NotFound` if the caller is not a participant.
    async fn list_messages(
        &self,
        caller: &CallerIdentity,
        conversation_id: Uuid,
    ) -> Result<Vec<entities::Message>, MarketplaceError>;

    /// Posts a message as the caller.
    async fn post_message(
        &self,
        caller: &CallerIdentity,
        conversation_id: Uuid,
        content: String,
    ) -> Result<entities::Message, MarketplaceError>;
}
