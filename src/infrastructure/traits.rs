//! Infrastructure traits, used for DI on higher levels

use crate::infrastructure::entities;
use crate::infrastructure::entities::OfferStatus;
use crate::infrastructure::error::StoreError;
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_profile(&self, user_id: Uuid) -> Result<Option<entities::Profile>, StoreError>;

    async fn create_profile(
        &self,
        profile: entities::Profile,
    ) -> Result<entities::Profile, StoreError>;
}

#[async_trait]
pub trait RequestRepository: Send + Sync {
    async fn create_request(
        &self,
        request: entities::Request,
    ) -> Result<entities::Request, StoreError>;

    async fn find_request(&self, request_id: Uuid)
    -> Result<Option<entities::Request>, StoreError>;

    async fn list_requests_by_student(
        &self,
        student_id: Uuid,
    ) -> Result<Vec<entities::Request>, StoreError>;

    async fn list_open_requests(&self) -> Result<Vec<entities::Request>, StoreError>;
}

#[async_trait]
pub trait OfferRepository: Send + Sync {
    async fn create_offer(&self, offer: entities::Offer) -> Result<entities::Offer, StoreError>;

    async fn list_offers_for_request(
        &self,
        request_id: Uuid,
    ) -> Result<Vec<entities::OfferWithEducator>, StoreError>;

    async fn list_offers_by_educator(
        &self,
        educator_id: Uuid,
    ) -> Result<Vec<entities::OfferWithRequestSummary>, StoreError>;

    async fn find_accepted_offer(
        &self,
        request_id: Uuid,
    ) -> Result<Option<entities::Offer>, StoreError>;

    /// Opens a unit of work for accepting an offer. Nothing is visible to other readers until
    /// [`AcceptanceUnit::commit`] is called; dropping the unit rolls everything back.
    ///
    /// The unit holds the store's write lock from the start, so concurrent units run one after
    /// the other and each one reads the state the previous one committed.
    async fn begin_acceptance(&self) -> Result<Box<dyn AcceptanceUnit>, StoreError>;
}

/// The store operations the offer-acceptance transaction is built from.
#[async_trait]
pub trait AcceptanceUnit: Send {
    /// Reads the offer joined with its request, filtered on the request's owner.
    async fn offer_with_request(
        &mut self,
        offer_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<entities::OfferWithRequest>, StoreError>;

    async fn set_offer_status(&mut self, offer_id: Uuid, status: OfferStatus)
    -> Result<(), StoreError>;

    /// Rejects every offer on `request_id` except `keep_offer_id`. Returns the number of offers
    /// touched, which may be zero.
    async fn reject_other_offers(
        &mut self,
        request_id: Uuid,
        keep_offer_id: Uuid,
    ) -> Result<u64, StoreError>;

    /// Moves the request from `open` to `accepted`. Returns `false` if the request was not open.
    async fn accept_request_if_open(&mut self, request_id: Uuid) -> Result<bool, StoreError>;

    async fn conversation_for_request(
        &mut self,
        request_id: Uuid,
    ) -> Result<Option<entities::Conversation>, StoreError>;

    /// Inserts a conversation in a nested savepoint. A failure here rolls back only this insert
    /// and leaves the rest of the unit intact.
    async fn insert_conversation(
        &mut self,
        conversation: entities::Conversation,
    ) -> Result<entities::Conversation, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn list_conversations(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<entities::ConversationSummary>, StoreError>;

    async fn find_conversation_summary(
        &self,
        conversation_id: Uuid,
    ) -> Result<Option<entities::ConversationSummary>, StoreError>;

    async fn find_conversation_for_request(
        &self,
        request_id: Uuid,
    ) -> Result<Option<entities::Conversation>, StoreError>;

    async fn find_conversation(
        &self,
        conversation_id: Uuid,
    ) -> Result<Option<entities::Conversation>, StoreError>;

    async fn list_conversation_messages(
        &self,
        conversation_id: Uuid,
    ) -> Result<Vec<entities::Message>, StoreError>;

    async fn create_message_in_conversation(
        &self,
        message: entities::Message,
    ) -> Result<entities::Message, StoreError>;
}
