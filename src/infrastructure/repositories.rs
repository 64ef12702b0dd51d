//! DB Repository abstractions

use crate::infrastructure::database::DatabaseConnection;
use crate::infrastructure::entities::{
    Conversation, ConversationSummary, Message, Offer, OfferStatus, OfferWithEducator,
    OfferWithRequest, OfferWithRequestSummary, Profile, Request,
};
use crate::infrastructure::error::StoreError;
use crate::infrastructure::traits::{
    AcceptanceUnit, ConversationRepository, OfferRepository, ProfileRepository, RequestRepository,
};
use async_trait::async_trait;
use di::{Ref, injectable};
use log::error;
use sqlx::{Acquire, Sqlite, Transaction};
use uuid::Uuid;

fn store_error(e: sqlx::Error) -> StoreError {
    error!("{e}");
    StoreError::from(e)
}

#[injectable(ProfileRepository)]
pub struct DbProfileRepository {
    connection: Ref<DatabaseConnection>,
}

#[async_trait]
impl ProfileRepository for DbProfileRepository {
    async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>, StoreError> {
        sqlx::query_as("SELECT * FROM profiles WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&**self.connection)
            .await
            .map_err(store_error)
    }

    async fn create_profile(&self, profile: Profile) -> Result<Profile, StoreError> {
        sqlx::query_as(
            "INSERT INTO profiles (id, role, name, bio, subjects, created_at) VALUES (?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(profile.id)
        .bind(profile.role)
        .bind(profile.name)
        .bind(profile.bio)
        .bind(profile.subjects)
        .bind(profile.created_at)
        .fetch_one(&**self.connection)
        .await
        .map_err(store_error)
    }
}

#[injectable(RequestRepository)]
pub struct DbRequestRepository {
    connection: Ref<DatabaseConnection>,
}

#[async_trait]
impl RequestRepository for DbRequestRepository {
    async fn create_request(&self, request: Request) -> Result<Request, StoreError> {
        sqlx::query_as(
            "INSERT INTO requests (id, student_id, title, subject, description, curriculum_link, exam_date, budget_min, budget_max, status, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(request.id)
        .bind(request.student_id)
        .bind(request.title)
        .bind(request.subject)
        .bind(request.description)
        .bind(request.curriculum_link)
        .bind(request.exam_date)
        .bind(request.budget_min)
        .bind(request.budget_max)
        .bind(request.status)
        .bind(request.created_at)
        .fetch_one(&**self.connection)
        .await
        .map_err(store_error)
    }

    async fn find_request(&self, request_id: Uuid) -> Result<Option<Request>, StoreError> {
        sqlx::query_as("SELECT * FROM requests WHERE id = ?")
            .bind(request_id)
            .fetch_optional(&**self.connection)
            .await
            .map_err(store_error)
    }

    async fn list_requests_by_student(&self, student_id: Uuid) -> Result<Vec<Request>, StoreError> {
        sqlx::query_as("SELECT * FROM requests WHERE student_id = ? ORDER BY created_at DESC")
            .bind(student_id)
            .fetch_all(&**self.connection)
            .await
            .map_err(store_error)
    }

    async fn list_open_requests(&self) -> Result<Vec<Request>, StoreError> {
        sqlx::query_as("SELECT * FROM requests WHERE status = 'open' ORDER BY created_at DESC")
            .fetch_all(&**self.connection)
            .await
            .map_err(store_error)
    }
}

#[injectable(OfferRepository)]
pub struct DbOfferRepository {
    connection: Ref<DatabaseConnection>,
}

#[async_trait]
impl OfferRepository for DbOfferRepository {
    async fn create_offer(&self, offer: Offer) -> Result<Offer, StoreError> {
        sqlx::query_as(
            "INSERT INTO offers (id, request_id, educator_id, price, timeline, study_plan, status, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(offer.id)
        .bind(offer.request_id)
        .bind(offer.educator_id)
        .bind(offer.price)
        .bind(offer.timeline)
        .bind(offer.study_plan)
        .bind(offer.status)
        .bind(offer.created_at)
        .fetch_one(&**self.connection)
        .await
        .map_err(store_error)
    }

    async fn list_offers_for_request(
        &self,
        request_id: Uuid,
    ) -> Result<Vec<OfferWithEducator>, StoreError> {
        sqlx::query_as(
            "SELECT offers.*, profiles.name AS educator_name, profiles.bio AS educator_bio, profiles.subjects AS educator_subjects FROM offers INNER JOIN profiles ON profiles.id = offers.educator_id WHERE offers.request_id = ? ORDER BY offers.created_at DESC",
        )
        .bind(request_id)
        .fetch_all(&**self.connection)
        .await
        .map_err(store_error)
    }

    async fn list_offers_by_educator(
        &self,
        educator_id: Uuid,
    ) -> Result<Vec<OfferWithRequestSummary>, StoreError> {
        sqlx::query_as(
            "SELECT offers.*, requests.title AS request_title, requests.subject AS request_subject, requests.exam_date AS request_exam_date, requests.curriculum_link AS request_curriculum_link FROM offers INNER JOIN requests ON requests.id = offers.request_id WHERE offers.educator_id = ? ORDER BY offers.created_at DESC",
        )
        .bind(educator_id)
        .fetch_all(&**self.connection)
        .await
        .map_err(store_error)
    }

    async fn find_accepted_offer(&self, request_id: Uuid) -> Result<Option<Offer>, StoreError> {
        sqlx::query_as("SELECT * FROM offers WHERE request_id = ? AND status = 'accepted'")
            .bind(request_id)
            .fetch_optional(&**self.connection)
            .await
            .map_err(store_error)
    }

    async fn begin_acceptance(&self) -> Result<Box<dyn AcceptanceUnit>, StoreError> {
        // Write lock up front: a racing unit waits here, then reads what this one committed.
        let tx = self
            .connection
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(store_error)?;
        Ok(Box::new(DbAcceptanceUnit { tx }))
    }
}

pub struct DbAcceptanceUnit {
    tx: Transaction<'static, Sqlite>,
}

#[async_trait]
impl AcceptanceUnit for DbAcceptanceUnit {
    async fn offer_with_request(
        &mut self,
        offer_id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<OfferWithRequest>, StoreError> {
        sqlx::query_as(
            "SELECT offers.id AS offer_id, offers.educator_id, offers.status AS offer_status, requests.id AS request_id, requests.student_id, requests.status AS request_status FROM offers INNER JOIN requests ON requests.id = offers.request_id WHERE offers.id = ? AND requests.student_id = ?",
        )
        .bind(offer_id)
        .bind(student_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(store_error)
    }

    async fn set_offer_status(
        &mut self,
        offer_id: Uuid,
        status: OfferStatus,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE offers SET status = ? WHERE id = ?")
            .bind(status)
            .bind(offer_id)
            .execute(&mut *self.tx)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn reject_other_offers(
        &mut self,
        request_id: Uuid,
        keep_offer_id: Uuid,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query("UPDATE offers SET status = ? WHERE request_id = ? AND id != ?")
            .bind(OfferStatus::Rejected)
            .bind(request_id)
            .bind(keep_offer_id)
            .execute(&mut *self.tx)
            .await
            .map_err(store_error)?;
        Ok(result.rows_affected())
    }

    async fn accept_request_if_open(&mut self, request_id: Uuid) -> Result<bool, StoreError> {
        let result =
            sqlx::query("UPDATE requests SET status = 'accepted' WHERE id = ? AND status = 'open'")
                .bind(request_id)
                .execute(&mut *self.tx)
                .await
                .map_err(store_error)?;
        Ok(result.rows_affected() == 1)
    }

    async fn conversation_for_request(
        &mut self,
        request_id: Uuid,
    ) -> Result<Option<Conversation>, StoreError> {
        sqlx::query_as("SELECT * FROM conversations WHERE request_id = ?")
            .bind(request_id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(store_error)
    }

    async fn insert_conversation(
        &mut self,
        conversation: Conversation,
    ) -> Result<Conversation, StoreError> {
        let mut savepoint = Acquire::begin(&mut self.tx).await.map_err(store_error)?;

        let inserted = sqlx::query_as(
            "INSERT INTO conversations (id, request_id, student_id, educator_id, created_at) VALUES (?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(conversation.id)
        .bind(conversation.request_id)
        .bind(conversation.student_id)
        .bind(conversation.educator_id)
        .bind(conversation.created_at)
        .fetch_one(&mut *savepoint)
        .await;

        match inserted {
            Ok(inserted) => {
                savepoint.commit().await.map_err(store_error)?;
                Ok(inserted)
            }
            Err(e) => {
                savepoint.rollback().await.map_err(store_error)?;
                Err(store_error(e))
            }
        }
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(store_error)
    }
}

const CONVERSATION_SUMMARY: &str = "SELECT conversations.*, requests.title AS request_title, requests.subject AS request_subject, students.name AS student_name, educators.name AS educator_name FROM conversations INNER JOIN requests ON requests.id = conversations.request_id INNER JOIN profiles AS students ON students.id = conversations.student_id INNER JOIN profiles AS educators ON educators.id = conversations.educator_id";

#[injectable(ConversationRepository)]
pub struct DbConversationRepository {
    connection: Ref<DatabaseConnection>,
}

#[async_trait]
impl ConversationRepository for DbConversationRepository {
    async fn list_conversations(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<ConversationSummary>, StoreError> {
        let query = format!(
            "{CONVERSATION_SUMMARY} WHERE conversations.student_id = ? OR conversations.educator_id = ? ORDER BY conversations.created_at DESC"
        );
        sqlx::query_as(&query)
            .bind(user_id)
            .bind(user_id)
            .fetch_all(&**self.connection)
            .await
            .map_err(store_error)
    }

    async fn find_conversation_summary(
        &self,
        conversation_id: Uuid,
    ) -> Result<Option<ConversationSummary>, StoreError> {
        let query = format!("{CONVERSATION_SUMMARY} WHERE conversations.id = ?");
        sqlx::query_as(&query)
            .bind(conversation_id)
            .fetch_optional(&**self.connection)
            .await
            .map_err(store_error)
    }

    async fn find_conversation_for_request(
        &self,
        request_id: Uuid,
    ) -> Result<Option<Conversation>, StoreError> {
        sqlx::query_as("SELECT * FROM conversations WHERE request_id = ?")
            .bind(request_id)
            .fetch_optional(&**self.connection)
            .await
            .map_err(store_error)
    }

    async fn find_conversation(
        &self,
        conversation_id: Uuid,
    ) -> Result<Option<Conversation>, StoreError> {
        sqlx::query_as("SELECT * FROM conversations WHERE id = ?")
            .bind(conversation_id)
            .fetch_optional(&**self.connection)
            .await
            .map_err(store_error)
    }

    async fn list_conversation_messages(
        &self,
        conversation_id: Uuid,
    ) -> Result<Vec<Message>, StoreError> {
        sqlx::query_as("SELECT * FROM messages WHERE conversation_id = ? ORDER BY created_at ASC")
            .bind(conversation_id)
            .fetch_all(&**self.connection)
            .await
            .map_err(store_error)
    }

    async fn create_message_in_conversation(&self, message: Message) -> Result<Message, StoreError> {
        sqlx::query_as(
            "INSERT INTO messages (id, conversation_id, sender_id, content, created_at) VALUES (?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(message.id)
        .bind(message.conversation_id)
        .bind(message.sender_id)
        .bind(message.content)
        .bind(message.created_at)
        .fetch_one(&**self.connection)
        .await
        .map_err(store_error)
    }
}
