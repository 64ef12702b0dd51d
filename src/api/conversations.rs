//! Conversations endpoints

use crate::api::conversations::schemas::{ConversationList, CreateMessage, MessagesList};
use crate::api::{ApiError, ExtractUser};
use crate::core::traits::{ConversationService, ProfileService};
use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use di_axum::Inject;
use uuid::Uuid;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_conversations))
        .route("/:id", get(get_conversation))
        .route(
            "/:id/messages",
            get(conversation_messages).post(post_message),
        )
}

async fn list_conversations(
    Inject(profile_service): Inject<dyn ProfileService>,
    Inject(conversation_service): Inject<dyn ConversationService>,
    ExtractUser(current_user): ExtractUser,
) -> Result<Json<ConversationList>, ApiError> {
    let caller = profile_service.resolve_caller(current_user).await?;
    let conversations = conversation_service.list_conversations(&caller).await?;

    Ok(Json(ConversationList {
        conversations: conversations
            .into_iter()
            .map(schemas::Conversation::from)
            .collect(),
    }))
}

async fn get_conversation(
    Inject(profile_service): Inject<dyn ProfileService>,
    Inject(conversation_service): Inject<dyn ConversationService>,
    ExtractUser(current_user): ExtractUser,
    Path(conversation_id): Path<Uuid>,
) -> Result<Json<schemas::Conversation>, ApiError> {
    let caller = profile_service.resolve_caller(current_user).await?;
    let conversation = conversation_service
        .get_conversation(&caller, conversation_id)
        .await?;
    Ok(Json(conversation.into()))
}

async fn conversation_messages(
    Inject(profile_service): Inject<dyn ProfileService>,
    Inject(conversation_service): Inject<dyn ConversationService>,
    Path(conversation_id): Path<Uuid>,
    ExtractUser(current_user): ExtractUser,
) -> Result<Json<MessagesList>, ApiError> {
    let caller = profile_service.resolve_caller(current_user).await?;
    let messages = conversation_service
        .list_messages(&caller, conversation_id)
        .await?;

    Ok(Json(MessagesList {
        messages: messages.into_iter().map(schemas::Message::from).collect(),
    }))
}

async fn post_message(
    Inject(profile_service): Inject<dyn ProfileService>,
    Inject(conversation_service): Inject<dyn ConversationService>,
    ExtractUser(current_user): ExtractUser,
    Path(conversation_id): Path<Uuid>,
    Json(message): Json<CreateMessage>,
) -> Result<(StatusCode, Json<schemas::Message>), ApiError> {
    let caller = profile_service.resolve_caller(current_user).await?;
    let message = conversation_service
        .post_message(&caller, conversation_id, message.content)
        .await?;

    Ok((StatusCode::CREATED, Json(message.into())))
}

pub mod schemas {
    use crate::infrastructure::entities;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Serialize, Debug)]
    pub struct ConversationRequest {
        pub id: Uuid,
        pub title: String,
        pub subject: String,
    }

    #[derive(Serialize, Debug)]
    pub struct Participant {
        pub id: Uuid,
        pub name: String,
    }

    #[derive(Serialize, Debug)]
    pub struct Conversation {
        pub id: Uuid,
        pub request: ConversationRequest,
        pub student: Participant,
        pub educator: Participant,
        pub created_at: DateTime<Utc>,
    }

    impl From<entities::ConversationSummary> for Conversation {
        fn from(summary: entities::ConversationSummary) -> Self {
            let conversation = summary.conversation;
            Conversation {
                id: conversation.id,
                request: ConversationRequest {
                    id: conversation.request_id,
                    title: summary.request_title,
                    subject: summary.request_subject,
                },
                student: Participant {
                    id: conversation.student_id,
                    name: summary.student_name,
                },
                educator: Participant {
                    id: conversation.educator_id,
                    name: summary.educator_name,
                },
                created_at: conversation.created_at,
            }
        }
    }

    #[derive(Serialize, Debug)]
    pub struct ConversationList {
        pub conversations: Vec<Conversation>,
    }

    #[derive(Serialize, Debug, Default)]
    pub struct MessagesList {
        pub messages: Vec<Message>,
    }

    #[derive(Serialize, Debug)]
    pub struct Message {
        pub conversation_id: Uuid,
        pub id: Uuid,
        pub sender_id: Uuid,
        pub content: String,
        pub created_at: DateTime<Utc>,
    }

    impl From<entities::Message> for Message {
        fn from(message: entities::Message) -> Self {
            Message {
                conversation_id: message.conversation_id,
                id: message.id,
                sender_id: message.sender_id,
                content: message.content,
                created_at: message.created_at,
            }
        }
    }

    #[derive(Deserialize, Debug)]
    pub struct CreateMessage {
        pub content: String,
    }
}
