//! Request endpoints, including the offers made against a request

use crate::api::offers::schemas::{CreateOffer, Offer, RequestOffer, RequestOfferList};
use crate::api::requests::schemas::{
    CreateRequest, MarketplaceList, MarketplaceRequest, Request, RequestDetail, RequestList,
};
use crate::api::{ApiError, ExtractUser};
use crate::core::model::{AcceptOfferOutcome, NewOffer, NewRequest};
use crate::core::traits::{OfferService, ProfileService, RequestService};
use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use di_axum::Inject;
use uuid::Uuid;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_my_requests).post(create_request))
        .route("/:id", get(get_request))
        .route("/:id/offers", get(list_offers).post(submit_offer))
        .route("/:id/offers/:offer_id/accept", post(accept_offer))
}

pub fn marketplace_router() -> Router {
    Router::new().route("/", get(marketplace))
}

async fn list_my_requests(
    Inject(profile_service): Inject<dyn ProfileService>,
    Inject(request_service): Inject<dyn RequestService>,
    ExtractUser(current_user): ExtractUser,
) -> Result<Json<RequestList>, ApiError> {
    let caller = profile_service.resolve_caller(current_user).await?;
    let requests = request_service.list_my_requests(&caller).await?;

    Ok(Json(RequestList {
        requests: requests.into_iter().map(Request::from).collect(),
    }))
}

async fn create_request(
    Inject(profile_service): Inject<dyn ProfileService>,
    Inject(request_service): Inject<dyn RequestService>,
    ExtractUser(current_user): ExtractUser,
    Json(request): Json<CreateRequest>,
) -> Result<(StatusCode, Json<Request>), ApiError> {
    let caller = profile_service.resolve_caller(current_user).await?;
    let created = request_service
        .create_request(
            &caller,
            NewRequest {
                title: request.title,
                subject: request.subject,
                description: request.description,
                curriculum_link: request.curriculum_link,
                exam_date: request.exam_date,
                budget_min: request.budget_min,
                budget_max: request.budget_max,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

async fn marketplace(
    Inject(profile_service): Inject<dyn ProfileService>,
    Inject(request_service): Inject<dyn RequestService>,
    ExtractUser(current_user): ExtractUser,
) -> Result<Json<MarketplaceList>, ApiError> {
    let caller = profile_service.resolve_caller(current_user).await?;
    let entries = request_service.list_marketplace(&caller).await?;

    Ok(Json(MarketplaceList {
        requests: entries.into_iter().map(MarketplaceRequest::from).collect(),
    }))
}

async fn get_request(
    Inject(profile_service): Inject<dyn ProfileService>,
    Inject(request_service): Inject<dyn RequestService>,
    ExtractUser(current_user): ExtractUser,
    Path(request_id): Path<Uuid>,
) -> Result<Json<RequestDetail>, ApiError> {
    let caller = profile_service.resolve_caller(current_user).await?;
    let detail = request_service.get_request(&caller, request_id).await?;
    Ok(Json(detail.into()))
}

async fn list_offers(
    Inject(profile_service): Inject<dyn ProfileService>,
    Inject(offer_service): Inject<dyn OfferService>,
    ExtractUser(current_user): ExtractUser,
    Path(request_id): Path<Uuid>,
) -> Result<Json<RequestOfferList>, ApiError> {
    let caller = profile_service.resolve_caller(current_user).await?;
    let offers = offer_service
        .list_offers_for_request(&caller, request_id)
        .await?;

    Ok(Json(RequestOfferList {
        offers: offers.into_iter().map(RequestOffer::from).collect(),
    }))
}

async fn submit_offer(
    Inject(profile_service): Inject<dyn ProfileService>,
    Inject(offer_service): Inject<dyn OfferService>,
    ExtractUser(current_user): ExtractUser,
    Path(request_id): Path<Uuid>,
    Json(offer): Json<CreateOffer>,
) -> Result<(StatusCode, Json<Offer>), ApiError> {
    let caller = profile_service.resolve_caller(current_user).await?;
    let created = offer_service
        .submit_offer(
            &caller,
            request_id,
            NewOffer {
                price: offer.price,
                timeline: offer.timeline,
                study_plan: offer.study_plan,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

async fn accept_offer(
    Inject(profile_service): Inject<dyn ProfileService>,
    Inject(offer_service): Inject<dyn OfferService>,
    ExtractUser(current_user): ExtractUser,
    Path((request_id, offer_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<AcceptOfferOutcome>, ApiError> {
    let caller = profile_service.resolve_caller(current_user).await?;
    let outcome = offer_service
        .accept_offer(offer_id, request_id, &caller)
        .await?;
    Ok(Json(outcome))
}

pub mod schemas {
    use crate::api::offers::schemas::Offer;
    use crate::core::model;
    use crate::core::model::MarketplaceEntry;
    use crate::infrastructure::entities;
    use crate::infrastructure::entities::RequestStatus;
    use chrono::{DateTime, NaiveDate, Utc};
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Deserialize, Debug)]
    pub struct CreateRequest {
        pub title: String,
        pub subject: String,
        pub description: String,
        pub curriculum_link: Option<String>,
        pub exam_date: Option<NaiveDate>,
        pub budget_min: Option<f64>,
        pub budget_max: Option<f64>,
    }

    #[derive(Serialize, Debug)]
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

    impl From<entities::Request> for Request {
        fn from(request: entities::Request) -> Self {
            Request {
                id: request.id,
                student_id: request.student_id,
                title: request.title,
                subject: request.subject,
                description: request.description,
                curriculum_link: request.curriculum_link,
                exam_date: request.exam_date,
                budget_min: request.budget_min,
                budget_max: request.budget_max,
                status: request.status,
                created_at: request.created_at,
            }
        }
    }

    #[derive(Serialize, Debug)]
    pub struct RequestDetail {
        #[serde(flatten)]
        pub request: Request,
        pub accepted_offer: Option<Offer>,
        pub conversation_id: Option<Uuid>,
    }

    impl From<model::RequestDetail> for RequestDetail {
        fn from(detail: model::RequestDetail) -> Self {
            RequestDetail {
                request: detail.request.into(),
                accepted_offer: detail.accepted_offer.map(Offer::from),
                conversation_id: detail.conversation_id,
            }
        }
    }

    #[derive(Serialize, Debug)]
    pub struct RequestList {
        pub requests: Vec<Request>,
    }

    #[derive(Serialize, Debug)]
    pub struct MarketplaceRequest {
        #[serde(flatten)]
        pub request: Request,
        pub matches_subjects: bool,
        pub already_offered: bool,
    }

    impl From<MarketplaceEntry> for MarketplaceRequest {
        fn from(entry: MarketplaceEntry) -> Self {
            MarketplaceRequest {
                request: entry.request.into(),
                matches_subjects: entry.matches_subjects,
                already_offered: entry.already_offered,
            }
        }
    }

    #[derive(Serialize, Debug)]
    pub struct MarketplaceList {
        pub requests: Vec<MarketplaceRequest>,
    }
}
