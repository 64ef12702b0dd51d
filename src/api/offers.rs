//! Offers endpoints for educators

use crate::api::offers::schemas::{MyOffer, MyOfferList};
use crate::api::{ApiError, ExtractUser};
use crate::core::traits::{OfferService, ProfileService};
use axum::routing::get;
use axum::{Json, Router};
use di_axum::Inject;

pub fn router() -> Router {
    Router::new().route("/", get(list_my_offers))
}

async fn list_my_offers(
    Inject(profile_service): Inject<dyn ProfileService>,
    Inject(offer_service): Inject<dyn OfferService>,
    ExtractUser(current_user): ExtractUser,
) -> Result<Json<MyOfferList>, ApiError> {
    let caller = profile_service.resolve_caller(current_user).await?;
    let offers = offer_service.list_my_offers(&caller).await?;

    Ok(Json(MyOfferList {
        offers: offers.into_iter().map(MyOffer::from).collect(),
    }))
}

pub mod schemas {
    use crate::infrastructure::entities;
    use crate::infrastructure::entities::OfferStatus;
    use chrono::{DateTime, NaiveDate, Utc};
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Deserialize, Debug)]
    pub struct CreateOffer {
        pub price: f64,
        pub timeline: String,
        pub study_plan: String,
    }

    #[derive(Serialize, Debug)]
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

    impl From<entities::Offer> for Offer {
        fn from(offer: entities::Offer) -> Self {
            Offer {
                id: offer.id,
                request_id: offer.request_id,
                educator_id: offer.educator_id,
                price: offer.price,
                timeline: offer.timeline,
                study_plan: offer.study_plan,
                status: offer.status,
                created_at: offer.created_at,
            }
        }
    }

    #[derive(Serialize, Debug)]
    pub struct Educator {
        pub id: Uuid,
        pub name: String,
        pub bio: Option<String>,
        pub subjects: Option<String>,
    }

    /// An offer as the requesting student compares it.
    #[derive(Serialize, Debug)]
    pub struct RequestOffer {
        #[serde(flatten)]
        pub offer: Offer,
        pub educator: Educator,
    }

    impl From<entities::OfferWithEducator> for RequestOffer {
        fn from(row: entities::OfferWithEducator) -> Self {
            RequestOffer {
                educator: Educator {
                    id: row.offer.educator_id,
                    name: row.educator_name,
                    bio: row.educator_bio,
                    subjects: row.educator_subjects,
                },
                offer: row.offer.into(),
            }
        }
    }

    #[derive(Serialize, Debug)]
    pub struct RequestOfferList {
        pub offers: Vec<RequestOffer>,
    }

    #[derive(Serialize, Debug)]
    pub struct RequestSummary {
        pub id: Uuid,
        pub title: String,
        pub subject: String,
        pub exam_date: Option<NaiveDate>,
        pub curriculum_link: Option<String>,
    }

    /// An offer as listed for the educator who made it.
    #[derive(Serialize, Debug)]
    pub struct MyOffer {
        #[serde(flatten)]
        pub offer: Offer,
        pub request: RequestSummary,
    }

    impl From<entities::OfferWithRequestSummary> for MyOffer {
        fn from(row: entities::OfferWithRequestSummary) -> Self {
            MyOffer {
                request: RequestSummary {
                    id: row.offer.request_id,
                    title: row.request_title,
                    subject: row.request_subject,
                    exam_date: row.request_exam_date,
                    curriculum_link: row.request_curriculum_link,
                },
                offer: row.offer.into(),
            }
        }
    }

    #[derive(Serialize, Debug)]
    pub struct MyOfferList {
        pub offers: Vec<MyOffer>,
    }
}
