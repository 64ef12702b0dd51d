//! Profile (onboarding) endpoints

use crate::api::profiles::schemas::{CreateProfile, Profile};
use crate::api::{ApiError, ExtractUser};
use crate::core::model::NewProfile;
use crate::core::traits::ProfileService;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use di_axum::Inject;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_profile))
        .route("/me", get(my_profile))
}

async fn create_profile(
    Inject(profile_service): Inject<dyn ProfileService>,
    ExtractUser(current_user): ExtractUser,
    Json(profile): Json<CreateProfile>,
) -> Result<(StatusCode, Json<Profile>), ApiError> {
    let created = profile_service
        .create_profile(
            current_user,
            NewProfile {
                role: profile.role,
                name: profile.name,
                bio: profile.bio,
                subjects: profile.subjects,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

async fn my_profile(
    Inject(profile_service): Inject<dyn ProfileService>,
    ExtractUser(current_user): ExtractUser,
) -> Result<Json<Profile>, ApiError> {
    let profile = profile_service.get_profile(current_user).await?;
    Ok(Json(profile.into()))
}

pub mod schemas {
    use crate::infrastructure::entities;
    use crate::infrastructure::entities::Role;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Deserialize, Debug)]
    pub struct CreateProfile {
        pub role: Role,
        pub name: String,
        pub bio: Option<String>,
        pub subjects: Option<String>,
    }

    #[derive(Serialize, Debug)]
    pub struct Profile {
        pub id: Uuid,
        pub role: Role,
        pub name: String,
        pub bio: Option<String>,
        pub subjects: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    impl From<entities::Profile> for Profile {
        fn from(profile: entities::Profile) -> Self {
            Profile {
                id: profile.id,
                role: profile.role,
                name: profile.name,
                bio: profile.bio,
                subjects: profile.subjects,
                created_at: profile.created_at,
            }
        }
    }
}
