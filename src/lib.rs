//! Unmask marketplace API - library exports for the server binary and tests
//!
//! Students post exam-preparation requests, educators bid on them with study-plan offers, and
//! accepting an offer opens a conversation between the two.

pub mod api;
pub mod config;
pub mod core;
pub mod infrastructure;

use crate::core::offers::MarketplaceOfferService;
use crate::core::services::{
    MarketplaceConversationService, MarketplaceProfileService, MarketplaceRequestService,
};
use crate::infrastructure::database::DatabaseConnection;
use crate::infrastructure::repositories::{
    DbConversationRepository, DbOfferRepository, DbProfileRepository, DbRequestRepository,
};
use axum::Router;
use di::{Injectable, ServiceCollection};

/// Registers the database, repositories and services.
pub fn services() -> ServiceCollection {
    let mut services = ServiceCollection::new();
    services
        .add(DatabaseConnection::singleton())
        .add(DbProfileRepository::scoped())
        .add(DbRequestRepository::scoped())
        .add(DbOfferRepository::scoped())
        .add(DbConversationRepository::scoped())
        .add(MarketplaceProfileService::scoped())
        .add(MarketplaceRequestService::scoped())
        .add(MarketplaceOfferService::scoped())
        .add(MarketplaceConversationService::scoped());
    services
}

/// All API routes, without a service provider attached.
pub fn router() -> Router {
    Router::new()
        .nest("/profiles", api::profiles::router())
        .nest("/requests", api::requests::router())
        .nest("/marketplace", api::requests::marketplace_router())
        .nest("/offers", api::offers::router())
        .nest("/conversations", api::conversations::router())
}
