//! Offer submission and the offer-acceptance transaction.

use crate::core::error::MarketplaceError;
use crate::core::model::{AcceptOfferOutcome, CallerIdentity, NewOffer, required};
use crate::core::traits::OfferService;
use crate::infrastructure::entities::{
    Conversation, Offer, OfferStatus, OfferWithEducator, OfferWithRequest,
    OfferWithRequestSummary, RequestStatus,
};
use crate::infrastructure::error::StoreError;
use crate::infrastructure::traits::{AcceptanceUnit, OfferRepository, RequestRepository};
use async_trait::async_trait;
use chrono::Utc;
use di::{Ref, injectable};
use log::{info, warn};
use uuid::Uuid;

#[injectable(OfferService)]
pub struct MarketplaceOfferService {
    offers: Ref<dyn OfferRepository>,
    requests: Ref<dyn RequestRepository>,
}

/// What accepting an offer has to do given the current state of the offer and its request.
#[derive(Debug, PartialEq, Eq)]
enum Resolution {
    /// Open request, pending offer: run the full transition.
    Transition,
    /// The offer already won; only make sure the conversation exists.
    Retry,
}

fn plan_resolution(found: &OfferWithRequest) -> Result<Resolution, MarketplaceError> {
    match (found.request_status, found.offer_status) {
        (RequestStatus::Open, OfferStatus::Pending) => Ok(Resolution::Transition),
        (RequestStatus::Open, OfferStatus::Accepted) => Ok(Resolution::Transition),
        (RequestStatus::Open, OfferStatus::Rejected) => Err(MarketplaceError::conflict(
            "offer has already been rejected",
        )),
        (RequestStatus::Accepted, OfferStatus::Accepted) => Ok(Resolution::Retry),
        (RequestStatus::Accepted, _) => Err(MarketplaceError::conflict(
            "request has already accepted another offer",
        )),
        (RequestStatus::Closed, _) => Err(MarketplaceError::conflict("request is closed")),
    }
}

impl MarketplaceOfferService {
    /// Reuses the conversation of the request or creates it. An insert failure is logged and
    /// reported as `None`; it never fails the acceptance. Losing the insert to an existing
    /// conversation reports that one.
    async fn provision_conversation(
        unit: &mut dyn AcceptanceUnit,
        found: &OfferWithRequest,
    ) -> Result<Option<Uuid>, MarketplaceError> {
        if let Some(existing) = unit.conversation_for_request(found.request_id).await? {
            return Ok(Some(existing.id));
        }

        let created = unit
            .insert_conversation(Conversation {
                id: Uuid::new_v4(),
                request_id: found.request_id,
                student_id: found.student_id,
                educator_id: found.educator_id,
                created_at: Utc::now(),
            })
            .await;

        match created {
            Ok(conversation) => Ok(Some(conversation.id)),
            Err(StoreError::Duplicate) => Ok(unit
                .conversation_for_request(found.request_id)
                .await?
                .map(|existing| existing.id)),
            Err(e) => {
                warn!(
                    "offer {} accepted but conversation for request {} was not created: {e}",
                    found.offer_id, found.request_id
                );
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl OfferService for MarketplaceOfferService {
    async fn submit_offer(
        &self,
        caller: &CallerIdentity,
        request_id: Uuid,
        offer: NewOffer,
    ) -> Result<Offer, MarketplaceError> {
        caller.require_educator("submit offers")?;

        if !offer.price.is_finite() || offer.price < 0.0 {
            return Err(MarketplaceError::invalid("price must be a non-negative amount"));
        }
        let timeline = required("timeline", offer.timeline)?;
        let study_plan = required("study_plan", offer.study_plan)?;

        self.requests
            .find_request(request_id)
            .await?
            .filter(|request| request.status == RequestStatus::Open)
            .ok_or(MarketplaceError::NotFound {
                what: "open request",
            })?;

        let created = self
            .offers
            .create_offer(Offer {
                id: Uuid::new_v4(),
                request_id,
                educator_id: caller.id,
                price: offer.price,
                timeline,
                study_plan,
                status: OfferStatus::Pending,
                created_at: Utc::now(),
            })
            .await?;

        info!("offer {} submitted on request {request_id}", created.id);
        Ok(created)
    }

    async fn list_offers_for_request(
        &self,
        caller: &CallerIdentity,
        request_id: Uuid,
    ) -> Result<Vec<OfferWithEducator>, MarketplaceError> {
        caller.require_student("review offers")?;

        self.requests
            .find_request(request_id)
            .await?
            .filter(|request| request.student_id == caller.id)
            .ok_or(MarketplaceError::NotFound { what: "request" })?;

        Ok(self.offers.list_offers_for_request(request_id).await?)
    }

    async fn list_my_offers(
        &self,
        caller: &CallerIdentity,
    ) -> Result<Vec<OfferWithRequestSummary>, MarketplaceError> {
        caller.require_educator("list their offers")?;
        Ok(self.offers.list_offers_by_educator(caller.id).await?)
    }

    async fn accept_offer(
        &self,
        offer_id: Uuid,
        request_id: Uuid,
        caller: &CallerIdentity,
    ) -> Result<AcceptOfferOutcome, MarketplaceError> {
        caller.require_student("accept offers")?;

        let mut unit = self.offers.begin_acceptance().await?;

        let found = unit
            .offer_with_request(offer_id, caller.id)
            .await?
            .filter(|found| found.request_id == request_id)
            .ok_or(MarketplaceError::NotFound { what: "offer" })?;

        if plan_resolution(&found)? == Resolution::Transition {
            unit.set_offer_status(offer_id, OfferStatus::Accepted).await?;
            let rejected = unit.reject_other_offers(request_id, offer_id).await?;

            if !unit.accept_request_if_open(request_id).await? {
                // Dropping the unit rolls back the offer updates above.
                return Err(MarketplaceError::conflict(
                    "request was accepted concurrently",
                ));
            }

            info!("offer {offer_id} accepted on request {request_id}, {rejected} rejected");
        }

        let conversation_id = Self::provision_conversation(unit.as_mut(), &found).await?;
        unit.commit().await?;

        Ok(AcceptOfferOutcome {
            success: true,
            conversation_id,
        })
    }
}
