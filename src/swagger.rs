use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{ClaimStatus, ServiceWindow};
use crate::handlers;
use crate::models::*;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::play::start_session,
        handlers::play::check_eligibility,
        handlers::play::submit_review,
        handlers::play::spin,
        handlers::claim::redeem,
    ),
    components(
        schemas(
            StartSessionRequest,
            SessionResponse,
            GateDenyReason,
            EligibilityRequest,
            EligibilityResponse,
            SubmitReviewRequest,
            SubmitReviewResponse,
            SpinRequest,
            SpinResponse,
            WonPrize,
            RedeemClaimRequest,
            RedeemClaimResponse,
            ServiceWindow,
            ClaimStatus,
        )
    ),
    tags(
        (name = "play", description = "Visitor gating, review acceptance and draws"),
        (name = "claims", description = "Redemption code lifecycle")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    );
}
