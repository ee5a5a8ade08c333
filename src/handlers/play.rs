use crate::models::*;
use crate::services::{DrawService, IdentityService};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/play/session",
    tag = "play",
    request_body = StartSessionRequest,
    responses(
        (status = 200, description = "Fingerprint resolved, eligibility attached", body = SessionResponse),
        (status = 400, description = "Device hash too short"),
        (status = 404, description = "Unknown or inactive restaurant")
    )
)]
/// Resolve or create the fingerprint for (device hash, restaurant) and
/// report whether the device may play right now.
pub async fn start_session(
    service: web::Data<IdentityService>,
    body: web::Json<StartSessionRequest>,
) -> Result<HttpResponse> {
    let req = body.into_inner();
    match service
        .resolve_or_create(&req.device_hash, req.restaurant_id)
        .await
    {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/play/eligibility",
    tag = "play",
    request_body = EligibilityRequest,
    responses(
        (status = 200, description = "Geofence and service window evaluated", body = EligibilityResponse),
        (status = 404, description = "Unknown or inactive restaurant")
    )
)]
/// Probe the geofence and the current service window. Denials are ordinary
/// outcomes in the body, never HTTP errors.
pub async fn check_eligibility(
    service: web::Data<IdentityService>,
    body: web::Json<EligibilityRequest>,
) -> Result<HttpResponse> {
    let req = body.into_inner();
    match service
        .check_eligibility(req.restaurant_id, req.latitude, req.longitude)
        .await
    {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/play/review",
    tag = "play",
    request_body = SubmitReviewRequest,
    responses(
        (status = 200, description = "Review accepted, played-mark recorded", body = SubmitReviewResponse),
        (status = 403, description = "Geofence violation, closed service window or invalid session"),
        (status = 409, description = "Already played this window today")
    )
)]
/// Accept a review submission: enforce the gate and record the played-mark
/// as one conditional update. One participation per (fingerprint, day,
/// window).
pub async fn submit_review(
    service: web::Data<IdentityService>,
    body: web::Json<SubmitReviewRequest>,
) -> Result<HttpResponse> {
    let req = body.into_inner();
    match service
        .mark_played(
            req.fingerprint_id,
            req.restaurant_id,
            req.latitude,
            req.longitude,
        )
        .await
    {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/play/spin",
    tag = "play",
    request_body = SpinRequest,
    responses(
        (status = 200, description = "Draw executed; won:false covers both a losing draw and exhausted pools", body = SpinResponse),
        (status = 403, description = "Closed service window or invalid session"),
        (status = 409, description = "Allocation conflict after retries, try again")
    )
)]
/// Run one weighted draw against today's available pools. Requires an
/// accepted review in the current service window.
pub async fn spin(
    service: web::Data<DrawService>,
    body: web::Json<SpinRequest>,
) -> Result<HttpResponse> {
    let req = body.into_inner();
    match service.spin(req.fingerprint_id, req.restaurant_id).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn play_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/play")
            .route("/session", web::post().to(start_session))
            .route("/eligibility", web::post().to(check_eligibility))
            .route("/review", web::post().to(submit_review))
            .route("/spin", web::post().to(spin)),
    );
}
