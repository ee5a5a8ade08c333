use crate::models::*;
use crate::services::ClaimService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/claims/redeem",
    tag = "claims",
    request_body = RedeemClaimRequest,
    responses(
        (status = 200, description = "Claim redeemed", body = RedeemClaimResponse),
        (status = 404, description = "Unknown code"),
        (status = 409, description = "Already redeemed"),
        (status = 410, description = "Claim expired")
    )
)]
/// Redeem a code exactly once. A second attempt on the same code always
/// fails with ALREADY_REDEEMED; overdue codes expire lazily at read time.
pub async fn redeem(
    service: web::Data<ClaimService>,
    body: web::Json<RedeemClaimRequest>,
) -> Result<HttpResponse> {
    match service.redeem(&body.into_inner().code).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn claim_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/claims").route("/redeem", web::post().to(redeem)));
}
