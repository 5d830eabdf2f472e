//! Contact form handler

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use poshpoule_api_types::{LeadCreateRequest, MessageResponse};

use crate::application::leads::{LEAD_ACCEPTED_MESSAGE, SubmitLeadCommand};
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::extract::ApiJson;
use crate::infra::http::api::state::ApiState;

use super::lead_to_api;

pub async fn submit_lead(
    State(state): State<ApiState>,
    ApiJson(payload): ApiJson<LeadCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = SubmitLeadCommand {
        name: payload.name,
        email: payload.email,
        phone: payload.phone,
        subject: payload.subject,
        message: payload.message,
    };

    state.leads.submit(command).await.map_err(lead_to_api)?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: LEAD_ACCEPTED_MESSAGE.to_string(),
        }),
    ))
}
