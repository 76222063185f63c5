// SPDX-FileCopyrightText: 2026 Turnstile Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the ticket REST API.

use axum::{
    Json,
    body::Bytes,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use turnstile_core::{
    CallOutcome, CounterId, HealthStatus, NewTicket, Page, PageRequest, Ticket, TicketFilter,
    TicketId, TicketStatus, TurnstileError,
};

use crate::auth::Agent;
use crate::error::ApiError;
use crate::server::GatewayState;

/// Detail returned when a call-next finds nothing to serve.
pub const QUEUE_EMPTY_DETAIL: &str = "No more customers in the queue";

/// Query string for `GET /api/tickets`.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub number: Option<String>,
    pub customer_name: Option<String>,
    pub mobile_number: Option<String>,
    pub email: Option<String>,
    pub status: Option<TicketStatus>,
    pub created_from: Option<NaiveDate>,
    pub created_to: Option<NaiveDate>,
}

impl ListParams {
    fn into_parts(self) -> (TicketFilter, PageRequest) {
        let page = PageRequest::new(self.page, self.page_size);
        let filter = TicketFilter {
            number: self.number,
            customer_name: self.customer_name,
            mobile_number: self.mobile_number,
            email: self.email,
            status: self.status,
            created_from: self.created_from,
            created_to: self.created_to,
        };
        (filter, page)
    }
}

/// Query string for `GET /api/tickets/in-progress`.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Body of `POST /api/tickets/call-next`. May be empty.
#[derive(Debug, Default, Deserialize)]
pub struct CallNextRequest {
    #[serde(default)]
    pub counter_id: Option<CounterId>,
}

/// Response of a successful call-next.
#[derive(Debug, Serialize)]
pub struct CallNextResponse {
    pub id: TicketId,
    pub ticket_number: String,
    pub counter_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_ticket_id: Option<TicketId>,
}

/// Body of `POST /api/tickets/{id}/redirect`.
#[derive(Debug, Deserialize)]
pub struct RedirectRequest {
    pub counter_id: CounterId,
}

/// Response body for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

fn query<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    params
        .map(|Query(value)| value)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

fn ticket_id(raw: &str) -> Result<TicketId, ApiError> {
    raw.parse()
        .map_err(|_| TurnstileError::not_found("ticket", raw).into())
}

/// POST /api/tickets
pub async fn post_ticket(
    State(state): State<GatewayState>,
    body: Result<Json<NewTicket>, JsonRejection>,
) -> Result<(StatusCode, Json<Ticket>), ApiError> {
    let ticket = state.queue.issue_ticket(json_body(body)?).await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

/// GET /api/tickets
pub async fn list_tickets(
    State(state): State<GatewayState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Page<Ticket>>, ApiError> {
    let (filter, page) = query(params)?.into_parts();
    Ok(Json(state.queue.list_tickets(filter, page).await?))
}

/// GET /api/tickets/{id}
pub async fn get_ticket(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<Json<Ticket>, ApiError> {
    Ok(Json(state.queue.get_ticket(ticket_id(&id)?).await?))
}

/// GET /api/tickets/in-progress
pub async fn list_in_progress(
    State(state): State<GatewayState>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> Result<Json<Page<Ticket>>, ApiError> {
    let params = query(params)?;
    let page = PageRequest::new(params.page, params.page_size);
    Ok(Json(state.queue.list_in_progress(page).await?))
}

/// POST /api/tickets/call-next
///
/// Answers 404 with [`QUEUE_EMPTY_DETAIL`] when nothing is waiting.
pub async fn call_next(
    State(state): State<GatewayState>,
    Agent(agent): Agent,
    body: Bytes,
) -> Result<Json<CallNextResponse>, ApiError> {
    let request: CallNextRequest = if body.iter().all(u8::is_ascii_whitespace) {
        CallNextRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| ApiError::bad_request(e.to_string()))?
    };

    match state.queue.call_next(&agent, request.counter_id).await? {
        CallOutcome::Called(assignment) => Ok(Json(CallNextResponse {
            id: assignment.ticket.id,
            ticket_number: assignment.ticket.number.clone(),
            counter_number: assignment.ticket.counter_number,
            completed_ticket_id: assignment.completed,
        })),
        CallOutcome::QueueEmpty => Err(ApiError::status(
            StatusCode::NOT_FOUND,
            QUEUE_EMPTY_DETAIL,
        )),
    }
}

/// POST /api/tickets/{id}/redirect
pub async fn redirect(
    State(state): State<GatewayState>,
    Agent(agent): Agent,
    Path(id): Path<String>,
    body: Result<Json<RedirectRequest>, JsonRejection>,
) -> Result<Json<Ticket>, ApiError> {
    let id = ticket_id(&id)?;
    let request = json_body(body)?;
    tracing::debug!(%agent, ticket_id = %id, "redirect requested");
    Ok(Json(state.queue.redirect(id, request.counter_id).await?))
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Response {
    let (code, status) = match state.queue.store().health_check().await {
        Ok(HealthStatus::Healthy) => (StatusCode::OK, "ok".to_string()),
        Ok(HealthStatus::Unhealthy(reason)) => {
            (StatusCode::SERVICE_UNAVAILABLE, format!("unhealthy: {reason}"))
        }
        Err(e) => (StatusCode::SERVICE_UNAVAILABLE, format!("unhealthy: {e}")),
    };
    let body = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
    };
    (code, Json(body)).into_response()
}

/// GET /metrics
pub async fn get_metrics(State(state): State<GatewayState>) -> Response {
    match &state.health.prometheus_render {
        Some(render) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            render(),
        )
            .into_response(),
        None => ApiError::status(StatusCode::NOT_FOUND, "metrics are disabled").into_response(),
    }
}
