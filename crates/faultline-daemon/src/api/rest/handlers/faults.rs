//! Fault trigger handler

use crate::api::rest::state::AppState;
use crate::dispatch::dispatch;
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use faultline_core::{FaultKind, FaultResult};

/// A routine's result rendered with the status it chose
#[derive(Debug)]
pub struct FaultReply(pub FaultResult);

impl IntoResponse for FaultReply {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.0)).into_response()
    }
}

/// Run the named fault and report its result
pub async fn trigger_fault(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<FaultReply> {
    let kind: FaultKind = name
        .parse()
        .map_err(|e: faultline_core::UnknownFault| ApiError::NotFound(e.to_string()))?;

    Ok(FaultReply(dispatch(kind, state.faults.clone()).await))
}
