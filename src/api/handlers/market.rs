use crate::{
    auth::Session,
    market::PriceSeries,
    types::{AppError, Result},
    AppState,
};
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StockQuery {
    /// Instrument name, e.g. `gold`
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Daily prices for one instrument
#[utoipa::path(
    get,
    path = "/api/stock",
    params(StockQuery),
    responses(
        (status = 200, description = "Prices keyed by ISO date", body = BTreeMap<String, f32>),
        (status = 400, description = "Missing type parameter"),
        (status = 401, description = "Missing, invalid or expired session"),
        (status = 404, description = "Unknown instrument")
    ),
    tag = "market"
)]
pub async fn stock(
    State(state): State<AppState>,
    _session: Session,
    Query(query): Query<StockQuery>,
) -> Result<Json<PriceSeries>> {
    let kind = query
        .kind
        .filter(|k| !k.is_empty())
        .ok_or_else(|| AppError::InvalidInput("'type' query parameter is required".to_string()))?;

    state
        .market
        .lookup(&kind)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound("unknown stock type".to_string()))
}
