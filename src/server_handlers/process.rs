//! Widgets por tramo de proceso: `/api/process/{inner|outer}/{tramo}/{info|trend|share}`.
//!
//! El tramo se resuelve por nombre chino o alias ASCII contra `SEGMENTS`;
//! un tramo desconocido es 404.

use actix_web::{web, HttpResponse};

use crate::algorithm::find_segment;
use crate::api_json::{envelope, TimeQuery, TrendBody};
use crate::error::ApiResult;
use crate::server::AppState;

/// GET info (`?timeType`, por defecto año)
pub async fn segment_info_handler(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    query: web::Query<TimeQuery>,
) -> ApiResult<HttpResponse> {
    let (plant, segment) = path.into_inner();
    let spec = find_segment(&plant, &segment)?;
    let period = query.period()?;
    let units = state.table(&spec.units).await?;
    Ok(envelope(spec.info(&units, period)?))
}

/// POST trend `{qtype, timeType}`
pub async fn segment_trend_handler(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    body: web::Json<TrendBody>,
) -> ApiResult<HttpResponse> {
    let (plant, segment) = path.into_inner();
    let spec = find_segment(&plant, &segment)?;
    let period = body.period()?;
    let units = state.table(&spec.units).await?;
    let sections = state.table(&spec.sections).await?;
    Ok(envelope(spec.trend(&units, &sections, period, body.qtype)?))
}

/// GET share (`?timeType`, por defecto año)
pub async fn segment_share_handler(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    query: web::Query<TimeQuery>,
) -> ApiResult<HttpResponse> {
    let (plant, segment) = path.into_inner();
    let spec = find_segment(&plant, &segment)?;
    let period = query.period()?;
    let units = state.table(&spec.units).await?;
    Ok(envelope(spec.share(&units, period)?))
}
