//! Request/response shapes for callers that hand the interpolator a JSON document.

use crate::{
    config::AppConfig,
    error::{MacroError, Result},
    macros::{MacroCount, MacroInterpolator},
    time::{parse_time_range, TimeRange},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InterpolateRequest {
    pub query: String,
    #[serde(default)]
    pub from: Option<i64>,
    #[serde(default)]
    pub to: Option<i64>,
    /// Preset such as `last_1h` or `[start,end]`. Ignored when `from`/`to` are set.
    #[serde(default)]
    pub range: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InterpolateResponse {
    pub sql: String,
    pub from: i64,
    pub to: i64,
    pub expansions: Vec<MacroCount>,
}

/// Picks the window for a request: explicit bounds, then the request's range
/// preset, then the configured default.
pub fn resolve_range(
    config: &AppConfig,
    request: &InterpolateRequest,
    now: DateTime<Utc>,
) -> Result<TimeRange> {
    match (request.from, request.to) {
        (Some(from), Some(to)) => Ok(TimeRange::new(from, to)),
        (None, None) => {
            let preset = request
                .range
                .as_deref()
                .unwrap_or(config.default_range.as_str());
            parse_time_range(preset)?.resolve(now)
        }
        _ => Err(MacroError::InvalidRequest(
            "from and to must be supplied together".into(),
        )),
    }
}

pub fn interpolate_request(
    config: &AppConfig,
    request: InterpolateRequest,
    now: DateTime<Utc>,
) -> Result<InterpolateResponse> {
    let range = resolve_range(config, &request, now)?;
    let expansion = MacroInterpolator::new(range).interpolate_with_report(&request.query);
    debug!(
        from = range.from,
        to = range.to,
        rewritten = expansion.total(),
        "interpolated request"
    );

    Ok(InterpolateResponse {
        sql: expansion.sql,
        from: range.from,
        to: range.to,
        expansions: expansion.counts,
    })
}
