//! Query-string parameters shared by the history endpoints.

use chrono::{Duration, Utc};
use serde::Deserialize;
use warlog_core::query::Window;

use crate::error::ApiError;

/// `?hours=<n>&limit=<n>` for windowed history.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
  pub hours: Option<i64>,
  pub limit: Option<usize>,
}

impl HistoryParams {
  /// The window ending now, `hours` long (or `default_hours` when omitted).
  pub fn window(&self, default_hours: i64) -> Result<Window, ApiError> {
    let hours = self.hours.unwrap_or(default_hours);
    if hours <= 0 {
      return Err(ApiError::BadRequest(format!("hours must be positive, got {hours}")));
    }
    let now = Utc::now();
    // Too many hours to subtract from now would otherwise mean "all time".
    if Duration::try_hours(hours).and_then(|d| now.checked_sub_signed(d)).is_none() {
      return Err(ApiError::BadRequest(format!("hours out of range, got {hours}")));
    }
    let limit = self.limit.unwrap_or(Window::DEFAULT_LIMIT);
    Ok(Window::last_hours(now, hours, limit))
  }
}
