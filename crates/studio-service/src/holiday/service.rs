//! Holiday registry.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use studio_core::error::AppError;
use studio_core::result::AppResult;
use studio_core::traits::Clock;
use studio_database::HolidayStore;
use studio_entity::holiday::{DEFAULT_HOLIDAY_DESCRIPTION, Holiday};

use crate::context::RequestContext;

#[derive(Debug, Clone)]
pub struct HolidayService {
    holidays: Arc<dyn HolidayStore>,
    clock: Arc<dyn Clock>,
}

impl HolidayService {
    pub fn new(holidays: Arc<dyn HolidayStore>, clock: Arc<dyn Clock>) -> Self {
        Self { holidays, clock }
    }

    /// Mark `date` as a day without classes.
    pub async fn mark(
        &self,
        ctx: &RequestContext,
        date: NaiveDate,
        description: Option<String>,
    ) -> AppResult<Holiday> {
        ctx.require_admin()?;
        let description = description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| DEFAULT_HOLIDAY_DESCRIPTION.to_string());

        let holiday = self
            .holidays
            .create(date, &description, self.clock.now())
            .await?;
        info!(admin_id = %ctx.user_id, date = %date, "Holiday marked");
        Ok(holiday)
    }

    pub async fn list(&self) -> AppResult<Vec<Holiday>> {
        self.holidays.list().await
    }

    pub async fn remove(&self, ctx: &RequestContext, date: NaiveDate) -> AppResult<()> {
        ctx.require_admin()?;
        if !self.holidays.delete_by_date(date).await? {
            return Err(AppError::not_found(format!("No holiday on {date}")));
        }
        info!(admin_id = %ctx.user_id, date = %date, "Holiday removed");
        Ok(())
    }
}
