//! Informational notices shown to members on login.

use std::sync::Arc;

use tracing::info;

use studio_core::error::AppError;
use studio_core::result::AppResult;
use studio_core::traits::Clock;
use studio_database::NoticeStore;
use studio_entity::notice::{CreateNotice, InfoNotice};

use crate::context::RequestContext;

#[derive(Debug, Clone)]
pub struct NoticeService {
    notices: Arc<dyn NoticeStore>,
    clock: Arc<dyn Clock>,
}

impl NoticeService {
    pub fn new(notices: Arc<dyn NoticeStore>, clock: Arc<dyn Clock>) -> Self {
        Self { notices, clock }
    }

    /// The newest notice, if any.
    pub async fn latest(&self) -> AppResult<Option<InfoNotice>> {
        self.notices.latest().await
    }

    pub async fn publish(&self, ctx: &RequestContext, data: CreateNotice) -> AppResult<InfoNotice> {
        ctx.require_admin()?;
        let data = CreateNotice {
            title: data.title.trim().to_string(),
            description: data.description.trim().to_string(),
            link: data
                .link
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty()),
        };
        if data.title.is_empty() || data.description.is_empty() {
            return Err(AppError::validation(
                "A notice needs a title and a description",
            ));
        }

        let notice = self.notices.create(data, self.clock.now()).await?;
        info!(admin_id = %ctx.user_id, notice_id = %notice.id, "Notice published");
        Ok(notice)
    }

    /// Remove every notice. Returns how many were deleted.
    pub async fn clear(&self, ctx: &RequestContext) -> AppResult<u64> {
        ctx.require_admin()?;
        let removed = self.notices.clear().await?;
        info!(admin_id = %ctx.user_id, removed, "Notices cleared");
        Ok(removed)
    }
}
