//! Shared fixture for service tests: every service wired to one in-memory
//! store and a clock the test controls.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use studio_auth::{JwtDecoder, JwtEncoder};
use studio_core::config::{AuthConfig, BookingConfig};
use studio_core::traits::{Clock, FixedClock};
use studio_database::{MemoryStore, Stores};
use studio_entity::schedule::{SlotSelection, StudioDay};
use studio_entity::user::{CreateUser, UserRole};

use crate::account::AccountService;
use crate::booking::{AdminBookingService, BookingService};
use crate::context::RequestContext;
use crate::holiday::HolidayService;
use crate::maintenance::MaintenanceService;
use crate::notice::NoticeService;
use crate::notify::{Notifier, RecordingNotifier};
use crate::turn::TurnService;
use crate::user::AdminUserService;

pub(crate) fn utc(month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, month, day, hour, 0, 0).unwrap()
}

pub(crate) fn slot(day: StudioDay, hour: &str) -> SlotSelection {
    SlotSelection::new(day, hour).unwrap()
}

pub(crate) struct Fixture {
    pub stores: Stores,
    pub clock: Arc<FixedClock>,
    pub notifier: Arc<RecordingNotifier>,
    pub booking: BookingService,
    pub admin_booking: AdminBookingService,
    pub turns: TurnService,
    pub holidays: HolidayService,
    pub notices: NoticeService,
    pub admin_users: AdminUserService,
    pub accounts: AccountService,
    pub maintenance: MaintenanceService,
}

impl Fixture {
    /// Everything wired with default policy, clock pinned at `now`.
    pub fn at(now: DateTime<Utc>) -> Self {
        let stores = Stores::from_memory(Arc::new(MemoryStore::new()));
        let clock = Arc::new(FixedClock::new(now));
        let dyn_clock: Arc<dyn Clock> = clock.clone();
        let notifier = Arc::new(RecordingNotifier::new());
        let dyn_notifier: Arc<dyn Notifier> = notifier.clone();
        let booking_config = BookingConfig::default();
        let auth_config = AuthConfig::default();

        let booking = BookingService::new(
            stores.users.clone(),
            stores.schedule.clone(),
            dyn_clock.clone(),
            booking_config.clone(),
        )
        .unwrap();
        let turns = TurnService::new(
            booking.clone(),
            stores.schedule.clone(),
            stores.holidays.clone(),
        );
        let maintenance = MaintenanceService::new(
            stores.users.clone(),
            stores.schedule.clone(),
            turns.clone(),
            dyn_notifier.clone(),
            dyn_clock.clone(),
            *booking.policy(),
        );
        let accounts = AccountService::new(
            stores.users.clone(),
            Arc::new(JwtEncoder::new(&auth_config)),
            Arc::new(JwtDecoder::new(&auth_config)),
            dyn_notifier,
            dyn_clock.clone(),
            &auth_config,
            booking_config.clone(),
        );

        Self {
            admin_booking: AdminBookingService::new(booking.clone()),
            holidays: HolidayService::new(stores.holidays.clone(), dyn_clock.clone()),
            notices: NoticeService::new(stores.notices.clone(), dyn_clock.clone()),
            admin_users: AdminUserService::new(stores.users.clone(), dyn_clock, booking_config),
            stores,
            clock,
            notifier,
            booking,
            turns,
            accounts,
            maintenance,
        }
    }

    /// Monday 2025-03-03, noon studio time.
    pub fn monday() -> Self {
        Self::at(utc(3, 3, 15))
    }

    pub async fn member(&self, email: &str, weekly_quota: i16, paid: bool) -> RequestContext {
        let user = self
            .stores
            .users
            .create(
                CreateUser {
                    name: email.split('@').next().unwrap_or("member").to_string(),
                    surname: "Tester".to_string(),
                    email: email.to_string(),
                    phone: "1155551234".to_string(),
                    weekly_quota,
                    password_hash: "unused".to_string(),
                    role: UserRole::User,
                },
                self.clock.now(),
            )
            .await
            .unwrap();
        let user = if paid {
            self.stores
                .users
                .set_paid(user.id, true, self.clock.now())
                .await
                .unwrap()
                .unwrap()
        } else {
            user
        };
        RequestContext::for_user(&user)
    }

    pub async fn admin(&self) -> RequestContext {
        let user = self
            .stores
            .users
            .create(
                CreateUser {
                    name: "Ada".to_string(),
                    surname: "Admin".to_string(),
                    email: "admin@studio.test".to_string(),
                    phone: "1100000000".to_string(),
                    weekly_quota: 1,
                    password_hash: "unused".to_string(),
                    role: UserRole::Admin,
                },
                self.clock.now(),
            )
            .await
            .unwrap();
        RequestContext::for_user(&user)
    }

    /// Give `count` fresh members a permanent schedule of just `slot`.
    pub async fn fill(&self, slot: &SlotSelection, count: usize) {
        for _ in 0..count {
            let email = format!("filler-{}@studio.test", uuid::Uuid::new_v4().simple());
            let ctx = self.member(&email, 1, true).await;
            self.booking
                .apply_selection(&ctx, vec![slot.clone()])
                .await
                .unwrap();
        }
    }
}
