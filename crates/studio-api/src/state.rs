//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use studio_auth::{JwtDecoder, JwtEncoder};
use studio_core::config::AppConfig;
use studio_core::result::AppResult;
use studio_core::traits::Clock;
use studio_database::{DatabasePool, Stores, UserStore};
use studio_service::{
    AccountService, AdminBookingService, AdminUserService, BookingService, HolidayService,
    MaintenanceService, NoticeService, Notifier, TurnService,
};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// PostgreSQL pool, absent on the in-memory backend
    pub database: Option<DatabasePool>,
    /// User store, used to reload the caller on every request
    pub users: Arc<dyn UserStore>,

    // ── Auth ─────────────────────────────────────────────────
    /// JWT token decoder and validator
    pub jwt_decoder: Arc<JwtDecoder>,

    // ── Services ─────────────────────────────────────────────
    /// Registration, login, password reset
    pub accounts: Arc<AccountService>,
    /// Member schedule operations
    pub booking: Arc<BookingService>,
    /// Admin schedule overrides
    pub admin_booking: Arc<AdminBookingService>,
    /// Recoverable turns
    pub turns: Arc<TurnService>,
    /// Holiday registry
    pub holidays: Arc<HolidayService>,
    /// Informational notices
    pub notices: Arc<NoticeService>,
    /// Admin user management
    pub admin_users: Arc<AdminUserService>,
    /// Periodic resets
    pub maintenance: Arc<MaintenanceService>,
}

impl AppState {
    /// Wire every service over `stores`.
    pub fn build(
        config: AppConfig,
        stores: Stores,
        database: Option<DatabasePool>,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
    ) -> AppResult<Self> {
        let jwt_encoder = Arc::new(JwtEncoder::new(&config.auth));
        let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));

        let booking = BookingService::new(
            Arc::clone(&stores.users),
            Arc::clone(&stores.schedule),
            Arc::clone(&clock),
            config.booking.clone(),
        )?;
        let turns = TurnService::new(
            booking.clone(),
            Arc::clone(&stores.schedule),
            Arc::clone(&stores.holidays),
        );
        let maintenance = MaintenanceService::new(
            Arc::clone(&stores.users),
            Arc::clone(&stores.schedule),
            turns.clone(),
            Arc::clone(&notifier),
            Arc::clone(&clock),
            *booking.policy(),
        );
        let accounts = AccountService::new(
            Arc::clone(&stores.users),
            jwt_encoder,
            Arc::clone(&jwt_decoder),
            notifier,
            Arc::clone(&clock),
            &config.auth,
            config.booking.clone(),
        );
        let admin_users = AdminUserService::new(
            Arc::clone(&stores.users),
            Arc::clone(&clock),
            config.booking.clone(),
        );

        Ok(Self {
            database,
            users: Arc::clone(&stores.users),
            jwt_decoder,
            accounts: Arc::new(accounts),
            admin_booking: Arc::new(AdminBookingService::new(booking.clone())),
            booking: Arc::new(booking),
            turns: Arc::new(turns),
            holidays: Arc::new(HolidayService::new(
                Arc::clone(&stores.holidays),
                Arc::clone(&clock),
            )),
            notices: Arc::new(NoticeService::new(Arc::clone(&stores.notices), clock)),
            admin_users: Arc::new(admin_users),
            maintenance: Arc::new(maintenance),
            config: Arc::new(config),
        })
    }
}
