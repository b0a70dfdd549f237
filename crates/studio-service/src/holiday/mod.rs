pub mod service;

pub use service::HolidayService;
