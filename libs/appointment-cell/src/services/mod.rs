pub mod booking;
pub mod scheduler;
pub mod slots;
pub mod snapshot;

pub use booking::BookingService;
pub use scheduler::SchedulerBoardService;
pub use snapshot::DaySnapshot;
