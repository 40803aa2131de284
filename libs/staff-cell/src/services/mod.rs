pub mod advice;
pub mod compensation;
pub mod staff;
pub mod targets;

pub use compensation::calculate_salary_and_commission;
pub use staff::StaffService;
pub use targets::TargetStore;
