pub mod clinic;
pub mod supabase;

pub use clinic::ClinicRepository;
pub use supabase::{SupabaseClient, SupabaseError};
