pub mod error;
pub mod memory;
pub mod state;
pub mod store;
pub mod supabase;
pub mod supabase_store;

pub use error::StoreError;
pub use memory::InMemoryStore;
pub use state::AppState;
pub use store::{
    AppointmentFilter, AppointmentQuery, AppointmentRepository, DoctorRepository,
    PatientRepository, RecordStore, StoreResult,
};
pub use supabase_store::SupabaseStore;
