pub mod booking;
pub mod clock;
pub mod validator;

pub use booking::AppointmentService;
pub use clock::{Clock, FixedClock, SystemClock};
pub use validator::{check_appointment_date, AppointmentValidator};
