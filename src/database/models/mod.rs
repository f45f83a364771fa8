pub mod doctor;
pub mod mapping;
pub mod patient;
pub mod user;

pub use doctor::{Doctor, NewDoctor};
pub use mapping::{AssignedDoctor, MappingDetail, NewMapping};
pub use patient::{NewPatient, Patient};
pub use user::{NewUser, User};
