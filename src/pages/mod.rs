pub mod appearance;
pub mod home;
