pub mod attendance;
pub mod employee;
pub mod exemption;
pub mod holiday;
pub mod role;
pub mod schedule;
