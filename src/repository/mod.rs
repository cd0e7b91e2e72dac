//! Parameterized data access over the connection pool.
//!
//! Each call acquires one pooled connection for its own duration.

mod employee;
mod user;

pub use employee::{EmployeeRepository, DEFAULT_DISTINCT_LIMIT};
pub use user::UserRepository;

#[cfg(test)]
pub(crate) use employee::tests::sample_employee;
