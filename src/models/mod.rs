//! Domain records and API bodies.

mod chat;
mod employee;
mod user;

pub use chat::{ChatMessage, ChatRequest, ChatResponse, QaRequest, QaResponse, ROLE_AI, ROLE_HUMAN};
pub use employee::{
    parse_date, DateField, DistinctColumn, Employee, EmployeeUpdate, FieldValue, SalaryInfo,
    DATE_FORMAT,
};
pub use user::{User, UserUpdate};
