//! Route handlers organized by resource

pub mod common;
pub mod contacts;
pub mod health;
pub mod personal_data;
pub mod salaries;
