//! Repositories for the three record tables
//!
//! Each table is described by a [`Table`] and served by one [`RecordRepo`]:
//! - the validated schema name is formatted into statement text
//! - statements run on a caller-supplied connection, so the same insert works
//!   inside or outside a transaction
//! - writes use `RETURNING` so handlers answer with the stored row

pub mod contacts;
pub mod personal_data;
pub mod record;
pub mod salaries;

pub use contacts::{ContactInput, CONTACTS};
pub use personal_data::{mirror_fields, PersonalDataInput, PERSONAL_DATA};
pub use record::{key_text, Record, RecordRepo, Table};
pub use salaries::{SalaryInput, SALARIES};
