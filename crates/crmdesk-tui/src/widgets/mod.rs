//! Reusable widgets shared across screens.

pub mod license_table;
