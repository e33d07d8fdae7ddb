//! EMR integration: domain types, mock dataset, business operations, and
//! the dashboard sync adapter.

pub mod mock;
pub mod service;
pub mod supabase;
pub mod types;
