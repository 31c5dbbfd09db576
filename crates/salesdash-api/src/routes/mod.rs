//! Route modules for the API server
//!
//! All routes are organized into modules for better maintainability:
//! - auth: Account and session lifecycle
//! - sales: Sale list, detail, create, update, soft delete
//! - customers: Customer CRUD
//! - employees: Employee CRUD
//! - products: Product CRUD and price history
//! - analytics: Dashboard aggregates
//! - admin: User role management
//! - settings: Configuration display

pub mod admin;
pub mod analytics;
pub mod auth;
pub mod customers;
pub mod employees;
pub mod products;
pub mod sales;
pub mod settings;
