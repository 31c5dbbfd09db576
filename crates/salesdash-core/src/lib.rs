//! Core sales processing and business logic

pub mod auth;
pub mod error;
pub mod form;
pub mod models;
pub mod repo;
pub mod reports;
pub mod roles;
pub mod store;
pub mod workflow;

pub use auth::AuthService;
pub use error::{CoreError, CoreResult, ErrorCode, ErrorDetails, ErrorSeverity};
pub use form::{FormLine, SaleForm};
pub use models::{
    Customer, CustomerSummary, DeletionLog, Employee, PriceHist, PricedProduct, Product, Role,
    Sale, SaleDetail, SaleLineView, SaleView, SessionUser, UserAccount, UserRole, UserWithRole,
};
pub use repo::{current_price, DraftLine, ReferenceData, SaleDraft, SalesRepository, UNKNOWN};
pub use reports::{MonthlySales, OverviewStats};
pub use store::{MemoryStore, SalesStore, StoreRef, TableData};
pub use workflow::{execute_delete, DeleteStage, DeleteWorkflow};
