//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod budget;
pub mod expense;
pub mod premium_request;
pub mod profile;

// Re-export specific types to avoid conflicts
pub use budget::{Column as BudgetColumn, Entity as Budget, Model as BudgetModel};
pub use expense::{Column as ExpenseColumn, Entity as Expense, Model as ExpenseModel};
pub use premium_request::{
    Column as PremiumRequestColumn, Entity as PremiumRequest, Model as PremiumRequestModel,
};
pub use profile::{Column as ProfileColumn, Entity as Profile, Model as ProfileModel};
