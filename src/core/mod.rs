//! Core business logic - framework-agnostic services for profiles, budgets,
//! expenses, premium upgrades and insights.
//!
//! Every function takes the caller's identity explicitly; nothing here knows
//! about Discord.

/// Budget upsert, period bounds and spending summaries
pub mod budget;
/// Expense ledger and chart aggregations
pub mod expense;
/// Deterministic and generative spending insights
pub mod insight;
/// Chat completions client used as the generative insight source
pub mod llm;
/// Premium upgrade request workflow
pub mod premium;
/// Profiles, identity checks and capability gates
pub mod profile;
/// Payment proof artifact storage
pub mod upload;
