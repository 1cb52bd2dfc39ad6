//! Scheduler module for managing periodic tasks like certificate renewal and cleanup.

pub mod cleanup_scheduler;
pub mod renewal_scheduler;

pub use cleanup_scheduler::CleanupScheduler;
pub use renewal_scheduler::{AdvancedRenewalScheduler, RenewalScheduler};
