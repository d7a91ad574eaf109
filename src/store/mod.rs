//! Persistence handle shared by all request handlers.
//!
//! Each domain module declares the repository trait it needs (`UserRepo`,
//! `EventRepo`, `InvitationRepo`, `AttendanceRepo`) next to its Postgres
//! implementation. [`Store`] bundles them into the single object that lives in
//! [`crate::state::AppState`].

use axum::async_trait;

use crate::{
    attendance::repo::AttendanceRepo, auth::repo::UserRepo, error::AppResult,
    events::repo::EventRepo, invitations::repo::InvitationRepo,
};

#[cfg(test)]
pub mod memory;
mod postgres;

pub use postgres::PgStore;

#[async_trait]
pub trait Store: UserRepo + EventRepo + InvitationRepo + AttendanceRepo + Send + Sync {
    /// Round-trips to the backing database.
    async fn ping(&self) -> AppResult<()>;

    /// Releases pooled connections. Called once on shutdown.
    async fn close(&self);
}
