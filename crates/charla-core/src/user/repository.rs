//! UserRepository trait definition.
//!
//! Registration and login are simple CRUD against the users table; the only
//! expected failure modes (duplicate username/email, wrong password) are
//! normal business outcomes and come back as `bool`/`Option`, never as
//! errors. Genuine storage faults still propagate as `StoreError`.

use charla_types::error::StoreError;
use charla_types::user::User;

/// Repository trait for user account persistence.
pub trait UserRepository: Send + Sync {
    /// Register a new user. Returns `false` on a uniqueness violation of
    /// email or username; `Err` only for unexpected storage faults.
    fn create_user(
        &self,
        email: &str,
        password: &str,
        name: &str,
        username: &str,
    ) -> impl std::future::Future<Output = Result<bool, StoreError>> + Send;

    /// Look up a user by username and verify the password against the
    /// stored hash. `None` for unknown username or wrong password.
    fn find_user_by_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> impl std::future::Future<Output = Result<Option<User>, StoreError>> + Send;

    /// Fetch a user by id.
    fn get_user(
        &self,
        user_id: i64,
    ) -> impl std::future::Future<Output = Result<Option<User>, StoreError>> + Send;
}
