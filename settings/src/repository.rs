use async_trait::async_trait;

use crate::error::SettingsError;
use crate::model::UserSettingsRow;
use crate::reconcile::FieldWrite;

/// Persistence seam for per-user settings. The relational schema behind it
/// is owned by the host application; the pipeline only decides what to
/// write.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// The row does not pre-exist for a user until their first write.
    async fn read(&self, user_id: i64) -> Result<Option<UserSettingsRow>, SettingsError>;

    /// Apply a reconcile result, creating the row when necessary.
    async fn write(&self, user_id: i64, writes: &[FieldWrite]) -> Result<(), SettingsError>;
}
