use crate::domain::{error::StoreError, id::ShortId, models::UrlMapping};

/// Owner of the short id -> long url table.
///
/// Implementations must make `try_insert` atomic with respect to its presence
/// check: of any number of concurrent inserts for one id, exactly one returns `true`.
pub trait MappingStore: Send + Sync {
    /// Inserts the mapping only if `id` is absent. `Ok(false)` means the id is taken.
    fn try_insert(
        &self,
        id: &ShortId,
        long_url: &str,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    fn lookup(
        &self,
        id: &ShortId,
    ) -> impl Future<Output = Result<Option<UrlMapping>, StoreError>> + Send;

    fn exists(&self, id: &ShortId) -> impl Future<Output = Result<bool, StoreError>> + Send {
        async move { Ok(self.lookup(id).await?.is_some()) }
    }

    /// Readiness check.
    fn ping(&self) -> impl Future<Output = Result<(), StoreError>> + Send;
}
