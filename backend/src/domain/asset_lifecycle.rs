//! Cleanup of remote assets when the rows that reference them change.
//!
//! Services call these hooks explicitly around their writes:
//! [`AssetLifecycle::on_replaced`] before committing a changed reference and
//! [`AssetLifecycle::on_destroyed`] after a delete committed. Store failures
//! are logged and swallowed; the database write always stands.

use std::sync::Arc;

use tracing::{Span, debug, warn};

use crate::domain::AssetId;
use crate::domain::ports::AssetStore;

/// Best-effort remote asset cleanup.
pub struct AssetLifecycle<S: ?Sized> {
    store: Arc<S>,
    span: Span,
}

impl<S: ?Sized> Clone for AssetLifecycle<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            span: self.span.clone(),
        }
    }
}

impl<S> AssetLifecycle<S>
where
    S: AssetStore + ?Sized,
{
    pub fn new(store: Arc<S>, span: Span) -> Self {
        Self { store, span }
    }

    /// The store the hooks delete from.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Delete assets whose rows were removed.
    pub async fn on_destroyed<I>(&self, assets: I)
    where
        I: IntoIterator<Item = AssetId> + Send,
        I::IntoIter: Send,
    {
        for asset in assets {
            self.delete_quietly(&asset, "destroyed").await;
        }
    }

    /// Delete `previous` when a row's reference moves away from it.
    ///
    /// Nothing happens when the reference is unchanged or there was no
    /// previous asset. Clearing a reference passes `next = None`.
    pub async fn on_replaced(&self, previous: Option<&AssetId>, next: Option<&AssetId>) {
        match previous {
            Some(previous) if Some(previous) != next => {
                self.delete_quietly(previous, "replaced").await;
            }
            _ => {}
        }
    }

    async fn delete_quietly(&self, asset: &AssetId, reason: &'static str) {
        match self.store.delete(asset).await {
            Ok(()) => debug!(parent: &self.span, %asset, reason, "deleted remote asset"),
            Err(error) => warn!(
                parent: &self.span,
                %asset,
                reason,
                %error,
                "remote asset cleanup failed; asset may be orphaned"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::{AssetStoreError, MockAssetStore};
    use mockall::predicate::eq;
    use rstest::rstest;

    fn asset(id: &str) -> AssetId {
        AssetId::new(id).expect("asset id")
    }

    fn lifecycle(store: MockAssetStore) -> AssetLifecycle<MockAssetStore> {
        AssetLifecycle::new(Arc::new(store), Span::none())
    }

    #[rstest]
    #[tokio::test]
    async fn destroyed_assets_are_each_deleted_once() {
        let mut store = MockAssetStore::new();
        store
            .expect_delete()
            .with(eq(asset("photos/a")))
            .times(1)
            .returning(|_| Ok(()));
        store
            .expect_delete()
            .with(eq(asset("photos/b")))
            .times(1)
            .returning(|_| Ok(()));

        lifecycle(store)
            .on_destroyed([asset("photos/a"), asset("photos/b")])
            .await;
    }

    #[rstest]
    #[tokio::test]
    async fn store_failures_are_swallowed() {
        let mut store = MockAssetStore::new();
        store
            .expect_delete()
            .times(2)
            .returning(|_| Err(AssetStoreError::unavailable("connection reset")));

        let hooks = lifecycle(store);
        hooks.on_destroyed([asset("photos/a")]).await;
        hooks
            .on_replaced(Some(&asset("avatars/old")), Some(&asset("avatars/new")))
            .await;
    }

    #[rstest]
    #[tokio::test]
    async fn replacement_deletes_previous_not_next() {
        let mut store = MockAssetStore::new();
        store
            .expect_delete()
            .with(eq(asset("project_covers/old")))
            .times(1)
            .returning(|_| Ok(()));

        lifecycle(store)
            .on_replaced(
                Some(&asset("project_covers/old")),
                Some(&asset("project_covers/new")),
            )
            .await;
    }

    #[rstest]
    #[case(None, Some("photos/new"))]
    #[case(Some("photos/same"), Some("photos/same"))]
    #[case(None, None)]
    #[tokio::test]
    async fn unchanged_or_new_references_delete_nothing(
        #[case] previous: Option<&str>,
        #[case] next: Option<&str>,
    ) {
        let mut store = MockAssetStore::new();
        store.expect_delete().never();

        let previous = previous.map(asset);
        let next = next.map(asset);
        lifecycle(store)
            .on_replaced(previous.as_ref(), next.as_ref())
            .await;
    }

    #[rstest]
    #[tokio::test]
    async fn clearing_a_reference_deletes_it() {
        let mut store = MockAssetStore::new();
        store
            .expect_delete()
            .with(eq(asset("avatars/me")))
            .times(1)
            .returning(|_| Ok(()));

        lifecycle(store)
            .on_replaced(Some(&asset("avatars/me")), None)
            .await;
    }
}
