//! History service: list, like, delete, group, and watch a user's results.

use codipop_types::error::{HistoryError, RepositoryError};
use codipop_types::fitting::{FittingResult, FittingResultId};
use codipop_types::history::{Granularity, HistoryGroup, HistoryView};
use codipop_types::session::UserSession;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::history::aggregator::{self, ExpansionState};
use crate::repository::fitting_result::FittingResultRepository;

/// Live feed of a user's history.
///
/// Yields the full list (newest first) each time it changes. Dropping the
/// handle, or calling [`HistorySubscription::unsubscribe`], releases it.
pub struct HistorySubscription {
    receiver: watch::Receiver<Vec<FittingResult>>,
}

impl HistorySubscription {
    /// Snapshot of the list as last published.
    pub fn current(&self) -> Vec<FittingResult> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change. Returns `None` once the repository is gone.
    pub async fn changed(&mut self) -> Option<Vec<FittingResult>> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    pub fn unsubscribe(self) {
        debug!("history subscription released");
    }
}

/// Per-user history operations on top of a [`FittingResultRepository`].
pub struct HistoryService<H: FittingResultRepository> {
    repo: H,
}

impl<H: FittingResultRepository> HistoryService<H> {
    pub fn new(repo: H) -> Self {
        Self { repo }
    }

    pub fn repo(&self) -> &H {
        &self.repo
    }

    /// Results in the given view, newest first.
    pub async fn list(
        &self,
        session: &UserSession,
        view: HistoryView,
    ) -> Result<Vec<FittingResult>, HistoryError> {
        let results = self.repo.list(session).await.map_err(storage_error)?;
        Ok(aggregator::filter_view(&results, view))
    }

    /// Flip the liked flag. Returns the new value.
    pub async fn toggle_like(
        &self,
        session: &UserSession,
        id: &FittingResultId,
    ) -> Result<bool, HistoryError> {
        let current = self
            .repo
            .get(session, id)
            .await
            .map_err(storage_error)?
            .ok_or(HistoryError::NotFound)?;

        let liked = !current.is_liked;
        self.repo
            .set_liked(session, id, liked)
            .await
            .map_err(not_found_or_storage)?;

        info!(result_id = %id, liked, "toggled like");
        Ok(liked)
    }

    pub async fn delete(
        &self,
        session: &UserSession,
        id: &FittingResultId,
    ) -> Result<(), HistoryError> {
        self.repo
            .delete(session, id)
            .await
            .map_err(not_found_or_storage)?;
        info!(result_id = %id, "deleted fitting result");
        Ok(())
    }

    /// Results in the given view, bucketed in local time.
    pub async fn grouped(
        &self,
        session: &UserSession,
        view: HistoryView,
        granularity: Granularity,
        expansion: &ExpansionState,
    ) -> Result<Vec<HistoryGroup>, HistoryError> {
        let results = self.list(session, view).await?;
        Ok(aggregator::group(&results, granularity, expansion))
    }

    pub async fn subscribe(
        &self,
        session: &UserSession,
    ) -> Result<HistorySubscription, HistoryError> {
        let receiver = self.repo.subscribe(session).await.map_err(storage_error)?;
        debug!(user = %session.user_id, "history subscription opened");
        Ok(HistorySubscription { receiver })
    }
}

fn storage_error(e: RepositoryError) -> HistoryError {
    HistoryError::StorageError(e.to_string())
}

fn not_found_or_storage(e: RepositoryError) -> HistoryError {
    match e {
        RepositoryError::NotFound => HistoryError::NotFound,
        other => storage_error(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::InMemoryHistory;

    fn session() -> UserSession {
        UserSession::new("u1")
    }

    async fn seeded(n: usize) -> (HistoryService<InMemoryHistory>, Vec<FittingResult>) {
        let repo = InMemoryHistory::new();
        let mut results = Vec::new();
        for i in 0..n {
            results.push(repo.append(&session(), &format!("https://x/{i}.png")).await.unwrap());
        }
        (HistoryService::new(repo), results)
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let (service, results) = seeded(3).await;
        let listed = service.list(&session(), HistoryView::All).await.unwrap();
        let ids: Vec<_> = listed.iter().map(|r| r.id.clone()).collect();
        assert_eq!(
            ids,
            vec![results[2].id.clone(), results[1].id.clone(), results[0].id.clone()]
        );
    }

    #[tokio::test]
    async fn test_toggle_like_flips_and_filters() {
        let (service, results) = seeded(2).await;

        assert!(service.toggle_like(&session(), &results[0].id).await.unwrap());
        let liked = service.list(&session(), HistoryView::Liked).await.unwrap();
        assert_eq!(liked.len(), 1);
        assert_eq!(liked[0].id, results[0].id);

        assert!(!service.toggle_like(&session(), &results[0].id).await.unwrap());
        assert!(service.list(&session(), HistoryView::Liked).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_toggle_like_missing_is_not_found() {
        let (service, _) = seeded(1).await;
        let err = service
            .toggle_like(&session(), &FittingResultId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, HistoryError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_removes_and_reports_missing() {
        let (service, results) = seeded(2).await;
        service.delete(&session(), &results[1].id).await.unwrap();
        assert_eq!(service.list(&session(), HistoryView::All).await.unwrap().len(), 1);

        let err = service.delete(&session(), &results[1].id).await.unwrap_err();
        assert!(matches!(err, HistoryError::NotFound));
    }

    #[tokio::test]
    async fn test_grouped_uses_view() {
        let (service, results) = seeded(3).await;
        service.toggle_like(&session(), &results[1].id).await.unwrap();

        let groups = service
            .grouped(&session(), HistoryView::Liked, Granularity::None, &ExpansionState::new())
            .await
            .unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].items.len(), 1);
        assert_eq!(groups[0].items[0].id, results[1].id);
    }

    #[tokio::test]
    async fn test_subscription_sees_every_change() {
        let (service, results) = seeded(1).await;
        let mut sub = service.subscribe(&session()).await.unwrap();
        assert_eq!(sub.current().len(), 1);

        service.repo().append(&session(), "https://x/new.png").await.unwrap();
        let update = sub.changed().await.unwrap();
        assert_eq!(update.len(), 2);
        assert_eq!(update[0].image_url, "https://x/new.png");

        service.toggle_like(&session(), &results[0].id).await.unwrap();
        let update = sub.changed().await.unwrap();
        assert!(update.iter().any(|r| r.id == results[0].id && r.is_liked));

        service.delete(&session(), &results[0].id).await.unwrap();
        let update = sub.changed().await.unwrap();
        assert_eq!(update.len(), 1);

        sub.unsubscribe();
    }
}
