//! In-memory implementations of the ports, shared by unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use codipop_types::error::RepositoryError;
use codipop_types::fitting::{FittingResult, FittingResultId};
use codipop_types::garment::{GarmentCategory, GarmentRef};
use codipop_types::session::UserSession;
use tokio::sync::watch;

use crate::clock::Clock;
use crate::repository::fitting_result::FittingResultRepository;
use crate::repository::wardrobe::WardrobeRepository;
use crate::storage::blob_store::BlobStore;
use crate::storage::kv_store::KvStore;

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Clock pinned to a settable date (noon UTC of that date).
#[derive(Clone)]
pub struct ManualClock {
    today: Arc<Mutex<NaiveDate>>,
}

impl ManualClock {
    pub fn on(y: i32, m: u32, d: u32) -> Self {
        Self {
            today: Arc::new(Mutex::new(NaiveDate::from_ymd_opt(y, m, d).unwrap())),
        }
    }

    pub fn advance_days(&self, days: i64) {
        let mut today = self.today.lock().unwrap();
        *today += Duration::days(days);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let today = *self.today.lock().unwrap();
        Utc.from_utc_datetime(&today.and_hms_opt(12, 0, 0).unwrap())
    }

    fn today(&self) -> NaiveDate {
        *self.today.lock().unwrap()
    }
}

// ---------------------------------------------------------------------------
// Key-value store
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct InMemoryKvStore {
    values: Arc<Mutex<HashMap<String, String>>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    pub fn put_raw(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl KvStore for InMemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(RepositoryError::Connection);
        }
        Ok(self.raw(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), RepositoryError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::Connection);
        }
        self.put_raw(key, value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), RepositoryError> {
        self.values.lock().unwrap().remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Wardrobe
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct InMemoryWardrobe {
    items: Arc<Mutex<Vec<(String, GarmentRef)>>>,
    fail_deletes_for: Arc<Mutex<Vec<String>>>,
}

impl InMemoryWardrobe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a garment with a fixed id; later inserts are newer.
    pub fn insert(&self, session: &UserSession, id: &str, url: &str, category: Option<GarmentCategory>) {
        let mut items = self.items.lock().unwrap();
        let created_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
            + Duration::minutes(items.len() as i64);
        items.push((
            session.user_id.clone(),
            GarmentRef {
                id: id.to_string(),
                image_url: url.to_string(),
                category,
                created_at,
            },
        ));
    }

    pub fn remove(&self, id: &str) {
        self.items.lock().unwrap().retain(|(_, g)| g.id != id);
    }

    pub fn fail_delete_of(&self, id: &str) {
        self.fail_deletes_for.lock().unwrap().push(id.to_string());
    }
}

impl WardrobeRepository for InMemoryWardrobe {
    async fn add(
        &self,
        session: &UserSession,
        image_url: &str,
        category: Option<GarmentCategory>,
    ) -> Result<GarmentRef, RepositoryError> {
        let id = uuid::Uuid::now_v7().to_string();
        self.insert(session, &id, image_url, category);
        let items = self.items.lock().unwrap();
        Ok(items.last().map(|(_, g)| g.clone()).unwrap())
    }

    async fn list(&self, session: &UserSession) -> Result<Vec<GarmentRef>, RepositoryError> {
        let items = self.items.lock().unwrap();
        let mut list: Vec<GarmentRef> = items
            .iter()
            .filter(|(user, _)| *user == session.user_id)
            .map(|(_, g)| g.clone())
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }

    async fn get_many(
        &self,
        session: &UserSession,
        ids: &[String],
    ) -> Result<Vec<GarmentRef>, RepositoryError> {
        let items = self.items.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| {
                items
                    .iter()
                    .find(|(user, g)| *user == session.user_id && g.id == *id)
                    .map(|(_, g)| g.clone())
            })
            .collect())
    }

    async fn delete(&self, session: &UserSession, id: &str) -> Result<(), RepositoryError> {
        if self.fail_deletes_for.lock().unwrap().iter().any(|f| f == id) {
            return Err(RepositoryError::Connection);
        }
        let mut items = self.items.lock().unwrap();
        let before = items.len();
        items.retain(|(user, g)| !(*user == session.user_id && g.id == id));
        if items.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Fitting history
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct InMemoryHistory {
    items: Arc<Mutex<Vec<FittingResult>>>,
    sender: Arc<watch::Sender<Vec<FittingResult>>>,
    fail_appends: Arc<AtomicBool>,
    base: DateTime<Utc>,
}

impl Default for InMemoryHistory {
    fn default() -> Self {
        let (sender, _) = watch::channel(Vec::new());
        Self {
            items: Arc::new(Mutex::new(Vec::new())),
            sender: Arc::new(sender),
            fail_appends: Arc::new(AtomicBool::new(false)),
            base: Utc.with_ymd_and_hms(2024, 9, 1, 9, 0, 0).unwrap(),
        }
    }
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    pub fn seed(&self, result: FittingResult) {
        self.items.lock().unwrap().push(result);
        self.publish();
    }

    fn sorted(&self) -> Vec<FittingResult> {
        let mut list = self.items.lock().unwrap().clone();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        list
    }

    fn publish(&self) {
        let list = self.sorted();
        self.sender.send_replace(list);
    }
}

impl FittingResultRepository for InMemoryHistory {
    async fn append(
        &self,
        _session: &UserSession,
        image_url: &str,
    ) -> Result<FittingResult, RepositoryError> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(RepositoryError::Connection);
        }
        let result = {
            let mut items = self.items.lock().unwrap();
            let result = FittingResult {
                id: FittingResultId::new(),
                image_url: image_url.to_string(),
                created_at: self.base + Duration::minutes(items.len() as i64),
                is_liked: false,
            };
            items.push(result.clone());
            result
        };
        self.publish();
        Ok(result)
    }

    async fn get(
        &self,
        _session: &UserSession,
        id: &FittingResultId,
    ) -> Result<Option<FittingResult>, RepositoryError> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == *id)
            .cloned())
    }

    async fn list(&self, _session: &UserSession) -> Result<Vec<FittingResult>, RepositoryError> {
        Ok(self.sorted())
    }

    async fn set_liked(
        &self,
        _session: &UserSession,
        id: &FittingResultId,
        liked: bool,
    ) -> Result<(), RepositoryError> {
        {
            let mut items = self.items.lock().unwrap();
            let item = items
                .iter_mut()
                .find(|r| r.id == *id)
                .ok_or(RepositoryError::NotFound)?;
            item.is_liked = liked;
        }
        self.publish();
        Ok(())
    }

    async fn delete(
        &self,
        _session: &UserSession,
        id: &FittingResultId,
    ) -> Result<(), RepositoryError> {
        {
            let mut items = self.items.lock().unwrap();
            let before = items.len();
            items.retain(|r| r.id != *id);
            if items.len() == before {
                return Err(RepositoryError::NotFound);
            }
        }
        self.publish();
        Ok(())
    }

    async fn subscribe(
        &self,
        _session: &UserSession,
    ) -> Result<watch::Receiver<Vec<FittingResult>>, RepositoryError> {
        Ok(self.sender.subscribe())
    }
}

// ---------------------------------------------------------------------------
// Blob store
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct InMemoryBlobStore {
    uploads: Arc<Mutex<Vec<(String, usize)>>>,
    fail: Arc<AtomicBool>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uploads(&self) -> Vec<(String, usize)> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl BlobStore for InMemoryBlobStore {
    async fn upload(
        &self,
        session: &UserSession,
        filename: &str,
        data: &[u8],
    ) -> Result<String, RepositoryError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(RepositoryError::Connection);
        }
        let path = format!("{}/closet/{filename}", session.user_id);
        self.uploads.lock().unwrap().push((path.clone(), data.len()));
        Ok(format!("https://blobs.test/{path}"))
    }
}
