//! In-memory port doubles shared by the use case tests

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::domain::{
    LocalId, LocalTask, MappingPatch, NewLocalTask, NewRemoteTask, RemoteItemId, RemoteList,
    RemoteListId, RemoteTask, RemoteTaskPatch, SyncedItem, TaskStatus,
};
use crate::ports::{ILocalItemSource, IMappingStore, IRemoteTaskService};

// ============================================================================
// Mapping store double
// ============================================================================

#[derive(Default)]
pub struct InMemoryMappingStore {
    items: Mutex<Vec<SyncedItem>>,
}

impl InMemoryMappingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    pub fn insert(&self, item: SyncedItem) {
        self.items.lock().unwrap().push(item);
    }
}

#[async_trait::async_trait]
impl IMappingStore for InMemoryMappingStore {
    async fn get(&self, local_id: &LocalId) -> anyhow::Result<Option<SyncedItem>> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.local_id() == local_id)
            .cloned())
    }

    async fn get_all(&self) -> anyhow::Result<Vec<SyncedItem>> {
        Ok(self.items.lock().unwrap().clone())
    }

    async fn put(&self, item: &SyncedItem) -> anyhow::Result<()> {
        let mut items = self.items.lock().unwrap();
        items.retain(|i| i.local_id() != item.local_id());
        items.push(item.clone());
        Ok(())
    }

    async fn patch(&self, local_id: &LocalId, patch: &MappingPatch) -> anyhow::Result<()> {
        let mut items = self.items.lock().unwrap();
        let item = items
            .iter_mut()
            .find(|i| i.local_id() == local_id)
            .ok_or_else(|| {
                anyhow::Error::from(crate::domain::DomainError::MappingNotFound(
                    local_id.to_string(),
                ))
            })?;
        if let Some(completed) = patch.completed {
            item.set_completed(completed);
        }
        if let (Some(item_id), Some(list_id)) =
            (patch.remote_item_id.clone(), patch.remote_list_id.clone())
        {
            item.set_remote(item_id, list_id);
        }
        if let Some(title) = &patch.title {
            item.set_title(title.clone());
        }
        item.touch();
        Ok(())
    }
}

// ============================================================================
// Remote task service double
// ============================================================================

#[derive(Default)]
pub struct InMemoryRemoteTasks {
    lists: Mutex<Vec<RemoteList>>,
    tasks: Mutex<Vec<RemoteTask>>,
    next_id: AtomicU32,
    pub insert_calls: AtomicU32,
    pub patch_calls: AtomicU32,
}

impl InMemoryRemoteTasks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_list(&self, id: &str, name: &str) -> RemoteListId {
        let list_id = RemoteListId::new(id.to_string()).unwrap();
        self.lists.lock().unwrap().push(RemoteList {
            id: list_id.clone(),
            name: name.to_string(),
        });
        list_id
    }

    pub fn add_task(&self, list_id: &RemoteListId, id: &str, title: &str, completed: bool) {
        self.tasks.lock().unwrap().push(RemoteTask {
            id: RemoteItemId::new(id.to_string()).unwrap(),
            list_id: list_id.clone(),
            title: title.to_string(),
            notes: None,
            due: None,
            status: TaskStatus::from_completed(completed),
            completed_at: completed.then(Utc::now),
            deleted: false,
        });
    }

    pub fn add_raw(&self, task: RemoteTask) {
        self.tasks.lock().unwrap().push(task);
    }

    pub fn remove_task(&self, item_id: &str) {
        self.tasks
            .lock()
            .unwrap()
            .retain(|t| t.id.as_str() != item_id);
    }

    pub fn task_count(&self) -> usize {
        self.tasks.lock().unwrap().len()
    }

    pub fn task(&self, item_id: &str) -> Option<RemoteTask> {
        self.tasks
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id.as_str() == item_id)
            .cloned()
    }

    pub fn list_count(&self) -> usize {
        self.lists.lock().unwrap().len()
    }

    fn mint_id(&self, prefix: &str) -> String {
        format!("{prefix}-{}", self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

#[async_trait::async_trait]
impl IRemoteTaskService for InMemoryRemoteTasks {
    async fn list_task_lists(&self) -> anyhow::Result<Vec<RemoteList>> {
        Ok(self.lists.lock().unwrap().clone())
    }

    async fn ensure_list(&self, name: &str) -> anyhow::Result<RemoteList> {
        let mut lists = self.lists.lock().unwrap();
        if let Some(list) = lists.iter().find(|l| l.name == name) {
            return Ok(list.clone());
        }
        let list = RemoteList {
            id: RemoteListId::new(self.mint_id("list")).unwrap(),
            name: name.to_string(),
        };
        lists.push(list.clone());
        Ok(list)
    }

    async fn list_tasks(
        &self,
        list_id: &RemoteListId,
        include_hidden: bool,
    ) -> anyhow::Result<Vec<RemoteTask>> {
        Ok(self
            .tasks
            .lock()
            .unwrap()
            .iter()
            .filter(|t| &t.list_id == list_id)
            .filter(|t| include_hidden || (!t.deleted && !t.is_completed()))
            .cloned()
            .collect())
    }

    async fn get_task(
        &self,
        list_id: &RemoteListId,
        item_id: &RemoteItemId,
    ) -> anyhow::Result<Option<RemoteTask>> {
        Ok(self
            .tasks
            .lock()
            .unwrap()
            .iter()
            .find(|t| &t.list_id == list_id && &t.id == item_id)
            .cloned())
    }

    async fn insert_task(
        &self,
        list_id: &RemoteListId,
        task: &NewRemoteTask,
    ) -> anyhow::Result<RemoteTask> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        let created = RemoteTask {
            id: RemoteItemId::new(self.mint_id("task")).unwrap(),
            list_id: list_id.clone(),
            title: task.title.clone(),
            notes: task.notes.clone(),
            due: task.due,
            status: task.status,
            completed_at: None,
            deleted: false,
        };
        self.tasks.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn patch_task(
        &self,
        list_id: &RemoteListId,
        item_id: &RemoteItemId,
        patch: &RemoteTaskPatch,
    ) -> anyhow::Result<RemoteTask> {
        self.patch_calls.fetch_add(1, Ordering::SeqCst);
        let mut tasks = self.tasks.lock().unwrap();
        let task = tasks
            .iter_mut()
            .find(|t| &t.list_id == list_id && &t.id == item_id)
            .ok_or_else(|| anyhow::anyhow!("remote task not found: {item_id}"))?;
        if let Some(title) = &patch.title {
            task.title = title.clone();
        }
        if let Some(notes) = &patch.notes {
            task.notes = Some(notes.clone());
        }
        if let Some(due) = patch.due {
            task.due = Some(due);
        }
        if let Some(status) = patch.status {
            task.status = status;
            task.completed_at = patch.completed_at;
        }
        Ok(task.clone())
    }

    async fn delete_task(
        &self,
        list_id: &RemoteListId,
        item_id: &RemoteItemId,
    ) -> anyhow::Result<()> {
        self.tasks
            .lock()
            .unwrap()
            .retain(|t| !(&t.list_id == list_id && &t.id == item_id));
        Ok(())
    }
}

// ============================================================================
// Local item source double
// ============================================================================

#[derive(Default)]
pub struct InMemoryLocalItems {
    items: Mutex<Vec<LocalTask>>,
    next_id: AtomicU32,
}

impl InMemoryLocalItems {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, id: &str, title: &str, list_name: Option<&str>, completed: bool) -> LocalId {
        let local_id = LocalId::new(id.to_string()).unwrap();
        self.items.lock().unwrap().push(LocalTask {
            id: local_id.clone(),
            title: title.to_string(),
            notes: None,
            due: None,
            list_name: list_name.map(|s| s.to_string()),
            completed,
            completed_at: completed.then(Utc::now),
        });
        local_id
    }

    pub fn remove(&self, local_id: &LocalId) {
        self.items.lock().unwrap().retain(|t| &t.id != local_id);
    }

    pub fn item(&self, local_id: &LocalId) -> Option<LocalTask> {
        self.items
            .lock()
            .unwrap()
            .iter()
            .find(|t| &t.id == local_id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl ILocalItemSource for InMemoryLocalItems {
    async fn incomplete_items(&self) -> anyhow::Result<Vec<LocalTask>> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|t| !t.completed)
            .cloned()
            .collect())
    }

    async fn get_item(&self, local_id: &LocalId) -> anyhow::Result<Option<LocalTask>> {
        Ok(self.item(local_id))
    }

    async fn create_item(&self, task: &NewLocalTask) -> anyhow::Result<LocalTask> {
        let id = LocalId::new(format!(
            "local-{}",
            self.next_id.fetch_add(1, Ordering::SeqCst)
        ))
        .unwrap();
        let created = LocalTask {
            id,
            title: task.title.clone(),
            notes: task.notes.clone(),
            due: task.due,
            list_name: task.list_name.clone(),
            completed: task.completed,
            completed_at: task.completed.then(Utc::now),
        };
        self.items.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn set_completion(
        &self,
        local_id: &LocalId,
        completed: bool,
        completed_at: Option<DateTime<Utc>>,
    ) -> anyhow::Result<()> {
        let mut items = self.items.lock().unwrap();
        let item = items
            .iter_mut()
            .find(|t| &t.id == local_id)
            .ok_or_else(|| anyhow::anyhow!("local item not found: {local_id}"))?;
        item.completed = completed;
        item.completed_at = if completed { completed_at } else { None };
        Ok(())
    }
}
