use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{OBJECT_TYPE_FILE, OBJECT_TYPE_VECTOR_STORE, OBJECT_TYPE_VECTOR_STORE_FILE};

/// Deletion acknowledgement (`file.deleted`, `vector_store.deleted`,
/// `vector_store.file.deleted`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deleted {
    pub id: Uuid,
    pub object: String,
    pub deleted: bool,
}

impl Deleted {
    pub fn file(id: Uuid, deleted: bool) -> Self {
        Self {
            id,
            object: format!("{}.deleted", OBJECT_TYPE_FILE),
            deleted,
        }
    }

    pub fn vector_store(id: Uuid, deleted: bool) -> Self {
        Self {
            id,
            object: format!("{}.deleted", OBJECT_TYPE_VECTOR_STORE),
            deleted,
        }
    }

    pub fn vector_store_file(id: Uuid, deleted: bool) -> Self {
        Self {
            id,
            object: format!("{}.deleted", OBJECT_TYPE_VECTOR_STORE_FILE),
            deleted,
        }
    }
}

/// List envelope (`{object: "list", data: [...]}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListEnvelope<T> {
    pub object: String,
    pub data: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_id: Option<Uuid>,
    pub has_more: bool,
}

impl<T> ListEnvelope<T> {
    pub fn new(data: Vec<T>, has_more: bool) -> Self {
        Self {
            object: "list".to_string(),
            data,
            first_id: None,
            last_id: None,
            has_more,
        }
    }

    /// Set `first_id`/`last_id` from the items, given an id accessor.
    pub fn with_ids(mut self, id_of: impl Fn(&T) -> Uuid) -> Self {
        self.first_id = self.data.first().map(&id_of);
        self.last_id = self.data.last().map(&id_of);
        self
    }
}
