//! In-memory gateway that records every call
//!
//! [`InMemoryBackend`] implements both [`DocumentCollection`] and [`BlobContainer`]
//! over one call log, so tests can assert on the exact sequence of backend calls.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use catalog_storage::vehicle::{image_blob_name, ImageLink, Vehicle, VehicleFields};

use super::{BlobContainer, DocumentCollection, GatewayError, GatewayResult};
use crate::catalog::PendingImage;

/// A call received by the in-memory backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    /// `DocumentCollection::list_ordered_by_name`
    ListDocuments,
    /// `DocumentCollection::insert`
    InsertDocument(VehicleFields),
    /// `DocumentCollection::update`
    UpdateDocument {
        /// Document ID
        id: String,
        /// Fields written
        fields: VehicleFields,
        /// Image link written, if any
        image: Option<ImageLink>,
    },
    /// `DocumentCollection::delete`
    DeleteDocument(String),
    /// `BlobContainer::upload`
    UploadBlob(String),
    /// `BlobContainer::resolve_url`
    ResolveUrl(String),
    /// `BlobContainer::delete`
    DeleteBlob(String),
}

/// Operations that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Listing documents
    ListDocuments,
    /// Inserting a document
    InsertDocument,
    /// Updating a document
    UpdateDocument,
    /// Deleting a document
    DeleteDocument,
    /// Uploading a blob
    UploadBlob,
    /// Resolving a blob URL
    ResolveUrl,
    /// Deleting a blob
    DeleteBlob,
}

#[derive(Default)]
struct Inner {
    documents: Vec<Vehicle>,
    blobs: BTreeMap<String, PendingImage>,
    calls: Vec<GatewayCall>,
    failing: HashSet<Operation>,
    next_id: u64,
}

/// Document collection and blob container held in memory
#[derive(Default)]
pub struct InMemoryBackend {
    inner: Mutex<Inner>,
}

impl InMemoryBackend {
    /// Creates an empty backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Records `call` and fails if `operation` was made to fail
    fn record(&self, operation: Operation, call: GatewayCall) -> GatewayResult<MutexGuard<'_, Inner>> {
        let mut inner = self.lock();
        inner.calls.push(call);
        if inner.failing.contains(&operation) {
            return Err(GatewayError::Unavailable(format!(
                "injected {operation:?} failure"
            )));
        }
        Ok(inner)
    }

    /// Makes every later call of `operation` fail
    pub fn fail(&self, operation: Operation) {
        self.lock().failing.insert(operation);
    }

    /// Lets `operation` succeed again
    pub fn recover(&self, operation: Operation) {
        self.lock().failing.remove(&operation);
    }

    /// Calls received so far, oldest first
    #[must_use]
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.lock().calls.clone()
    }

    /// Forgets the calls received so far
    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Stores a document directly, with its image blob when `with_image` is set
    ///
    /// Returns the assigned ID. No call is recorded.
    pub fn seed(&self, fields: VehicleFields, with_image: bool) -> String {
        let mut inner = self.lock();
        let id = next_id(&mut inner);
        let mut vehicle = Vehicle::new(id.clone(), fields);
        if with_image {
            let blob_name = image_blob_name(&id);
            vehicle.image_url = Some(blob_url(&blob_name));
            vehicle.image = Some(blob_name.clone());
            inner.blobs.insert(
                blob_name.clone(),
                PendingImage::new(blob_name, None, vec![0xFF, 0xD8]),
            );
        }
        inner.documents.push(vehicle);
        id
    }

    /// Stored documents in insertion order
    #[must_use]
    pub fn documents(&self) -> Vec<Vehicle> {
        self.lock().documents.clone()
    }

    /// Names of the stored blobs
    #[must_use]
    pub fn blob_names(&self) -> Vec<String> {
        self.lock().blobs.keys().cloned().collect()
    }
}

fn next_id(inner: &mut Inner) -> String {
    inner.next_id += 1;
    format!("vehicle-{}", inner.next_id)
}

fn blob_url(name: &str) -> String {
    format!("memory://images/{name}")
}

#[async_trait::async_trait]
impl DocumentCollection for InMemoryBackend {
    async fn list_ordered_by_name(&self) -> GatewayResult<Vec<Vehicle>> {
        let inner = self.record(Operation::ListDocuments, GatewayCall::ListDocuments)?;
        let mut documents = inner.documents.clone();
        documents.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(documents)
    }

    async fn insert(&self, fields: VehicleFields) -> GatewayResult<String> {
        let mut inner = self.record(
            Operation::InsertDocument,
            GatewayCall::InsertDocument(fields.clone()),
        )?;
        let id = next_id(&mut inner);
        inner.documents.push(Vehicle::new(id.clone(), fields));
        Ok(id)
    }

    async fn update(
        &self,
        id: &str,
        fields: &VehicleFields,
        image: Option<&ImageLink>,
    ) -> GatewayResult<()> {
        let mut inner = self.record(
            Operation::UpdateDocument,
            GatewayCall::UpdateDocument {
                id: id.to_string(),
                fields: fields.clone(),
                image: image.cloned(),
            },
        )?;
        let Some(document) = inner.documents.iter_mut().find(|d| d.id == id) else {
            return Err(GatewayError::NotFound(id.to_string()));
        };
        let mut updated = Vehicle::new(id.to_string(), fields.clone());
        updated.image_url = image.map(|link| link.url.clone()).or(document.image_url.take());
        updated.image = image.map(|link| link.blob_name.clone()).or(document.image.take());
        *document = updated;
        Ok(())
    }

    async fn delete(&self, id: &str) -> GatewayResult<()> {
        let mut inner = self.record(
            Operation::DeleteDocument,
            GatewayCall::DeleteDocument(id.to_string()),
        )?;
        inner.documents.retain(|d| d.id != id);
        Ok(())
    }
}

#[async_trait::async_trait]
impl BlobContainer for InMemoryBackend {
    async fn upload(&self, name: &str, image: &PendingImage) -> GatewayResult<()> {
        let mut inner = self.record(Operation::UploadBlob, GatewayCall::UploadBlob(name.to_string()))?;
        inner.blobs.insert(name.to_string(), image.clone());
        Ok(())
    }

    async fn resolve_url(&self, name: &str) -> GatewayResult<String> {
        let inner = self.record(Operation::ResolveUrl, GatewayCall::ResolveUrl(name.to_string()))?;
        if inner.blobs.contains_key(name) {
            Ok(blob_url(name))
        } else {
            Err(GatewayError::NotFound(name.to_string()))
        }
    }

    async fn delete(&self, name: &str) -> GatewayResult<()> {
        let mut inner = self.record(Operation::DeleteBlob, GatewayCall::DeleteBlob(name.to_string()))?;
        if inner.blobs.remove(name).is_none() {
            return Err(GatewayError::NotFound(name.to_string()));
        }
        Ok(())
    }
}
