//! Async case editor
//!
//! [`CaseEditor`] owns the current [`CaseSnapshot`] and applies edits the
//! only safe way round: dry-run the tree operation, call the persistence
//! collaborator, and commit the new snapshot only once the call succeeded.
//! A failed call leaves the snapshot exactly as it was.

use crate::error::{EditorError, TreeError};
use crate::patch::{parent_patch, ElementPatch};
use crate::snapshot::{CaseSnapshot, DeletePolicy};
use crate::store::{AuthToken, CaseStore, NewElement, StoreError, StoreOp};
use assure_model::{compat, Element, ElementKey, ElementKind};
use futures::future::join_all;

/// One orphan that could not be deleted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub key: ElementKey,
    pub error: StoreError,
}

/// Result of a bulk orphan deletion
///
/// Partial failure is the normal case: some orphans go, others stay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Orphans confirmed deleted
    pub deleted: Vec<ElementKey>,
    /// Orphans still held, with the reason
    pub failed: Vec<BatchFailure>,
}

impl BatchOutcome {
    /// Keys of the orphans that remain
    #[must_use]
    pub fn failed_keys(&self) -> Vec<ElementKey> {
        self.failed.iter().map(|f| f.key).collect()
    }

    /// Check if every delete succeeded
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Editor pairing a snapshot with its persistence collaborator
pub struct CaseEditor<S> {
    store: S,
    token: AuthToken,
    snapshot: CaseSnapshot,
}

impl<S: CaseStore> CaseEditor<S> {
    /// Create an editor over `snapshot`
    pub fn new(store: S, token: AuthToken, snapshot: CaseSnapshot) -> Self {
        Self {
            store,
            token,
            snapshot,
        }
    }

    /// Current confirmed state
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> &CaseSnapshot {
        &self.snapshot
    }

    /// The persistence collaborator
    #[inline]
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Replace the state with a server-confirmed snapshot
    pub fn replace(&mut self, snapshot: CaseSnapshot) {
        self.snapshot = snapshot;
    }

    /// Give up the editor and keep the state
    #[must_use]
    pub fn into_snapshot(self) -> CaseSnapshot {
        self.snapshot
    }

    fn ensure_editable(&self) -> Result<(), EditorError> {
        let permissions = self.snapshot.case().permissions;
        if permissions.can_edit() {
            Ok(())
        } else {
            tracing::warn!("Refusing edit on case at {:?} permission", permissions);
            Err(EditorError::ReadOnly(permissions))
        }
    }

    /// Create an element through the store and attach it under its parent
    ///
    /// # Errors
    ///
    /// - [`EditorError::InvalidRequest`] for goals or payloads without a parent
    /// - [`EditorError::Tree`] if the parent is missing or incompatible
    /// - [`EditorError::Remote`] if the store fails, returns no data or
    ///   returns an element of another kind
    ///
    /// A created element that cannot be attached locally is logged with its
    /// remote key; it exists remotely but not in the snapshot.
    pub async fn create_and_attach(&mut self, payload: NewElement) -> Result<Element, EditorError> {
        self.ensure_editable()?;
        if payload.kind == ElementKind::Goal {
            return Err(EditorError::InvalidRequest(
                "goals are created with the case, not attached".into(),
            ));
        }
        let Some(parent) = payload.parent else {
            return Err(EditorError::InvalidRequest(format!(
                "new {} needs a parent",
                payload.kind
            )));
        };
        if !compat::can_attach(payload.kind, parent.kind) {
            return Err(TreeError::InvalidParent {
                child: payload.kind,
                parent: parent.kind,
            }
            .into());
        }
        if !self.snapshot.is_attached(&parent) {
            return Err(TreeError::NotFound { key: parent }.into());
        }

        let created = match self.store.create(payload.kind, &payload, &self.token).await {
            Ok(Some(element)) => element,
            Ok(None) => {
                tracing::warn!("Create of {} under {} returned no data", payload.kind, parent);
                return Err(StoreError::NoData.into());
            }
            Err(e) => {
                tracing::warn!("Create of {} under {} failed: {}", payload.kind, parent, e);
                return Err(e.into());
            }
        };

        if created.kind() != payload.kind {
            tracing::warn!(
                "Create under {} returned {} for a {}; remote element left unattached",
                parent,
                created.key(),
                payload.kind
            );
            return Err(StoreError::UnexpectedKind {
                expected: payload.kind,
                created: created.key(),
            }
            .into());
        }

        self.snapshot = match self.snapshot.attach(created.clone(), parent) {
            Ok(next) => next,
            Err(e) => {
                tracing::warn!(
                    "Created {} remotely but could not attach it under {}: {}",
                    created.key(),
                    parent,
                    e
                );
                return Err(e.into());
            }
        };
        tracing::info!("Created {} under {}", created.key(), parent);
        Ok(created)
    }

    /// Reattach an orphan under `target`
    ///
    /// # Errors
    ///
    /// [`EditorError::Tree`] if the orphan or target is unknown or
    /// incompatible, [`EditorError::Remote`] if the store refuses.
    pub async fn attach_orphan(&mut self, key: ElementKey, target: ElementKey) -> Result<(), EditorError> {
        self.ensure_editable()?;
        let Some(orphan) = self.snapshot.orphans().get(&key).cloned() else {
            let err = if self.snapshot.is_attached(&key) {
                TreeError::AlreadyAttached { key }
            } else {
                TreeError::NotFound { key }
            };
            return Err(err.into());
        };
        let next = self.snapshot.attach(orphan, target)?;
        self.persist_update(key, parent_patch(key.kind, Some(target))).await?;
        self.snapshot = next;
        tracing::info!("Reattached {} under {}", key, target);
        Ok(())
    }

    /// Detach an element (with its subtree) into the orphan set
    ///
    /// # Errors
    ///
    /// [`EditorError::Tree`] if the element cannot be detached,
    /// [`EditorError::Remote`] if the store refuses.
    pub async fn detach(&mut self, key: ElementKey) -> Result<(), EditorError> {
        self.ensure_editable()?;
        let next = self.snapshot.detach(key)?;
        self.persist_update(key, parent_patch(key.kind, None)).await?;
        self.snapshot = next;
        tracing::info!("Detached {}", key);
        Ok(())
    }

    /// Move an element under a new parent
    ///
    /// # Errors
    ///
    /// [`EditorError::Tree`] if the move is illegal,
    /// [`EditorError::Remote`] if the store refuses.
    pub async fn move_element(&mut self, key: ElementKey, target: ElementKey) -> Result<(), EditorError> {
        self.ensure_editable()?;
        let next = self.snapshot.move_element(key, target)?;
        self.persist_update(key, parent_patch(key.kind, Some(target))).await?;
        self.snapshot = next;
        tracing::info!("Moved {} under {}", key, target);
        Ok(())
    }

    /// Delete an element through the store, then drop it locally
    ///
    /// # Errors
    ///
    /// [`EditorError::Tree`] if the element cannot be removed under
    /// `policy`, [`EditorError::Remote`] if the delete is not confirmed.
    pub async fn delete(&mut self, key: ElementKey, policy: DeletePolicy) -> Result<(), EditorError> {
        self.ensure_editable()?;
        let next = self.snapshot.remove(key, policy)?;
        match self.store.delete(key.kind, key.id, &self.token).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!("Delete of {} rejected", key);
                return Err(StoreError::Rejected {
                    operation: StoreOp::Delete,
                    key,
                }
                .into());
            }
            Err(e) => {
                tracing::warn!("Delete of {} failed: {}", key, e);
                return Err(e.into());
            }
        }
        self.snapshot = next;
        tracing::info!("Deleted {} ({:?})", key, policy);
        Ok(())
    }

    /// Edit descriptive attributes
    ///
    /// An empty patch is accepted without contacting the store.
    ///
    /// # Errors
    ///
    /// [`EditorError::Tree`] if the patch does not apply,
    /// [`EditorError::Remote`] if the store refuses.
    pub async fn update(&mut self, key: ElementKey, patch: &ElementPatch) -> Result<(), EditorError> {
        self.ensure_editable()?;
        let next = self.snapshot.update_element(key, patch)?;
        if patch.is_empty() {
            return Ok(());
        }
        self.persist_update(key, patch.to_json()).await?;
        self.snapshot = next;
        tracing::info!("Updated {}", key);
        Ok(())
    }

    /// Delete every orphan independently
    ///
    /// Deletes run concurrently. The orphan set keeps exactly the orphans
    /// whose delete failed.
    ///
    /// # Errors
    ///
    /// Only [`EditorError::ReadOnly`]; per-orphan failures are reported in
    /// the returned [`BatchOutcome`].
    pub async fn delete_all_orphans(&mut self) -> Result<BatchOutcome, EditorError> {
        self.ensure_editable()?;
        let keys: Vec<ElementKey> = self.snapshot.orphans().keys().copied().collect();
        if keys.is_empty() {
            return Ok(BatchOutcome::default());
        }

        let store = &self.store;
        let token = &self.token;
        let results = join_all(keys.into_iter().map(|key| async move {
            (key, store.delete(key.kind, key.id, token).await)
        }))
        .await;

        let mut outcome = BatchOutcome::default();
        for (key, result) in results {
            match result {
                Ok(true) => outcome.deleted.push(key),
                Ok(false) => outcome.failed.push(BatchFailure {
                    key,
                    error: StoreError::Rejected {
                        operation: StoreOp::Delete,
                        key,
                    },
                }),
                Err(error) => outcome.failed.push(BatchFailure { key, error }),
            }
        }
        for failure in &outcome.failed {
            tracing::warn!("Orphan {} not deleted: {}", failure.key, failure.error);
        }

        self.snapshot = self.snapshot.retain_orphans(&outcome.failed_keys());
        tracing::info!(
            "Deleted {} orphans, {} remain",
            outcome.deleted.len(),
            outcome.failed.len()
        );
        Ok(outcome)
    }

    async fn persist_update(&self, key: ElementKey, patch: serde_json::Value) -> Result<(), EditorError> {
        match self.store.update(key.kind, key.id, &self.token, &patch).await {
            Ok(true) => Ok(()),
            Ok(false) => {
                tracing::warn!("Update of {} rejected", key);
                Err(StoreError::Rejected {
                    operation: StoreOp::Update,
                    key,
                }
                .into())
            }
            Err(e) => {
                tracing::warn!("Update of {} failed: {}", key, e);
                Err(e.into())
            }
        }
    }
}
