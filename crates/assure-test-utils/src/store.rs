use assure_model::{Context, Element, ElementId, ElementKey, ElementKind, Evidence, PropertyClaim, Strategy};
use assure_tree::{AuthToken, CaseStore, NewElement, StoreError};
use parking_lot::Mutex;
use std::collections::HashMap;

/// One recorded collaborator call
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    Create { kind: ElementKind, name: String },
    Update { key: ElementKey, patch: serde_json::Value },
    Delete { key: ElementKey },
}

#[derive(Debug, Default)]
struct State {
    next_id: u64,
    calls: Vec<StoreCall>,
    delete_failures: HashMap<ElementKey, Option<StoreError>>,
    update_failures: HashMap<ElementKey, Option<StoreError>>,
    create_failure: Option<Option<StoreError>>,
}

/// In-memory stand-in for the REST backend
///
/// Assigns ids from a counter, records every call, and fails on demand:
/// a failure registered without an error answers `false` (or no data for
/// creates), one with an error returns it.
#[derive(Debug)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Store assigning ids from 100
    pub fn new() -> Self {
        Self::starting_at(100)
    }

    /// Store assigning ids from `next_id`
    pub fn starting_at(next_id: u64) -> Self {
        Self {
            state: Mutex::new(State {
                next_id,
                ..State::default()
            }),
        }
    }

    /// Answer `false` to deletes of `key`
    pub fn reject_delete(&self, key: ElementKey) -> &Self {
        self.state.lock().delete_failures.insert(key, None);
        self
    }

    /// Fail deletes of `key` with `error`
    pub fn fail_delete(&self, key: ElementKey, error: StoreError) -> &Self {
        self.state.lock().delete_failures.insert(key, Some(error));
        self
    }

    /// Answer `false` to updates of `key`
    pub fn reject_update(&self, key: ElementKey) -> &Self {
        self.state.lock().update_failures.insert(key, None);
        self
    }

    /// Fail updates of `key` with `error`
    pub fn fail_update(&self, key: ElementKey, error: StoreError) -> &Self {
        self.state.lock().update_failures.insert(key, Some(error));
        self
    }

    /// Answer creates with no data
    pub fn return_no_data(&self) -> &Self {
        self.state.lock().create_failure = Some(None);
        self
    }

    /// Fail creates with `error`
    pub fn fail_creates(&self, error: StoreError) -> &Self {
        self.state.lock().create_failure = Some(Some(error));
        self
    }

    /// Every call so far, in order
    pub fn calls(&self) -> Vec<StoreCall> {
        self.state.lock().calls.clone()
    }

    /// Keys whose delete was attempted, in call order
    pub fn delete_attempts(&self) -> Vec<ElementKey> {
        self.state
            .lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                StoreCall::Delete { key } => Some(*key),
                _ => None,
            })
            .collect()
    }
}

fn build_element(id: u64, payload: &NewElement) -> Option<Element> {
    let element = match payload.kind {
        ElementKind::Goal => return None,
        ElementKind::Context => {
            let mut context = Context::new(id, "");
            context.info = payload.info.clone();
            Element::Context(context)
        }
        ElementKind::Strategy => {
            let mut strategy = Strategy::new(id, "");
            strategy.info = payload.info.clone();
            Element::Strategy(strategy)
        }
        ElementKind::PropertyClaim => {
            let mut claim = PropertyClaim::new(id, "");
            claim.info = payload.info.clone();
            Element::PropertyClaim(claim)
        }
        ElementKind::Evidence => {
            let mut evidence = Evidence::new(id, "");
            evidence.info = payload.info.clone();
            evidence.url.clone_from(&payload.url);
            Element::Evidence(evidence)
        }
    };
    Some(element)
}

#[async_trait::async_trait]
impl CaseStore for MemoryStore {
    async fn create(
        &self,
        kind: ElementKind,
        payload: &NewElement,
        _token: &AuthToken,
    ) -> Result<Option<Element>, StoreError> {
        let mut state = self.state.lock();
        state.calls.push(StoreCall::Create {
            kind,
            name: payload.info.name.clone(),
        });
        match state.create_failure.clone() {
            Some(Some(error)) => return Err(error),
            Some(None) => return Ok(None),
            None => {}
        }
        let id = state.next_id;
        state.next_id += 1;
        Ok(build_element(id, payload))
    }

    async fn update(
        &self,
        kind: ElementKind,
        id: ElementId,
        _token: &AuthToken,
        patch: &serde_json::Value,
    ) -> Result<bool, StoreError> {
        let key = ElementKey::new(kind, id);
        let mut state = self.state.lock();
        state.calls.push(StoreCall::Update {
            key,
            patch: patch.clone(),
        });
        match state.update_failures.get(&key) {
            Some(Some(error)) => Err(error.clone()),
            Some(None) => Ok(false),
            None => Ok(true),
        }
    }

    async fn delete(
        &self,
        kind: ElementKind,
        id: ElementId,
        _token: &AuthToken,
    ) -> Result<bool, StoreError> {
        let key = ElementKey::new(kind, id);
        let mut state = self.state.lock();
        state.calls.push(StoreCall::Delete { key });
        match state.delete_failures.get(&key) {
            Some(Some(error)) => Err(error.clone()),
            Some(None) => Ok(false),
            None => Ok(true),
        }
    }
}
