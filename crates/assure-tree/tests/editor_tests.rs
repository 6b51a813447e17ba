use assure_model::{ClaimParent, Element, ElementId, ElementKey, ElementKind, Evidence, Strategy};
use assure_test_utils::{assert_partition, goal_with_orphans, sample_case, single_goal, MemoryStore, StoreCall};
use assure_tree::{
    AuthToken, CaseEditor, DeletePolicy, EditorError, ElementPatch, NewElement, StoreError,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn token() -> AuthToken {
    AuthToken::new("test-token")
}

#[tokio::test]
async fn scenario_a_claim_attached_under_strategy() {
    let snapshot = single_goal()
        .attach(Strategy::new(1, "S1").into(), ElementKey::goal(1))
        .unwrap();
    let orphans_before = snapshot.orphans().clone();
    let store = Arc::new(MemoryStore::starting_at(10));
    let mut editor = CaseEditor::new(Arc::clone(&store), token(), snapshot);

    let payload = NewElement::new(ElementKind::PropertyClaim, "P1").under(ElementKey::strategy(1));
    let created = editor.create_and_attach(payload).await.unwrap();
    assert_eq!(created.key(), ElementKey::claim(10));

    let case = editor.snapshot().case();
    let strategy = &case.goals[0].strategies[0];
    assert_eq!(strategy.property_claims.len(), 1);
    assert_eq!(strategy.property_claims[0].id, ElementId(10));
    assert_eq!(
        strategy.property_claims[0].parent,
        Some(ClaimParent::Strategy(ElementId(1)))
    );
    assert_eq!(editor.snapshot().orphans(), &orphans_before);
    assert_partition(editor.snapshot());
}

#[test]
fn scenario_b_evidence_not_offered_to_strategy() {
    let err = single_goal()
        .attach(Evidence::new(1, "E1").into(), ElementKey::goal(1))
        .unwrap_err();
    // evidence cannot hang off a goal structurally; build the orphan directly
    assert!(matches!(err, assure_tree::TreeError::InvalidParent { .. }));

    let (case, _) = single_goal().into_parts();
    let orphans = vec![Element::from(Evidence::new(1, "E1"))].into();
    let snapshot = assure_tree::CaseSnapshot::from_parts(case, orphans);

    assert!(snapshot.filter_orphans_for_node("strategy").is_empty());
    assert_eq!(snapshot.filter_orphans_for_node("property_claim").len(), 1);
    assert_eq!(snapshot.filter_orphans_for_node("goal").len(), 1);
}

#[tokio::test]
async fn scenario_d_bulk_delete_keeps_only_failure() {
    let store = Arc::new(MemoryStore::new());
    store.reject_delete(ElementKey::context(2));
    let mut editor = CaseEditor::new(Arc::clone(&store), token(), goal_with_orphans(&[1, 2, 3]));

    let outcome = editor.delete_all_orphans().await.unwrap();

    assert_eq!(outcome.deleted, vec![ElementKey::context(1), ElementKey::context(3)]);
    assert_eq!(outcome.failed_keys(), vec![ElementKey::context(2)]);
    assert!(!outcome.is_complete());
    let remaining: Vec<_> = editor.snapshot().orphans().keys().copied().collect();
    assert_eq!(remaining, vec![ElementKey::context(2)]);
    assert_eq!(store.delete_attempts().len(), 3);

    // retrying only touches what is left
    let retry = editor.delete_all_orphans().await.unwrap();
    assert_eq!(retry.failed_keys(), vec![ElementKey::context(2)]);
    assert_eq!(store.delete_attempts().len(), 4);
}

#[tokio::test]
async fn transport_errors_are_reported_per_orphan() {
    let store = Arc::new(MemoryStore::new());
    store.fail_delete(ElementKey::context(1), StoreError::Transport("connection reset".into()));
    let mut editor = CaseEditor::new(Arc::clone(&store), token(), goal_with_orphans(&[1, 2]));

    let outcome = editor.delete_all_orphans().await.unwrap();
    assert_eq!(outcome.failed.len(), 1);
    assert!(outcome.failed[0].error.is_retryable());
    assert_eq!(outcome.deleted, vec![ElementKey::context(2)]);
}

#[tokio::test]
async fn failed_delete_leaves_tree_untouched() {
    let store = Arc::new(MemoryStore::new());
    store.fail_delete(
        ElementKey::claim(1),
        StoreError::Remote {
            message: "Element is locked".into(),
        },
    );
    let before = sample_case();
    let mut editor = CaseEditor::new(Arc::clone(&store), token(), before.clone());

    let err = editor
        .delete(ElementKey::claim(1), DeletePolicy::Cascade)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "remote failure: Element is locked");
    assert_eq!(editor.snapshot(), &before);
}

#[tokio::test]
async fn delete_with_orphaned_children() {
    let store = Arc::new(MemoryStore::new());
    let mut editor = CaseEditor::new(Arc::clone(&store), token(), sample_case());

    editor
        .delete(ElementKey::strategy(1), DeletePolicy::OrphanChildren)
        .await
        .unwrap();
    assert!(editor.snapshot().is_orphan(&ElementKey::claim(1)));
    assert!(!editor.snapshot().is_attached(&ElementKey::strategy(1)));
    assert_partition(editor.snapshot());
    assert_eq!(
        store.calls(),
        vec![StoreCall::Delete {
            key: ElementKey::strategy(1)
        }]
    );
}

#[tokio::test]
async fn goal_delete_without_cascade_is_refused() {
    let store = Arc::new(MemoryStore::new());
    let mut editor = CaseEditor::new(Arc::clone(&store), token(), sample_case());

    let err = editor
        .delete(ElementKey::goal(1), DeletePolicy::OrphanChildren)
        .await
        .unwrap_err();
    assert!(matches!(err, EditorError::Tree(_)));
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn detach_and_reattach_round_trip() {
    let store = Arc::new(MemoryStore::new());
    let mut editor = CaseEditor::new(Arc::clone(&store), token(), sample_case());

    editor.detach(ElementKey::claim(1)).await.unwrap();
    assert!(editor.snapshot().is_orphan(&ElementKey::claim(1)));
    assert_partition(editor.snapshot());

    editor
        .attach_orphan(ElementKey::claim(1), ElementKey::goal(1))
        .await
        .unwrap();
    assert!(editor.snapshot().orphans().is_empty());
    assert_partition(editor.snapshot());

    let calls = store.calls();
    let StoreCall::Update { patch, .. } = &calls[1] else {
        panic!("expected update");
    };
    assert_eq!(patch["goal_id"], 1);
    assert!(patch["strategy_id"].is_null());
}

#[tokio::test]
async fn rejected_move_keeps_position() {
    let store = Arc::new(MemoryStore::new());
    store.reject_update(ElementKey::claim(2));
    let before = sample_case();
    let mut editor = CaseEditor::new(Arc::clone(&store), token(), before.clone());

    let err = editor
        .move_element(ElementKey::claim(2), ElementKey::claim(3))
        .await
        .unwrap_err();
    assert!(matches!(err, EditorError::Remote(StoreError::Rejected { .. })));
    assert_eq!(editor.snapshot(), &before);
}

#[tokio::test]
async fn move_persists_root_and_keeps_shared_evidence() {
    let store = Arc::new(MemoryStore::new());
    let mut editor = CaseEditor::new(Arc::clone(&store), token(), sample_case());

    editor
        .move_element(ElementKey::claim(1), ElementKey::goal(1))
        .await
        .unwrap();

    // only the moved root is persisted, so the shared links must survive locally
    assert_eq!(store.calls().len(), 1);
    let p2 = editor.snapshot().case().find_claim(ElementId(2)).unwrap();
    assert_eq!(p2.evidence.len(), 1);
    assert_eq!(p2.evidence[0].property_claim_id, vec![ElementId(2), ElementId(3)]);
    assert_partition(editor.snapshot());
}

#[tokio::test]
async fn update_renames_in_place() {
    let store = Arc::new(MemoryStore::new());
    let mut editor = CaseEditor::new(Arc::clone(&store), token(), sample_case());

    editor
        .update(ElementKey::evidence(1), &ElementPatch::rename("E-shared"))
        .await
        .unwrap();
    let name = editor
        .snapshot()
        .locate(&ElementKey::evidence(1))
        .map(|node| node.info().name.clone());
    assert_eq!(name.as_deref(), Some("E-shared"));

    // empty patches never reach the store
    editor
        .update(ElementKey::claim(1), &ElementPatch::default())
        .await
        .unwrap();
    assert_eq!(store.calls().len(), 1);
}
