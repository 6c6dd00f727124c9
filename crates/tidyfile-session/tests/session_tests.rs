//! End-to-end session flows against the in-memory backend.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tidyfile_core::{
    AnalyzeSummary, BackendError, Classification, DirectoryListing, MemoryBackend, MoveOutcome,
    PathNode, SessionConfig,
};
use tidyfile_session::{
    DestinationChoice, NoticeLevel, Organizer, Phase, SessionError, WorkflowState,
};

fn classification(index: usize, name: &str, duplicate: bool) -> Classification {
    Classification {
        index,
        filename: name.to_string(),
        filepath: PathBuf::from("/data").join(name),
        suggested_folder: "Images".to_string(),
        suggested_name: None,
        confidence: 0.85,
        selected: true,
        is_duplicate: duplicate,
        duplicate_of: duplicate.then(|| PathBuf::from("/data/original.jpg")),
    }
}

fn summary_of(classifications: Vec<Classification>) -> AnalyzeSummary {
    let total_duplicates = classifications.iter().filter(|c| c.is_duplicate).count();
    AnalyzeSummary {
        total_files: classifications.len(),
        images: classifications.len(),
        documents: 0,
        other_files: 0,
        classifications,
        scan_time: 1.2,
        total_duplicates,
    }
}

fn listing_of(path: &str) -> DirectoryListing {
    DirectoryListing {
        path: PathBuf::from(path),
        entries: Vec::new(),
        total_files: 0,
        total_folders: 0,
    }
}

async fn browsing(backend: &Arc<MemoryBackend>, path: &str) -> Organizer {
    backend.insert_listing(listing_of(path));
    let mut org = Organizer::new(backend.clone(), SessionConfig::default());
    org.navigate(path).unwrap();
    org.run_until_settled().await;
    assert_eq!(org.state(), WorkflowState::Browsing);
    org
}

async fn reviewing(backend: &Arc<MemoryBackend>, entries: Vec<Classification>) -> Organizer {
    backend.insert_analysis("/data", summary_of(entries));
    let mut org = browsing(backend, "/data").await;
    org.analyze().unwrap();
    org.run_until_settled().await;
    assert_eq!(org.state(), WorkflowState::Reviewing);
    org
}

#[tokio::test]
async fn test_history_back_restores_previous_path() {
    let backend = Arc::new(MemoryBackend::new());
    backend.insert_listing(listing_of("/a"));
    backend.insert_listing(listing_of("/b"));
    let mut org = Organizer::new(backend.clone(), SessionConfig::default());

    org.navigate("/a").unwrap();
    org.run_until_settled().await;
    org.navigate("/b").unwrap();
    org.run_until_settled().await;
    org.go_back().unwrap();
    org.run_until_settled().await;

    assert_eq!(org.current_path(), Some(Path::new("/a")));
    assert_eq!(org.session().forward_target(), Some(Path::new("/b")));
    assert!(!org.session().can_go_back());
}

#[tokio::test]
async fn test_fresh_navigation_clears_forward_stack() {
    let backend = Arc::new(MemoryBackend::new());
    for p in ["/a", "/b", "/c"] {
        backend.insert_listing(listing_of(p));
    }
    let mut org = Organizer::new(backend.clone(), SessionConfig::default());

    org.navigate("/a").unwrap();
    org.run_until_settled().await;
    org.navigate("/b").unwrap();
    org.run_until_settled().await;
    org.go_back().unwrap();
    org.run_until_settled().await;
    org.navigate("/c").unwrap();
    org.run_until_settled().await;

    assert_eq!(org.current_path(), Some(Path::new("/c")));
    assert!(!org.session().can_go_forward());
    assert_eq!(org.session().back_target(), Some(Path::new("/a")));
}

#[tokio::test]
async fn test_back_on_empty_stack_is_a_noop() {
    let backend = Arc::new(MemoryBackend::new());
    let mut org = browsing(&backend, "/a").await;

    org.go_back().unwrap();
    org.run_until_settled().await;

    assert_eq!(org.current_path(), Some(Path::new("/a")));
    assert_eq!(backend.calls("list_directory"), 1);
}

#[tokio::test]
async fn test_tree_expand_fetches_once_across_cycles() {
    let backend = Arc::new(MemoryBackend::new());
    let docs = PathNode::new("docs", "/data/docs", true);
    backend.insert_folders("/data", vec![docs.clone()]);
    backend.insert_folders("/data/docs", vec![PathNode::new("old", "/data/docs/old", false)]);
    let mut org = Organizer::new(backend.clone(), SessionConfig::default());

    org.select_tree_root("/data");
    org.run_until_settled().await;
    assert_eq!(org.tree().roots().len(), 1);

    // Expand (fetch), collapse, expand again (cache).
    org.toggle_folder(&docs);
    org.run_until_settled().await;
    assert!(org.tree().is_expanded(Path::new("/data/docs")));
    org.toggle_folder(&docs);
    org.toggle_folder(&docs);
    org.run_until_settled().await;

    assert!(org.tree().is_expanded(Path::new("/data/docs")));
    assert_eq!(org.tree().children_of(Path::new("/data/docs")).unwrap().len(), 1);
    // One call for the root, one for the children, none for the re-expand.
    assert_eq!(backend.calls("list_folders"), 2);
}

#[tokio::test]
async fn test_failed_root_switch_keeps_previous_tree() {
    let backend = Arc::new(MemoryBackend::new());
    backend.insert_folders("/data", vec![PathNode::new("docs", "/data/docs", true)]);
    let mut org = Organizer::new(backend.clone(), SessionConfig::default());

    org.select_tree_root("/data");
    org.run_until_settled().await;

    backend.fail_next("list_folders", BackendError::not_found("/vanished"));
    org.select_tree_root("/vanished");
    org.run_until_settled().await;

    assert_eq!(org.tree().root_path(), Some(Path::new("/data")));
    assert_eq!(org.tree().roots().len(), 1);
    let notices = org.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
}

#[tokio::test]
async fn test_analyze_populates_review_and_deselects_duplicates() {
    let backend = Arc::new(MemoryBackend::new());
    let mut entries: Vec<Classification> =
        (0..10).map(|i| classification(i, &format!("f{i}.jpg"), false)).collect();
    entries[7].is_duplicate = true;
    entries[7].duplicate_of = Some(PathBuf::from("/data/f1.jpg"));

    let org = reviewing(&backend, entries).await;

    assert_eq!(org.review().len(), 10);
    assert_eq!(org.review().duplicate_count(), 1);
    assert_eq!(org.review().selected_count(), 9);
    let summary = org.summary().unwrap();
    assert_eq!(summary.total_files, 10);
    assert_eq!(summary.total_duplicates, 1);
    assert_eq!(org.progress(), Some((Phase::Analyze, 100)));
}

#[tokio::test]
async fn test_analyze_failure_returns_to_browsing() {
    let backend = Arc::new(MemoryBackend::new());
    backend.fail_next(
        "analyze_directory",
        BackendError::unavailable("engine exited with signal 9"),
    );
    let mut org = browsing(&backend, "/data").await;

    org.analyze().unwrap();
    assert_eq!(org.state(), WorkflowState::Analyzing);
    org.run_until_settled().await;

    assert_eq!(org.state(), WorkflowState::Browsing);
    assert!(org.review().is_empty());
    let notices = org.take_notices();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].message.contains("Analysis failed"));
}

#[tokio::test]
async fn test_analyze_is_gated_to_browsing() {
    let backend = Arc::new(MemoryBackend::new());
    let mut org = reviewing(&backend, vec![classification(0, "a.jpg", false)]).await;

    let err = org.analyze().unwrap_err();
    assert!(matches!(err, SessionError::InvalidTransition { .. }));
    assert_eq!(err.to_string(), "Cannot analyze in the Reviewing state");
    assert_eq!(backend.calls("analyze_directory"), 1);
}

#[tokio::test]
async fn test_navigation_is_rejected_while_analyzing() {
    let backend = Arc::new(MemoryBackend::new());
    backend.insert_analysis("/data", summary_of(vec![classification(0, "a.jpg", false)]));
    let mut org = browsing(&backend, "/data").await;

    org.analyze().unwrap();
    let err = org.navigate("/elsewhere").unwrap_err();
    assert!(matches!(err, SessionError::InvalidTransition { .. }));

    org.run_until_settled().await;
    assert_eq!(org.state(), WorkflowState::Reviewing);
}

#[tokio::test]
async fn test_select_all_flip_and_destination_pinning() {
    let backend = Arc::new(MemoryBackend::new());
    let entries = (0..3).map(|i| classification(i, &format!("f{i}.jpg"), false)).collect();
    let mut org = reviewing(&backend, entries).await;

    org.review_mut().toggle_selection(1).unwrap();
    assert_eq!(org.review().selected_count(), 2);
    org.review_mut().toggle_select_all();
    assert_eq!(org.review().selected_count(), 3);
    org.review_mut().toggle_select_all();
    assert_eq!(org.review().selected_count(), 0);

    org.review_mut()
        .set_destination(2, DestinationChoice::Category("Wallpapers".into()))
        .unwrap();
    assert_eq!(org.review().get(2).unwrap().confidence, 1.0);
    assert_eq!(org.review().get(0).unwrap().confidence, 0.85);
    assert_eq!(org.review().get(1).unwrap().confidence, 0.85);
}

#[tokio::test]
async fn test_move_with_zero_selected_is_rejected_without_backend_call() {
    let backend = Arc::new(MemoryBackend::new());
    let entries = (0..2).map(|i| classification(i, &format!("f{i}.jpg"), false)).collect();
    let mut org = reviewing(&backend, entries).await;

    org.review_mut().toggle_select_all();
    assert_eq!(org.review().selected_count(), 0);

    let err = org.move_selected(None, false).unwrap_err();
    assert!(matches!(err, SessionError::Validation { .. }));
    assert_eq!(org.state(), WorkflowState::Reviewing);
    assert_eq!(backend.calls("move_files"), 0);
}

#[tokio::test]
async fn test_move_success_reaches_complete_and_reset_returns_to_idle() {
    let backend = Arc::new(MemoryBackend::new());
    backend.set_move_outcome(MoveOutcome {
        successful: 2,
        failed: 0,
        skipped: 1,
    });
    let mut entries: Vec<Classification> =
        (0..3).map(|i| classification(i, &format!("f{i}.jpg"), false)).collect();
    entries[2].selected = false;
    let mut org = reviewing(&backend, entries).await;

    org.move_selected(None, true).unwrap();
    assert_eq!(org.state(), WorkflowState::Moving);
    org.run_until_settled().await;

    assert_eq!(org.state(), WorkflowState::Complete);
    assert_eq!(
        org.last_move(),
        Some(MoveOutcome {
            successful: 2,
            failed: 0,
            skipped: 1
        })
    );
    // Defaulted destination is the current directory; unselected entries
    // are not sent at all.
    let moves = backend.moves();
    assert_eq!(moves.len(), 1);
    assert_eq!(moves[0].0, PathBuf::from("/data"));
    assert_eq!(moves[0].1.len(), 2);
    assert!(moves[0].2);

    org.reset();
    assert_eq!(org.state(), WorkflowState::Idle);
    assert_eq!(org.current_path(), None);
    assert!(org.review().is_empty());
    assert_eq!(org.last_move(), None);
}

#[tokio::test]
async fn test_move_failure_returns_to_reviewing_with_selection() {
    let backend = Arc::new(MemoryBackend::new());
    backend.fail_next("move_files", BackendError::unavailable("destination unplugged"));
    let entries = (0..3).map(|i| classification(i, &format!("f{i}.jpg"), false)).collect();
    let mut org = reviewing(&backend, entries).await;

    org.move_selected(Some(PathBuf::from("/sorted")), false).unwrap();
    org.run_until_settled().await;

    assert_eq!(org.state(), WorkflowState::Reviewing);
    assert_eq!(org.review().selected_count(), 3);
    let notices = org.take_notices();
    assert!(notices.iter().any(|n| n.level == NoticeLevel::Error));
}

#[tokio::test]
async fn test_search_synthesizes_summary_and_enters_reviewing() {
    let backend = Arc::new(MemoryBackend::new());
    backend.set_search_results(vec![
        classification(0, "beach.jpg", false),
        classification(1, "sunset.jpg", false),
        classification(2, "dunes.jpg", false),
    ]);
    let mut org = browsing(&backend, "/data").await;

    org.search("vacation photos").unwrap();
    assert_eq!(org.state(), WorkflowState::Analyzing);
    assert!(matches!(org.progress(), Some((Phase::Search, _))));
    org.run_until_settled().await;

    assert_eq!(org.state(), WorkflowState::Reviewing);
    assert_eq!(org.review().len(), 3);
    let summary = org.summary().unwrap();
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.images, 3);
    assert_eq!(summary.documents, 0);
    assert_eq!(summary.total_duplicates, 0);
}

#[tokio::test]
async fn test_search_rejects_empty_query() {
    let backend = Arc::new(MemoryBackend::new());
    let mut org = browsing(&backend, "/data").await;

    let err = org.search("   ").unwrap_err();
    assert!(matches!(err, SessionError::Validation { .. }));
    assert_eq!(backend.calls("search_semantic"), 0);
    assert_eq!(org.state(), WorkflowState::Browsing);
}

#[tokio::test]
async fn test_discard_review_relists_current_directory() {
    let backend = Arc::new(MemoryBackend::new());
    let mut org = reviewing(&backend, vec![classification(0, "a.jpg", false)]).await;

    org.discard_review().unwrap();
    assert_eq!(org.state(), WorkflowState::Browsing);
    org.run_until_settled().await;

    assert!(org.review().is_empty());
    assert!(org.summary().is_none());
    assert_eq!(org.current_path(), Some(Path::new("/data")));
    // Initial navigation plus the discard refresh.
    assert_eq!(backend.calls("list_directory"), 2);
}

#[tokio::test]
async fn test_confirmed_rename_updates_entry() {
    let backend = Arc::new(MemoryBackend::new());
    let mut entry = classification(0, "IMG_4433.jpg", false);
    entry.suggested_name = Some("lighthouse.jpg".to_string());
    let mut org = reviewing(&backend, vec![entry]).await;

    org.confirm_rename(0).unwrap();
    org.run_until_settled().await;

    assert_eq!(
        backend.renames(),
        vec![(PathBuf::from("/data/IMG_4433.jpg"), "lighthouse.jpg".to_string())]
    );
    let renamed = org.review().get(0).unwrap();
    assert_eq!(renamed.filename, "lighthouse.jpg");
    assert_eq!(renamed.filepath, PathBuf::from("/data/lighthouse.jpg"));
    assert!(renamed.suggested_name.is_none());
    assert!(org.review().pending_rename().is_none());
}

#[tokio::test]
async fn test_failed_rename_leaves_entry_untouched() {
    let backend = Arc::new(MemoryBackend::new());
    backend.fail_next("rename_file", BackendError::unavailable("target exists"));
    let mut entry = classification(0, "IMG_4433.jpg", false);
    entry.suggested_name = Some("lighthouse.jpg".to_string());
    let mut org = reviewing(&backend, vec![entry]).await;

    org.confirm_rename(0).unwrap();
    org.run_until_settled().await;

    let untouched = org.review().get(0).unwrap();
    assert_eq!(untouched.filename, "IMG_4433.jpg");
    assert_eq!(untouched.filepath, PathBuf::from("/data/IMG_4433.jpg"));
    assert_eq!(untouched.suggested_name.as_deref(), Some("lighthouse.jpg"));
    // The staged rename survives for a retry.
    assert!(org.review().pending_rename().is_some());
    let notices = org.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
}

#[tokio::test]
async fn test_delete_removes_entry_after_confirmation() {
    let backend = Arc::new(MemoryBackend::new());
    let entries = vec![
        classification(0, "a.jpg", false),
        classification(1, "a_copy.jpg", true),
    ];
    let mut org = reviewing(&backend, entries).await;

    org.delete_entry(1).unwrap();
    org.run_until_settled().await;

    assert_eq!(backend.deletes(), vec![PathBuf::from("/data/a_copy.jpg")]);
    assert_eq!(org.review().len(), 1);
    assert!(org.review().get(1).is_none());
    assert_eq!(org.review().get(0).unwrap().filename, "a.jpg");
}

#[tokio::test]
async fn test_reentrant_analyze_is_silently_ignored() {
    let backend = Arc::new(MemoryBackend::new());
    backend.insert_analysis("/data", summary_of(vec![classification(0, "a.jpg", false)]));
    let mut org = browsing(&backend, "/data").await;

    org.analyze().unwrap();
    // Second dispatch while the first is pending: no error, no extra call.
    org.analyze().unwrap();
    org.run_until_settled().await;

    assert_eq!(backend.calls("analyze_directory"), 1);
    assert_eq!(org.state(), WorkflowState::Reviewing);
}

#[tokio::test]
async fn test_latest_tree_root_request_wins() {
    let backend = Arc::new(MemoryBackend::new());
    backend.insert_folders("/first", vec![PathNode::new("one", "/first/one", false)]);
    backend.insert_folders("/second", vec![PathNode::new("two", "/second/two", false)]);
    let mut org = Organizer::new(backend.clone(), SessionConfig::default());

    // Both requests go out before either completes; only the second may
    // install its root.
    org.select_tree_root("/first");
    org.select_tree_root("/second");
    org.run_until_settled().await;

    assert_eq!(org.tree().root_path(), Some(Path::new("/second")));
    assert_eq!(org.tree().roots()[0].name.as_str(), "two");
}
