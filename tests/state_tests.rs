mod common;

use common::{png, pngs, Call, MockBackend, IDENTITY};
use photo_collector::protocol::Summary;
use photo_collector::state::{AppState, IdentityStore};
use photo_collector::upload::{Outcome, Recovery, SelectedFile};
use photo_collector::{Error, Settings};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn registered_state(backend: &Arc<MockBackend>, dir: &TempDir) -> AppState<Arc<MockBackend>> {
    let mut identity = IdentityStore::load(dir.path()).unwrap();
    identity.set(IDENTITY.to_string()).unwrap();
    AppState::new(backend.clone(), Settings::default(), identity)
}

fn names(files: &[SelectedFile]) -> Vec<String> {
    files.iter().map(|f| f.name().to_string()).collect()
}

#[tokio::test]
async fn closing_keeps_only_failed_files_in_order() {
    let dir = TempDir::new().unwrap();
    let backend = Arc::new(MockBackend::new().rejecting(&["img-001.png", "img-003.png"]));
    let state = registered_state(&backend, &dir);

    state.add_files(pngs(5)).await.unwrap();
    let session = state.send().await.unwrap();
    assert_eq!(session.failed_names(), ["img-001.png", "img-003.png"]);

    let recovery = state.close_dialog().await.unwrap();

    match recovery {
        Recovery::Retry(kept) => assert_eq!(names(&kept), ["img-001.png", "img-003.png"]),
        Recovery::AllSucceeded => panic!("expected failed files to be kept"),
    }
    assert_eq!(
        names(&state.selected_files().await),
        ["img-001.png", "img-003.png"]
    );
    assert_eq!(state.preview_urls().await.len(), 2);
    assert!(!state.session().dialog_visible);
    assert!(state.session().entries.is_empty());
}

#[tokio::test]
async fn full_success_empties_the_selection() {
    let dir = TempDir::new().unwrap();
    let backend = Arc::new(MockBackend::new());
    let state = registered_state(&backend, &dir);

    state.add_files(pngs(3)).await.unwrap();
    state.send().await.unwrap();

    assert!(matches!(state.close_dialog().await, Ok(Recovery::AllSucceeded)));
    assert!(state.selected_files().await.is_empty());
    assert!(state.preview_urls().await.is_empty());
}

#[tokio::test]
async fn retry_sends_only_what_failed() {
    let dir = TempDir::new().unwrap();
    let backend = Arc::new(MockBackend::new().rejecting(&["img-000.png", "img-004.png"]));
    let state = registered_state(&backend, &dir);

    state.add_files(pngs(6)).await.unwrap();
    state.send().await.unwrap();
    state.close_dialog().await.unwrap();

    backend.accept_all();
    let session = state.send().await.unwrap();

    let sizes: Vec<usize> = backend.registrations().iter().map(|(n, _)| *n).collect();
    assert_eq!(sizes, [6, 2]);
    assert!(session.entries.iter().all(|e| e.outcome == Outcome::Succeeded));
    assert!(matches!(state.close_dialog().await, Ok(Recovery::AllSucceeded)));
}

#[tokio::test]
async fn settled_progress_is_visible_once_send_returns() {
    let dir = TempDir::new().unwrap();
    let backend = Arc::new(MockBackend::new().rejecting(&["img-002.png"]));
    let state = registered_state(&backend, &dir);
    let rx = state.subscribe();

    state.add_files(pngs(4)).await.unwrap();
    let session = state.send().await.unwrap();

    let progress = session.progress();
    assert_eq!((progress.processed, progress.total, progress.failed), (4, 4, 1));
    assert_eq!(progress.percent, 100.0);
    assert_eq!(rx.borrow().progress(), progress);
}

#[tokio::test]
async fn close_without_a_session_is_refused() {
    let dir = TempDir::new().unwrap();
    let backend = Arc::new(MockBackend::new());
    let state = registered_state(&backend, &dir);

    assert!(matches!(state.close_dialog().await, Err(Error::NoSession)));
}

#[tokio::test]
async fn selection_is_frozen_while_a_send_is_in_flight() {
    let dir = TempDir::new().unwrap();
    let backend = Arc::new(MockBackend::new().hanging(&["img-002.png"]));
    let state = registered_state(&backend, &dir);
    state.add_files(pngs(3)).await.unwrap();

    let send = state.send();
    tokio::pin!(send);
    tokio::select! {
        _ = &mut send => panic!("send should not settle with a hung upload"),
        _ = tokio::time::sleep(Duration::from_millis(100)) => {}
    }

    assert!(matches!(state.close_dialog().await, Err(Error::SessionInProgress)));
    assert!(matches!(state.add_files(vec![png("late.png")]).await, Err(Error::SessionActive)));
    assert!(matches!(state.remove_file(0).await, Err(Error::SessionActive)));
    assert!(matches!(state.clear_files().await, Err(Error::SessionActive)));
    assert_eq!(state.selected_files().await.len(), 3);
    assert!(state.session().dialog_visible);
}

#[tokio::test]
async fn selection_is_frozen_until_the_dialog_closes() {
    let dir = TempDir::new().unwrap();
    let backend = Arc::new(MockBackend::new());
    let state = registered_state(&backend, &dir);

    state.add_files(pngs(2)).await.unwrap();
    state.send().await.unwrap();

    assert!(matches!(state.add_files(vec![png("late.png")]).await, Err(Error::SessionActive)));
    assert!(matches!(state.send().await, Err(Error::SessionActive)));

    state.close_dialog().await.unwrap();
    let outcome = state.add_files(vec![png("late.png")]).await.unwrap();
    assert_eq!(outcome.added, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn files_added_while_a_send_starts_are_never_lost() {
    let dir = TempDir::new().unwrap();
    let backend = Arc::new(MockBackend::new());
    let state = Arc::new(registered_state(&backend, &dir));
    state.add_files(pngs(2)).await.unwrap();

    let adder = {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            let mut accepted = vec!["img-000.png".to_string(), "img-001.png".to_string()];
            for i in 0.. {
                let name = format!("late-{i:03}.png");
                match state.add_files(vec![png(&name)]).await {
                    Ok(outcome) if outcome.added == 1 => accepted.push(name),
                    Ok(_) | Err(Error::SessionActive) => break,
                    Err(e) => panic!("unexpected error: {e}"),
                }
                tokio::task::yield_now().await;
            }
            accepted
        })
    };

    let session = state.send().await.unwrap();
    let accepted = adder.await.unwrap();

    // Every accepted file made it into the ledger
    let sent: HashSet<&str> = session.entries.iter().map(|e| e.filename.as_str()).collect();
    for name in &accepted {
        assert!(sent.contains(name.as_str()), "{name} was accepted but never sent");
    }
    assert_eq!(state.selected_files().await.len(), session.entries.len());
}

#[tokio::test]
async fn send_needs_identity_and_files() {
    let dir = TempDir::new().unwrap();
    let backend = Arc::new(MockBackend::new());

    let identity = IdentityStore::load(dir.path()).unwrap();
    let anonymous = AppState::new(backend.clone(), Settings::default(), identity);
    anonymous.add_files(pngs(1)).await.unwrap();
    assert!(matches!(anonymous.send().await, Err(Error::MissingIdentity)));

    let state = registered_state(&backend, &dir);
    assert!(matches!(state.send().await, Err(Error::EmptySelection)));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn selection_edits_pass_through() {
    let dir = TempDir::new().unwrap();
    let backend = Arc::new(MockBackend::new());
    let state = registered_state(&backend, &dir);

    let outcome = state
        .add_files(vec![png("a.png"), png("b.png"), png("a.png")])
        .await
        .unwrap();
    assert_eq!(outcome.added, 2);
    assert_eq!(outcome.duplicates, 1);

    let removed = state.remove_file(0).await.unwrap();
    assert_eq!(removed.map(|f| f.name().to_string()), Some("a.png".to_string()));
    assert!(state.remove_file(7).await.unwrap().is_none());
    assert_eq!(names(&state.selected_files().await), ["b.png"]);

    state.clear_files().await.unwrap();
    assert!(state.selected_files().await.is_empty());
}

#[tokio::test]
async fn register_user_persists_the_identity() {
    let dir = TempDir::new().unwrap();
    let backend = Arc::new(MockBackend::new());
    let identity = IdentityStore::load(dir.path()).unwrap();
    let state = AppState::new(backend.clone(), Settings::default(), identity);

    let user_id = state
        .register_user("20240117".to_string(), "kim".to_string())
        .await
        .unwrap();

    assert_eq!(user_id, "user-20240117");
    assert_eq!(state.identity().await.as_deref(), Some("user-20240117"));
    let reloaded = IdentityStore::load(dir.path()).unwrap();
    assert_eq!(reloaded.user_id(), Some("user-20240117"));
    assert!(matches!(backend.calls()[0], Call::CreateUser(_)));
}

#[tokio::test]
async fn summary_and_ranking_are_passed_through() {
    let dir = TempDir::new().unwrap();
    let backend = Arc::new(MockBackend::new());
    let state = registered_state(&backend, &dir);

    assert_eq!(state.summary().await.unwrap(), None);
    assert_eq!(backend.calls()[0], Call::Summary(IDENTITY.to_string()));

    let backend = Arc::new(MockBackend::new().with_summary(Summary {
        number_of_images: 40,
        number_of_users: 7,
        user_images: 3,
    }));
    let state = registered_state(&backend, &dir);
    let summary = state.summary().await.unwrap().unwrap();
    assert_eq!(summary.number_of_images, 40);

    let ranking = state.ranking().await.unwrap().unwrap();
    assert_eq!(ranking[0].identity, IDENTITY);
}
