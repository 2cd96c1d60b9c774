// Reconciliation over the in-memory directories: rebuild outcomes,
// idempotence, the stateless cleanup pass, and its exclusion set.

mod util;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tmpc::{App, CONTAINER_MARK, generate_fingerprint, is_owned};
use tmpc_directory::{TabDirectory, TabId, WindowId};
use util::{seed_owned, setup};

#[tokio::test]
async fn rebuild_tracks_owned_containers_with_tabs() {
    let (dir, app) = setup();
    let owned = seed_owned(&dir).await;
    let foreign = dir.seed_container("Shopping");
    dir.seed_tab(&owned.id, WindowId(1), 0);
    dir.seed_tab(&foreign.id, WindowId(1), 1);

    app.rebuild().await.unwrap();

    let tracked = app.tracked();
    assert_eq!(tracked.len(), 1);
    assert_eq!(tracked[&owned.id].len(), 1);
    assert!(dir.contains_container(&foreign.id));
}

#[tokio::test]
async fn rebuild_destroys_owned_empty_containers() {
    let (dir, app) = setup();
    let empty = seed_owned(&dir).await;
    let occupied = seed_owned(&dir).await;
    dir.seed_tab(&occupied.id, WindowId(1), 0);

    app.rebuild().await.unwrap();

    assert!(!dir.contains_container(&empty.id));
    assert!(dir.contains_container(&occupied.id));
    assert!(app.is_tracking(&occupied.id));
    assert!(!app.is_tracking(&empty.id));
}

#[tokio::test]
async fn rebuild_adopts_marked_containers() {
    let (dir, app) = setup();
    let marked = dir.seed_container(CONTAINER_MARK);
    dir.seed_tab(&marked.id, WindowId(1), 0);

    app.rebuild().await.unwrap();

    let adopted = dir.container(&marked.id).unwrap();
    assert!(is_owned(&adopted.name, &adopted.id));
    assert!(app.is_tracking(&marked.id));
}

#[tokio::test]
async fn rebuild_twice_is_idempotent() {
    let (dir, app) = setup();
    let owned = seed_owned(&dir).await;
    dir.seed_tab(&owned.id, WindowId(1), 0);
    dir.seed_tab(&owned.id, WindowId(1), 1);
    dir.seed_container("Banking");

    app.rebuild().await.unwrap();
    let first = app.tracked();
    let containers_after_first = dir.container_count();

    app.rebuild().await.unwrap();
    assert_eq!(app.tracked(), first);
    assert_eq!(dir.container_count(), containers_after_first);
}

#[tokio::test]
async fn non_owned_containers_are_never_destroyed() {
    let (dir, app) = setup();
    let plain = dir.seed_container("Work");
    // Fingerprint-shaped name whose digest belongs to a different id.
    let stolen_name = generate_fingerprint(&plain.id);
    let forged = dir.seed_container(&stolen_name);

    app.rebuild().await.unwrap();
    app.remove_empty_temporary_containers(&HashSet::new())
        .await
        .unwrap();

    assert!(dir.contains_container(&plain.id));
    assert!(dir.contains_container(&forged.id));
    assert_eq!(dir.container_count(), 2);
    assert!(app.tracked().is_empty());
}

#[tokio::test]
async fn cleanup_pass_excludes_lagged_tabs() {
    let (dir, app) = setup();
    dir.set_tab_removal_lag(true);
    let owned = seed_owned(&dir).await;
    let tab = dir.seed_tab(&owned.id, WindowId(1), 0);

    // The tab is gone but the directory still reports it.
    dir.remove_tab(tab.id).await.unwrap();

    // Without the exclusion set the ghost tab keeps the container alive.
    app.remove_empty_temporary_containers(&HashSet::new())
        .await
        .unwrap();
    assert!(dir.contains_container(&owned.id));

    app.remove_empty_temporary_containers(&HashSet::from([tab.id]))
        .await
        .unwrap();
    assert!(!dir.contains_container(&owned.id));
}

#[tokio::test]
async fn cleanup_pass_ignores_unknown_excluded_ids() {
    let (dir, app) = setup();
    let owned = seed_owned(&dir).await;
    dir.seed_tab(&owned.id, WindowId(1), 0);

    app.remove_empty_temporary_containers(&HashSet::from([TabId(9999)]))
        .await
        .unwrap();
    assert!(dir.contains_container(&owned.id));
}

#[tokio::test]
async fn concurrent_rebuilds_tolerate_each_other() {
    // Two instances racing over one directory: the loser of the destroy
    // race hits not-found, which is the goal state, not an error.
    let dir = Arc::new(tmpc::MemoryDirectory::new());
    dir.set_query_delay(Duration::from_millis(5));
    let empty = seed_owned(&dir).await;

    let app_a = Arc::new(App::new(dir.clone(), dir.clone()));
    let app_b = Arc::new(App::new(dir.clone(), dir.clone()));

    let a = tokio::spawn({
        let app = app_a.clone();
        async move { app.rebuild().await }
    });
    let b = tokio::spawn({
        let app = app_b.clone();
        async move { app.rebuild().await }
    });

    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();
    assert!(!dir.contains_container(&empty.id));
}
