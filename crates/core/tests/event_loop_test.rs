// The full wiring: directory events flow through the single-consumer
// loop into the handlers, and the service converges without any direct
// handler calls from the test.

mod util;

use std::sync::Arc;

use tmpc::{CONTAINER_MARK, is_owned, run_event_loop};
use tmpc_directory::{ContainerDirectory, ContainerPatch, NewTab, TabDirectory};
use tokio::sync::mpsc;
use util::{setup, wait_until};

#[tokio::test]
async fn marked_container_lifecycle_via_events() {
    let (dir, app) = setup();
    let (tx, rx) = mpsc::unbounded_channel();
    dir.set_event_sink(tx);
    let _loop = tokio::spawn(run_event_loop(Arc::clone(&app), rx));

    // A user-created container carrying the mark, plus a tab in it.
    let marked = dir.seed_container(CONTAINER_MARK);
    let tab = dir
        .create_tab(NewTab {
            container_id: Some(marked.id.clone()),
            ..Default::default()
        })
        .await
        .unwrap();

    wait_until(|| app.is_tracking(&marked.id)).await;
    let adopted = dir.container(&marked.id).unwrap();
    assert!(is_owned(&adopted.name, &adopted.id));

    // Closing the only tab destroys the adopted container.
    dir.remove_tab(tab.id).await.unwrap();
    wait_until(|| !dir.contains_container(&marked.id)).await;
    assert!(!app.is_tracking(&marked.id));
}

#[tokio::test]
async fn rename_via_events_releases_the_container() {
    let (dir, app) = setup();
    let (tx, rx) = mpsc::unbounded_channel();
    dir.set_event_sink(tx);
    let _loop = tokio::spawn(run_event_loop(Arc::clone(&app), rx));

    let container = app.create_container(&[]).await.unwrap();
    let tab = dir
        .create_tab(NewTab {
            container_id: Some(container.id.clone()),
            ..Default::default()
        })
        .await
        .unwrap();
    wait_until(|| !app.tracked()[&container.id].is_empty()).await;

    dir.update_container(
        &container.id,
        ContainerPatch {
            name: Some("Pinned".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    wait_until(|| !app.is_tracking(&container.id)).await;

    dir.remove_tab(tab.id).await.unwrap();
    // Give the cleanup pass a chance to run; the container must survive.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(dir.contains_container(&container.id));
}

#[tokio::test]
async fn event_for_vanished_container_does_not_stop_the_loop() {
    let (dir, app) = setup();
    let (tx, rx) = mpsc::unbounded_channel();
    let loop_task = tokio::spawn(run_event_loop(Arc::clone(&app), rx));

    // An event for a tab whose container was never in the directory: the
    // handler comes up empty and the loop keeps going.
    let orphan = dir.seed_container(CONTAINER_MARK);
    let tab = dir
        .create_tab(NewTab {
            container_id: Some(orphan.id.clone()),
            ..Default::default()
        })
        .await
        .unwrap();
    dir.remove_container(&orphan.id).await.unwrap();
    tx.send(tmpc_directory::DirectoryEvent::TabCreated(tab))
        .unwrap();

    // A follow-up event still gets processed.
    let owned = util::seed_owned(&dir).await;
    tx.send(tmpc_directory::DirectoryEvent::ContainerCreated(
        owned.clone(),
    ))
    .unwrap();
    wait_until(|| app.is_tracking(&owned.id)).await;

    drop(tx);
    loop_task.await.unwrap();
}
