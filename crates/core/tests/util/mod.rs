// Shared fixtures for integration tests. Not every test binary uses
// every helper.
#![allow(dead_code)]

use std::sync::{Arc, Once};
use std::time::Duration;

use tmpc::{App, MemoryDirectory, generate_fingerprint};
use tmpc_directory::{Container, ContainerDirectory, ContainerPatch};

static TRACING: Once = Once::new();

pub fn setup() -> (Arc<MemoryDirectory>, Arc<App>) {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
    let dir = Arc::new(MemoryDirectory::new());
    let app = Arc::new(App::new(dir.clone(), dir.clone()));
    (dir, app)
}

/// Seed a container and stamp it with a valid fingerprint, as if this
/// service had created it in an earlier incarnation.
pub async fn seed_owned(dir: &MemoryDirectory) -> Container {
    let container = dir.seed_container("placeholder");
    let name = generate_fingerprint(&container.id);
    dir.update_container(
        &container.id,
        ContainerPatch {
            name: Some(name),
            ..Default::default()
        },
    )
    .await
    .expect("seeded container must be patchable")
}

/// Poll until `check` passes or a second elapses.
pub async fn wait_until(mut check: impl FnMut() -> bool) {
    for _ in 0..200 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached within timeout");
}
