//! Reload-on-change support.
//!
//! One `notify` watcher on the current document's directory at a time. Its
//! events are forwarded by a tokio task that reports a single
//! `Action::FileChanged` for the watched file and then exits; the pager
//! re-arms the watch after the reload renders.

use std::path::{Path, PathBuf};
use std::sync::mpsc;

use log::{debug, info, warn};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::oneshot;

use crate::core::action::Action;

struct ActiveWatch {
    // Dropping the watcher stops the OS-level watch.
    _watcher: RecommendedWatcher,
    cancel: oneshot::Sender<()>,
    dir: PathBuf,
}

#[derive(Default)]
pub struct DirWatcher {
    active: Option<ActiveWatch>,
}

impl DirWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Watch `dir` (non-recursively) and send `FileChanged(file)` on `tx` the
    /// first time `file` is created or modified. Replaces any earlier watch.
    pub fn start(&mut self, dir: &Path, file: &Path, tx: mpsc::Sender<Action>) -> notify::Result<()> {
        self.stop();

        let (event_tx, mut event_rx) = tokio::sync::mpsc::unbounded_channel();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let _ = event_tx.send(res);
        })?;
        watcher.watch(dir, RecursiveMode::NonRecursive)?;

        let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();
        let target = file.to_path_buf();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut cancel_rx => break,
                    event = event_rx.recv() => match event {
                        None => break,
                        Some(Err(e)) => warn!("Watch error: {}", e),
                        Some(Ok(event)) if is_change_to(&event, &target) => {
                            debug!("Change detected: {:?}", event.kind);
                            if tx.send(Action::FileChanged(target.clone())).is_err() {
                                warn!("Failed to report change to {}: receiver dropped", target.display());
                            }
                            break;
                        }
                        Some(Ok(_)) => {}
                    }
                }
            }
            debug!("Watch task for {} finished", target.display());
        });

        info!("Watching {} for changes to {}", dir.display(), file.display());
        self.active = Some(ActiveWatch {
            _watcher: watcher,
            cancel: cancel_tx,
            dir: dir.to_path_buf(),
        });
        Ok(())
    }

    pub fn stop(&mut self) {
        if let Some(active) = self.active.take() {
            let _ = active.cancel.send(());
            info!("Stopped watching {}", active.dir.display());
        }
    }

    pub fn is_watching(&self) -> bool {
        self.active.is_some()
    }
}

impl Drop for DirWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn is_change_to(event: &Event, file: &Path) -> bool {
    matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
        && event.paths.iter().any(|p| p == file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{TempTree, abs_eval};
    use notify::event::{CreateKind, ModifyKind, RemoveKind};
    use std::fs;
    use std::time::Duration;

    #[test]
    fn only_create_or_modify_of_the_file_counts() {
        let file = PathBuf::from("/docs/a.md");
        let modify = Event::new(EventKind::Modify(ModifyKind::Any)).add_path(file.clone());
        let create = Event::new(EventKind::Create(CreateKind::File)).add_path(file.clone());
        let remove = Event::new(EventKind::Remove(RemoveKind::File)).add_path(file.clone());
        let other = Event::new(EventKind::Modify(ModifyKind::Any)).add_path(PathBuf::from("/docs/b.md"));

        assert!(is_change_to(&modify, &file));
        assert!(is_change_to(&create, &file));
        assert!(!is_change_to(&remove, &file));
        assert!(!is_change_to(&other, &file));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn reports_change_to_watched_file() {
        let tree = TempTree::new();
        let file = abs_eval(&tree.write("doc.md", "one"));
        let dir = file.parent().unwrap().to_path_buf();
        let (tx, rx) = mpsc::channel();

        let mut watcher = DirWatcher::new();
        watcher.start(&dir, &file, tx).unwrap();
        assert!(watcher.is_watching());
        tokio::time::sleep(Duration::from_millis(200)).await;

        fs::write(dir.join("unrelated.md"), "x").unwrap();
        fs::write(&file, "two").unwrap();

        let action = tokio::task::spawn_blocking(move || rx.recv_timeout(Duration::from_secs(5)))
            .await
            .unwrap()
            .expect("change notification");
        assert_eq!(action, Action::FileChanged(file));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn stop_silences_the_watch() {
        let tree = TempTree::new();
        let file = abs_eval(&tree.write("doc.md", "one"));
        let dir = file.parent().unwrap().to_path_buf();
        let (tx, rx) = mpsc::channel();

        let mut watcher = DirWatcher::new();
        watcher.start(&dir, &file, tx).unwrap();
        watcher.stop();
        assert!(!watcher.is_watching());
        tokio::time::sleep(Duration::from_millis(100)).await;

        fs::write(&file, "two").unwrap();
        let result = tokio::task::spawn_blocking(move || rx.recv_timeout(Duration::from_millis(500)))
            .await
            .unwrap();
        assert!(result.is_err());
    }
}
