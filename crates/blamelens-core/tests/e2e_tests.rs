//! End-to-end tests for BlameLens.
//!
//! These tests verify the full workflow: raw porcelain text → cache → parse → query.

use async_trait::async_trait;
use blamelens_core::{
    BlameConfig, BlameService, BlameSource, Error, LineRange, Result,
};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

const SCENARIO: &str = "\
aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa 1 1 2
author Alice
author-mail <a@x.com>
author-time 1000000000
author-tz +0000
committer Alice
committer-mail <a@x.com>
committer-time 1000000000
committer-tz +0000
summary first
filename foo.txt
line one
bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb 1 2 1
author Bob
author-mail <b@x.com>
author-time 1100000000
author-tz +0000
committer Bob
committer-mail <b@x.com>
committer-time 1100000000
committer-tz +0000
summary second
filename foo.txt
line two
";

/// Real `git blame --porcelain` layout: tab-prefixed code, group sizes,
/// a rename with `previous`, and a boundary commit.
const PORCELAIN: &str = "\
1111111111111111111111111111111111111111 1 1 2
author Carol
author-mail <carol@example.com>
author-time 1500000000
author-tz +0100
committer Carol
committer-mail <carol@example.com>
committer-time 1500000000
committer-tz +0100
summary Initial import
boundary
filename src/old.rs
\tfn main() {
1111111111111111111111111111111111111111 2 2
\t    println!(\"hi\");
2222222222222222222222222222222222222222 3 3 1
author Dave
author-mail <dave@example.com>
author-time 1600000000
author-tz -0700
committer Dave
committer-mail <dave@example.com>
committer-time 1600000000
committer-tz -0700
summary Rename and extend
previous 1111111111111111111111111111111111111111 src/old.rs
filename src/main.rs
\t    run();
1111111111111111111111111111111111111111 3 4 1
\t}
";

/// Serves fixed text, counting fetches and optionally holding them until released.
struct GatedSource {
    data: String,
    fetches: AtomicUsize,
    gate: Option<Arc<Notify>>,
}

impl GatedSource {
    fn new(data: &str) -> Self {
        Self {
            data: data.to_string(),
            fetches: AtomicUsize::new(0),
            gate: None,
        }
    }

    fn gated(data: &str, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(data)
        }
    }

    fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlameSource for GatedSource {
    async fn blame_porcelain(&self, _file_name: &str, _repo_root: &Path) -> Result<String> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        Ok(self.data.clone())
    }
}

struct FailingSource;

#[async_trait]
impl BlameSource for FailingSource {
    async fn blame_porcelain(&self, file_name: &str, _repo_root: &Path) -> Result<String> {
        Err(Error::NotUnderVersionControl(file_name.to_string()))
    }
}

fn service(source: Arc<dyn BlameSource>) -> BlameService {
    BlameService::new(source, "/work/repo", &BlameConfig::default())
}

/// Test the concrete two-commit scenario end to end.
#[tokio::test]
async fn test_scenario() {
    let service = service(Arc::new(GatedSource::new(SCENARIO)));
    let blame = service.get_blame_for_file("foo.txt").await.unwrap();

    let authors: Vec<_> = blame
        .authors
        .iter()
        .map(|a| (a.name.as_str(), a.line_count))
        .collect();
    assert_eq!(authors, vec![("Alice", 1), ("Bob", 1)]);

    let commits: Vec<_> = blame.commits.iter().map(|c| c.sha.as_str()).collect();
    assert_eq!(commits, vec!["bbbbbbbb", "aaaaaaaa"]);

    let lines: Vec<_> = blame
        .lines
        .iter()
        .map(|l| (l.sha.as_str(), l.line, l.original_line))
        .collect();
    assert_eq!(lines, vec![("aaaaaaaa", 0, 0), ("bbbbbbbb", 1, 0)]);
}

/// Test a stream shaped like real git output.
#[tokio::test]
async fn test_git_shaped_porcelain() {
    let service = service(Arc::new(GatedSource::new(PORCELAIN)));
    let file = "/work/repo/src/main.rs";
    let blame = service.get_blame_for_file(file).await.unwrap();

    assert_eq!(blame.lines.len(), 4);
    let lines: BTreeSet<usize> = blame.lines.iter().map(|l| l.line).collect();
    assert_eq!(lines, (0..4).collect());

    let carol = blame.commit("11111111").unwrap();
    assert!(carol.boundary);
    assert_eq!(carol.original_file_name.as_deref(), Some("src/old.rs"));
    assert_eq!(carol.lines.len(), 3);
    assert_eq!(carol.date.offset().local_minus_utc(), 3600);
    assert_eq!(carol.path_in(Path::new("/work/repo")), Path::new("/work/repo/src/old.rs"));

    let dave = blame.commit("22222222").unwrap();
    assert_eq!(dave.original_file_name, None);
    assert_eq!(dave.previous_sha.as_deref(), Some("11111111"));
    assert_eq!(dave.previous_file_name.as_deref(), Some("src/old.rs"));

    assert_eq!(blame.commits[0].sha, "22222222");
    assert_eq!(blame.authors[0].name, "Carol");
    assert_eq!(blame.authors[0].line_count, 3);

    let total: usize = blame.authors.iter().map(|a| a.line_count).sum();
    assert_eq!(total, blame.lines.len());

    let locations = service
        .get_blame_locations(file, LineRange::new(1, 3))
        .await
        .unwrap();
    let summary: Vec<_> = locations
        .iter()
        .map(|l| (l.sha.as_str(), l.file_name.as_str(), l.line.line))
        .collect();
    assert_eq!(
        summary,
        vec![("22222222", "src/main.rs", 2), ("11111111", "src/old.rs", 1)]
    );
}

/// Test that range queries over the whole file match the file query.
#[tokio::test]
async fn test_full_range_is_identity() {
    let service = service(Arc::new(GatedSource::new(PORCELAIN)));
    let blame = service.get_blame_for_file("src/main.rs").await.unwrap();
    let range = service
        .get_blame_for_range("src/main.rs", LineRange::new(0, 3))
        .await
        .unwrap();
    assert_eq!(range, blame.for_file());
}

/// Test that concurrent requests from many tasks trigger a single fetch.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_tasks_coalesce() {
    let gate = Arc::new(Notify::new());
    let source = Arc::new(GatedSource::gated(PORCELAIN, Arc::clone(&gate)));
    let service = Arc::new(service(Arc::clone(&source) as Arc<dyn BlameSource>));

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                service
                    .get_blame_for_line("SRC/main.rs", i % 4)
                    .await
                    .map(|line| line.map(|l| l.commit.sha))
            })
        })
        .collect();

    // Wait until the single fetch is parked on the gate, then release it.
    while source.fetches() == 0 {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    gate.notify_one();

    for task in tasks {
        assert!(task.await.unwrap().unwrap().is_some());
    }
    assert_eq!(source.fetches(), 1);
}

/// Test that a reset after an answered query leads to a fresh fetch.
#[tokio::test(start_paused = true)]
async fn test_save_invalidates_previous_result() {
    let source = Arc::new(GatedSource::new(SCENARIO));
    let service = service(Arc::clone(&source) as Arc<dyn BlameSource>);

    let before = service.get_blame_for_file("foo.txt").await.unwrap();
    service.on_save("foo.txt");
    tokio::time::sleep(Duration::from_secs(3)).await;

    let after = service.get_blame_for_file("foo.txt").await.unwrap();
    assert_eq!(source.fetches(), 2);
    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(before.lines, after.lines);
}

/// Test that source failures reach the caller and are retried on the next call.
#[tokio::test]
async fn test_failures_propagate() {
    let service = service(Arc::new(FailingSource));

    let err = service.get_blame_for_file("foo.txt").await.unwrap_err();
    assert!(matches!(err, Error::NotUnderVersionControl(ref f) if f == "foo.txt"));
    assert!(service.cache().is_empty());

    assert!(service
        .get_blame_for_range("foo.txt", LineRange::new(0, 1))
        .await
        .is_err());
}
