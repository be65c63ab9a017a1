use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use agentcell::{
    Agent, BoxError, Change, CompletionSignal, Config, ErrorKind, Executor, ExecutorRef, Executors,
    Observe, Task, UpdateError,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::runtime::Runtime;

const WAIT: Option<Duration> = Some(Duration::from_secs(10));

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .unwrap()
}

fn executors(rt: &Runtime) -> Executors {
    Executors::new(rt.handle().clone())
}

/// Records every change it sees.
#[derive(Default)]
struct Recorder {
    seen: Mutex<Vec<(u64, i64)>>,
}

#[async_trait]
impl Observe<i64> for Recorder {
    async fn on_change(&self, change: &Change<i64>) {
        self.seen.lock().push((change.seq, *change.value));
    }

    fn name(&self) -> &'static str {
        "recorder"
    }
}

/// Counts tasks before forwarding them.
struct Counting {
    runs: AtomicUsize,
    inner: ExecutorRef,
}

impl Executor for Counting {
    fn execute(&self, task: Task) {
        self.runs.fetch_add(1, Ordering::SeqCst);
        self.inner.execute(task);
    }
}

fn counter(
    hits: &Arc<AtomicUsize>,
) -> impl Fn(&UpdateError) -> Result<(), BoxError> + Send + Sync + use<> {
    let hits = Arc::clone(hits);
    move |_err: &UpdateError| -> Result<(), BoxError> {
        hits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Polls `cond` until it holds or a few seconds pass.
fn eventually(cond: impl Fn() -> bool) -> bool {
    for _ in 0..500 {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    cond()
}

#[test]
fn scenario_post_then_wait_reads_new_value() {
    let rt = runtime();
    let agent = Agent::new(10i64, &executors(&rt));

    assert!(agent.post(|x| Ok(x + 100)));
    assert!(agent.wait(WAIT));
    assert_eq!(*agent.value(), 110);
}

#[test]
fn scenario_rejected_result_leaves_value_unchanged() {
    let rt = runtime();
    let agent = Agent::new(10i64, &executors(&rt));
    agent.validate(|x| *x >= 0);

    agent.post(|_| Ok(-5));
    assert!(agent.wait(WAIT));
    assert_eq!(*agent.value(), 10);
}

#[test]
fn scenario_first_matching_rescuer_handles_error() {
    let rt = runtime();
    let agent = Agent::new(0i64, &executors(&rt));
    let h1 = Arc::new(AtomicUsize::new(0));
    let h2 = Arc::new(AtomicUsize::new(0));
    agent
        .rescue(ErrorKind::Argument, counter(&h1))
        .rescue(ErrorKind::Any, counter(&h2));

    agent.post(|_| Err(UpdateError::type_mismatch("not a number")));
    assert!(agent.wait(WAIT));

    assert_eq!(h1.load(Ordering::SeqCst), 0);
    assert_eq!(h2.load(Ordering::SeqCst), 1);
    assert_eq!(*agent.value(), 0);
}

#[test]
fn scenario_updates_apply_in_submission_order() {
    let rt = runtime();
    let agent = Agent::new(1i64, &executors(&rt));

    agent.post(|x| Ok(x * 2));
    agent.post(|x| Ok(x + 1));
    assert!(agent.wait(WAIT));
    assert_eq!(*agent.value(), 3);
}

#[test]
fn scenario_timed_out_update_is_discarded() {
    let rt = runtime();
    let agent = Agent::builder(0i64)
        .timeout(Duration::from_millis(10))
        .build(&executors(&rt));

    agent.post(|_| {
        thread::sleep(Duration::from_secs(1));
        Ok(99)
    });
    assert!(agent.wait(WAIT));
    assert_eq!(*agent.value(), 0);

    // The late result stays discarded after the function returns.
    thread::sleep(Duration::from_millis(1200));
    assert_eq!(*agent.value(), 0);
}

#[test]
fn timeout_is_routed_to_rescuers_as_timeout_kind() {
    let rt = runtime();
    let agent = Agent::builder(0i64)
        .timeout(Duration::from_millis(20))
        .build(&executors(&rt));
    let kinds = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&kinds);
    agent.rescue(ErrorKind::Runtime, move |err| {
        seen.lock().push(err.kind);
        Ok(())
    });

    agent.post_blocking(|_| {
        thread::sleep(Duration::from_millis(300));
        Ok(1)
    });
    assert!(agent.wait(WAIT));
    assert_eq!(*kinds.lock(), vec![ErrorKind::Timeout]);
}

#[test]
fn left_fold_over_many_updates_from_one_thread() {
    let rt = runtime();
    let agent = Agent::new(Vec::<u32>::new(), &executors(&rt));

    for i in 0..200u32 {
        agent.post(move |v| {
            let mut next = v.clone();
            next.push(i);
            Ok(next)
        });
    }
    assert!(agent.wait(WAIT));
    assert_eq!(*agent.value(), (0..200).collect::<Vec<_>>());
}

#[test]
fn updates_never_overlap_across_posting_threads() {
    let rt = runtime();
    let agent = Agent::new(0i64, &executors(&rt));
    let running = Arc::new(AtomicUsize::new(0));
    let overlaps = Arc::new(AtomicUsize::new(0));

    let posters: Vec<_> = (0..8)
        .map(|_| {
            let agent = agent.clone();
            let running = Arc::clone(&running);
            let overlaps = Arc::clone(&overlaps);
            thread::spawn(move || {
                for _ in 0..50 {
                    let running = Arc::clone(&running);
                    let overlaps = Arc::clone(&overlaps);
                    agent.post(move |x| {
                        if running.fetch_add(1, Ordering::SeqCst) != 0 {
                            overlaps.fetch_add(1, Ordering::SeqCst);
                        }
                        thread::sleep(Duration::from_micros(100));
                        running.fetch_sub(1, Ordering::SeqCst);
                        Ok(x + 1)
                    });
                }
            })
        })
        .collect();
    for poster in posters {
        poster.join().unwrap();
    }

    assert!(agent.wait(WAIT));
    assert_eq!(*agent.value(), 400);
    assert_eq!(overlaps.load(Ordering::SeqCst), 0);
}

#[test]
fn rejected_update_does_not_notify_observers() {
    let rt = runtime();
    let recorder = Arc::new(Recorder::default());
    let agent = Agent::builder(0i64)
        .validator(|x| *x % 2 == 0)
        .observer(recorder.clone())
        .build(&executors(&rt));

    agent.post(|_| Ok(3));
    agent.post(|_| Ok(4));
    assert!(agent.wait(WAIT));

    // The wait barrier commits the unchanged value too.
    assert!(eventually(|| recorder.seen.lock().len() == 2));
    let values: Vec<i64> = recorder.seen.lock().iter().map(|(_, v)| *v).collect();
    assert_eq!(values, vec![4, 4]);
    let seqs: Vec<u64> = recorder.seen.lock().iter().map(|(s, _)| *s).collect();
    assert!(seqs[0] < seqs[1]);
}

#[test]
fn failed_update_neither_commits_nor_notifies() {
    let rt = runtime();
    let recorder = Arc::new(Recorder::default());
    let agent = Agent::new(7i64, &executors(&rt));
    let id = agent.subscribe(recorder.clone());

    agent.post(|_| Err(UpdateError::runtime("boom")));
    agent.post(|_| panic!("update panicked"));
    assert!(agent.wait(WAIT));
    assert_eq!(*agent.value(), 7);

    assert!(eventually(|| recorder.seen.lock().len() == 1));
    assert!(agent.unsubscribe(id));
}

#[test]
fn panicking_update_is_rescued_as_panic_kind() {
    let rt = runtime();
    let agent = Agent::new(1i64, &executors(&rt));
    let kinds = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&kinds);
    agent.rescue(ErrorKind::Panic, move |err| {
        seen.lock().push(err.message.clone());
        Ok(())
    });

    agent.post(|_| panic!("kaboom"));
    agent.post(|x| Ok(x + 1));
    assert!(agent.wait(WAIT));

    assert_eq!(*kinds.lock(), vec!["kaboom".to_string()]);
    assert_eq!(*agent.value(), 2);
}

#[test]
fn failing_rescue_handler_is_contained() {
    let rt = runtime();
    let agent = Agent::new(1i64, &executors(&rt));
    agent.rescue(ErrorKind::Any, |_| Err("handler failed".into()));

    agent.post(|_| Err(UpdateError::argument("bad")));
    agent.post(|x| Ok(x * 10));
    assert!(agent.wait(WAIT));
    assert_eq!(*agent.value(), 10);
}

#[test]
fn wait_times_out_while_earlier_update_is_running() {
    let rt = runtime();
    let agent = Agent::new(0i64, &executors(&rt));
    let gate = Arc::new(CompletionSignal::new());
    let release = Arc::clone(&gate);

    agent.post_blocking(move |x| {
        release.wait(Some(Duration::from_secs(5)));
        Ok(x + 1)
    });
    assert!(!agent.wait(Some(Duration::from_millis(50))));

    gate.set();
    assert!(agent.wait(WAIT));
    assert_eq!(*agent.value(), 1);
}

#[test]
fn validator_change_applies_to_updates_not_yet_started() {
    let rt = runtime();
    let agent = Agent::new(0i64, &executors(&rt));
    let started = Arc::new(CompletionSignal::new());
    let gate = Arc::new(CompletionSignal::new());
    let (s, g) = (Arc::clone(&started), Arc::clone(&gate));

    agent.post_blocking(move |_| {
        s.set();
        g.wait(Some(Duration::from_secs(5)));
        Ok(1)
    });
    agent.post(|_| Ok(5));
    assert!(started.wait(WAIT));

    // Running update keeps the validator it snapshotted; the queued one sees the new one.
    agent.validate(|x| *x < 2);
    gate.set();
    assert!(agent.wait(WAIT));
    assert_eq!(*agent.value(), 1);
}

#[test]
fn value_reads_do_not_block_on_running_update() {
    let rt = runtime();
    let agent = Agent::new(3i64, &executors(&rt));
    let gate = Arc::new(CompletionSignal::new());
    let g = Arc::clone(&gate);

    agent.post_blocking(move |x| {
        g.wait(Some(Duration::from_secs(5)));
        Ok(x + 1)
    });
    assert_eq!(*agent.value(), 3);
    assert!(agent.queued() >= 1);

    gate.set();
    assert!(agent.wait(WAIT));
    assert_eq!(*agent.value(), 4);
}

#[test]
fn blocking_config_routes_post_to_blocking_executor() {
    let rt = runtime();
    let base = executors(&rt);
    let blocking = Arc::new(Counting {
        runs: AtomicUsize::new(0),
        inner: Arc::clone(base.blocking()),
    });
    let execs = base.with_blocking(blocking.clone());
    let agent = Agent::builder(0i64)
        .config(Config {
            blocking: true,
            ..Config::default()
        })
        .build(&execs);

    agent.post(|x| Ok(x + 1));
    assert!(agent.wait(WAIT));
    assert_eq!(blocking.runs.load(Ordering::SeqCst), 2);

    let fast_agent = Agent::new(0i64, &execs);
    fast_agent.post(|x| Ok(x + 1));
    assert!(fast_agent.wait(WAIT));
    assert_eq!(blocking.runs.load(Ordering::SeqCst), 2);
}

#[test]
fn read_transforms_apply_on_value() {
    let rt = runtime();
    let execs = executors(&rt);

    let shared = Agent::new(vec![1, 2], &execs);
    assert!(Arc::ptr_eq(&shared.value(), &shared.value()));

    let frozen = Agent::builder(vec![1, 2]).freeze_on_deref(true).build(&execs);
    assert!(Arc::ptr_eq(&frozen.value(), &frozen.value()));

    let dup = Agent::builder(vec![1, 2]).dup_on_deref(true).build(&execs);
    assert!(!Arc::ptr_eq(&dup.value(), &dup.value()));
    assert_eq!(*dup.value(), vec![1, 2]);

    let copied = Agent::builder(vec![1, 2])
        .copy_on_deref(|v: &Vec<i32>| v.iter().map(|x| x * 10).collect())
        .build(&execs);
    copied.post(|v| Ok(v.iter().copied().chain([3]).collect()));
    assert!(copied.wait(WAIT));
    assert_eq!(*copied.value(), vec![10, 20, 30]);
}

#[test]
fn settle_waits_inside_runtime() {
    let rt = runtime();
    let agent = Agent::new(1i64, &executors(&rt));

    rt.block_on(async {
        agent.post(|x| Ok(x + 41));
        assert!(agent.settle(WAIT).await);
    });
    assert_eq!(*agent.value(), 42);
}

#[test]
fn default_timeout_is_exposed() {
    let rt = runtime();
    let agent = Agent::new((), &executors(&rt));
    assert_eq!(agent.timeout(), Some(agentcell::DEFAULT_TIMEOUT));

    let unbounded = Agent::builder(())
        .timeout(Duration::ZERO)
        .build(&executors(&rt));
    assert_eq!(unbounded.timeout(), None);
}
