//! Integration tests for the poll loop.
//!
//! All tests run on a paused tokio clock, so elapsed times are exact and the
//! suite never actually sleeps.

use converge_wait_engine::{
    wait, wait_with_snapshot, PollResult, StateLabel, WaitContext, WaitError, WaiterSpec,
};
use proptest::prelude::*;
use std::future::{ready, Ready};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

type Poll = Result<PollResult<usize>, std::io::Error>;

/// Status function that replays `states` in order, repeating the last entry.
/// `None` stands for "resource not found". The resource is the 1-based poll number.
fn scripted(
    states: Vec<Option<&'static str>>,
    polls: Arc<AtomicUsize>,
) -> impl FnMut() -> Ready<Poll> {
    move || {
        let n = polls.fetch_add(1, Ordering::SeqCst);
        let state = states.get(n).or(states.last()).copied().flatten();
        ready(Ok(match state {
            Some(state) => PollResult::found(n + 1, state),
            None => PollResult::NotFound,
        }))
    }
}

fn creating_spec(timeout: Duration) -> WaiterSpec {
    WaiterSpec::builder(timeout)
        .pending(["CREATING"])
        .target(["ACTIVE"])
        .poll_interval(Duration::from_millis(10))
        .build()
        .expect("valid spec")
}

#[test_log::test(tokio::test(start_paused = true))]
async fn test_target_on_first_poll_succeeds_immediately() {
    let polls = Arc::new(AtomicUsize::new(0));
    let start = Instant::now();

    let result = wait(
        &WaitContext::new(),
        &creating_spec(Duration::from_secs(5)),
        scripted(vec![Some("ACTIVE")], polls.clone()),
    )
    .await
    .expect("should converge");

    assert_eq!(result, Some(1));
    assert_eq!(polls.load(Ordering::SeqCst), 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_unexpected_state_aborts_on_first_poll() {
    let polls = Arc::new(AtomicUsize::new(0));

    let err = wait(
        &WaitContext::new(),
        &creating_spec(Duration::from_secs(3600)),
        scripted(vec![Some("FAILED")], polls.clone()),
    )
    .await
    .unwrap_err();

    match err {
        WaitError::UnexpectedState { state, expected } => {
            assert_eq!(state, "FAILED");
            assert_eq!(expected, vec![StateLabel::from("ACTIVE")]);
        }
        other => panic!("expected UnexpectedState, got {other:?}"),
    }
    assert_eq!(polls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_pending_between_targets_resets_streak() {
    let polls = Arc::new(AtomicUsize::new(0));
    let spec = WaiterSpec::builder(Duration::from_secs(5))
        .pending(["CREATING"])
        .target(["ACTIVE"])
        .poll_interval(Duration::from_millis(10))
        .required_consecutive_observations(2)
        .build()
        .unwrap();

    let result = wait(
        &WaitContext::new(),
        &spec,
        scripted(
            vec![Some("ACTIVE"), Some("CREATING"), Some("ACTIVE"), Some("ACTIVE")],
            polls.clone(),
        ),
    )
    .await
    .expect("should converge");

    assert_eq!(result, Some(4));
    assert_eq!(polls.load(Ordering::SeqCst), 4);
}

#[test_log::test(tokio::test(start_paused = true))]
async fn test_always_pending_times_out_within_one_interval() {
    let polls = Arc::new(AtomicUsize::new(0));
    let spec = WaiterSpec::builder(Duration::from_millis(100))
        .pending(["CREATING"])
        .target(["ACTIVE"])
        .min_interval(Duration::from_millis(10))
        .build()
        .unwrap();
    let start = Instant::now();

    let err = wait(
        &WaitContext::new(),
        &spec,
        scripted(vec![Some("CREATING")], polls.clone()),
    )
    .await
    .unwrap_err();

    let elapsed = start.elapsed();
    assert!(err.is_timeout(), "expected timeout, got {err:?}");
    assert_eq!(err.last_state(), Some(&StateLabel::from("CREATING")));
    assert!(
        elapsed >= Duration::from_millis(100) && elapsed <= Duration::from_millis(150),
        "elapsed {elapsed:?}"
    );
    assert!(polls.load(Ordering::SeqCst) >= 2);
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_mid_wait_is_prompt() {
    let polls = Arc::new(AtomicUsize::new(0));
    let ctx = WaitContext::new();
    let canceller = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        canceller.cancel();
    });
    let start = Instant::now();

    let err = wait(
        &ctx,
        &creating_spec(Duration::from_secs(60)),
        scripted(vec![Some("CREATING")], polls.clone()),
    )
    .await
    .unwrap_err();

    assert!(err.is_cancelled(), "expected cancellation, got {err:?}");
    assert!(!err.is_timeout());
    assert!(start.elapsed() <= Duration::from_millis(30), "elapsed {:?}", start.elapsed());
    assert_eq!(err.last_state(), Some(&StateLabel::from("CREATING")));
}

#[tokio::test(start_paused = true)]
async fn test_already_cancelled_context_never_polls() {
    let polls = Arc::new(AtomicUsize::new(0));
    let ctx = WaitContext::new();
    ctx.cancel();

    let err = wait(
        &ctx,
        &creating_spec(Duration::from_secs(5)),
        scripted(vec![Some("ACTIVE")], polls.clone()),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, WaitError::Cancelled { last_state: None }));
    assert_eq!(polls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_absence_is_success_for_empty_target() {
    let polls = Arc::new(AtomicUsize::new(0));
    let spec = WaiterSpec::builder(Duration::from_secs(5))
        .pending(["Active", "Deleting"])
        .build()
        .unwrap();

    let result = wait(&WaitContext::new(), &spec, scripted(vec![None], polls.clone()))
        .await
        .expect("should converge");

    assert_eq!(result, None);
    assert_eq!(polls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_deletion_wait_observes_pending_then_absence() {
    let polls = Arc::new(AtomicUsize::new(0));
    let spec = WaiterSpec::builder(Duration::from_secs(5))
        .pending(["Active", "Deleting"])
        .poll_interval(Duration::from_millis(10))
        .build()
        .unwrap();

    let result = wait(
        &WaitContext::new(),
        &spec,
        scripted(vec![Some("Active"), Some("Deleting"), None], polls.clone()),
    )
    .await
    .expect("should converge");

    assert_eq!(result, None);
    assert_eq!(polls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_creating_sequence_returns_active_snapshot() {
    let polls = Arc::new(AtomicUsize::new(0));
    let start = Instant::now();

    let result = wait(
        &WaitContext::new(),
        &creating_spec(Duration::from_secs(5)),
        scripted(
            vec![Some("CREATING"), Some("CREATING"), Some("ACTIVE")],
            polls.clone(),
        ),
    )
    .await
    .expect("should converge");

    assert_eq!(result, Some(3));
    assert_eq!(polls.load(Ordering::SeqCst), 3);
    assert_eq!(start.elapsed(), Duration::from_millis(20));
}

#[tokio::test(start_paused = true)]
async fn test_status_error_is_fatal_and_not_retried() {
    let polls = Arc::new(AtomicUsize::new(0));
    let counter = polls.clone();

    let err = wait(
        &WaitContext::new(),
        &creating_spec(Duration::from_secs(5)),
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            ready(Err::<PollResult<usize>, _>(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "AccessDeniedException",
            )))
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, WaitError::Fatal { .. }));
    assert!(err.to_string().contains("AccessDeniedException"));
    assert_eq!(polls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_context_deadline_shortens_spec_timeout() {
    let polls = Arc::new(AtomicUsize::new(0));
    let ctx = WaitContext::new().with_timeout(Duration::from_millis(50));
    let start = Instant::now();

    let err = wait(
        &ctx,
        &creating_spec(Duration::from_secs(60)),
        scripted(vec![Some("CREATING")], polls.clone()),
    )
    .await
    .unwrap_err();

    assert!(err.is_timeout());
    assert_eq!(start.elapsed(), Duration::from_millis(50));
}

#[tokio::test(start_paused = true)]
async fn test_slow_status_call_is_bounded_by_timeout() {
    let start = Instant::now();

    let err = wait(
        &WaitContext::new(),
        &creating_spec(Duration::from_millis(100)),
        || async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok::<_, std::io::Error>(PollResult::found(0usize, "ACTIVE"))
        },
    )
    .await
    .unwrap_err();

    assert!(err.is_timeout());
    assert_eq!(err.last_state(), None);
    assert_eq!(start.elapsed(), Duration::from_millis(100));
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_interrupts_slow_status_call() {
    let ctx = WaitContext::new();
    let canceller = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        canceller.cancel();
    });
    let start = Instant::now();

    let err = wait(&ctx, &creating_spec(Duration::from_secs(60)), || async {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok::<_, std::io::Error>(PollResult::found(0usize, "ACTIVE"))
    })
    .await
    .unwrap_err();

    assert!(err.is_cancelled());
    assert_eq!(start.elapsed(), Duration::from_millis(20));
}

#[tokio::test(start_paused = true)]
async fn test_initial_delay_precedes_first_poll() {
    let polls = Arc::new(AtomicUsize::new(0));
    let spec = WaiterSpec::builder(Duration::from_secs(5))
        .pending(["CREATING"])
        .target(["ACTIVE"])
        .delay(Duration::from_secs(1))
        .build()
        .unwrap();
    let start = Instant::now();

    let result = wait(
        &WaitContext::new(),
        &spec,
        scripted(vec![Some("ACTIVE")], polls.clone()),
    )
    .await
    .unwrap();

    assert_eq!(result, Some(1));
    assert_eq!(start.elapsed(), Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_missing_resource_gives_up_after_not_found_checks() {
    let polls = Arc::new(AtomicUsize::new(0));
    let spec = WaiterSpec::builder(Duration::from_secs(60))
        .pending(["CREATING"])
        .target(["ACTIVE"])
        .poll_interval(Duration::from_millis(10))
        .not_found_checks(3)
        .build()
        .unwrap();

    let err = wait(&WaitContext::new(), &spec, scripted(vec![None], polls.clone()))
        .await
        .unwrap_err();

    assert!(matches!(err, WaitError::NotFound { checks: 4 }));
    assert_eq!(polls.load(Ordering::SeqCst), 4);
}

#[test_log::test(tokio::test(start_paused = true))]
async fn test_confirmation_poll_uses_minimum_interval() {
    let polls = Arc::new(AtomicUsize::new(0));
    let spec = WaiterSpec::builder(Duration::from_secs(60))
        .pending(["P"])
        .target(["T"])
        .min_interval(Duration::from_millis(10))
        .max_interval(Duration::from_secs(1))
        .required_consecutive_observations(2)
        .build()
        .unwrap();
    let start = Instant::now();

    let result = wait(
        &WaitContext::new(),
        &spec,
        scripted(
            vec![
                Some("P"),
                Some("P"),
                Some("P"),
                Some("P"),
                Some("P"),
                Some("T"),
                Some("T"),
            ],
            polls.clone(),
        ),
    )
    .await
    .expect("should converge");

    assert_eq!(result, Some(7));
    // Backoff polls at 0, 10, 30, 70, 150 and 310ms; the confirmation follows 10ms later.
    assert_eq!(start.elapsed(), Duration::from_millis(320));
}

#[tokio::test(start_paused = true)]
async fn test_backoff_resumes_after_unconfirmed_target() {
    let polls = Arc::new(AtomicUsize::new(0));
    let spec = WaiterSpec::builder(Duration::from_secs(60))
        .pending(["P"])
        .target(["T"])
        .min_interval(Duration::from_millis(10))
        .max_interval(Duration::from_secs(1))
        .required_consecutive_observations(2)
        .build()
        .unwrap();
    let start = Instant::now();

    let result = wait(
        &WaitContext::new(),
        &spec,
        scripted(
            vec![Some("P"), Some("T"), Some("P"), Some("T"), Some("T")],
            polls.clone(),
        ),
    )
    .await
    .expect("should converge");

    assert_eq!(result, Some(5));
    // Polls at 0, 10 (T), 20 (confirmation, P), 40 (T) and 50ms.
    assert_eq!(start.elapsed(), Duration::from_millis(50));
}

#[tokio::test(start_paused = true)]
async fn test_unbounded_timeout_converges() {
    let polls = Arc::new(AtomicUsize::new(0));
    let spec = WaiterSpec::builder(Duration::MAX)
        .pending(["P"])
        .target(["T"])
        .build()
        .unwrap();

    let result = wait(
        &WaitContext::new().with_timeout(Duration::MAX),
        &spec,
        scripted(vec![Some("P"), Some("T")], polls.clone()),
    )
    .await
    .expect("should converge");

    assert_eq!(result, Some(2));
    assert_eq!(polls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_unexpected_state_hands_back_resource() {
    let polls = Arc::new(AtomicUsize::new(0));

    let failure = wait_with_snapshot(
        &WaitContext::new(),
        &creating_spec(Duration::from_secs(5)),
        scripted(vec![Some("CREATING"), Some("FAILED")], polls.clone()),
    )
    .await
    .unwrap_err();

    assert!(matches!(failure.error, WaitError::UnexpectedState { .. }));
    assert_eq!(failure.last_resource, Some(2));
}

#[tokio::test(start_paused = true)]
async fn test_timeout_hands_back_last_resource() {
    let polls = Arc::new(AtomicUsize::new(0));

    let failure = wait_with_snapshot(
        &WaitContext::new(),
        &creating_spec(Duration::from_millis(35)),
        scripted(vec![Some("CREATING")], polls.clone()),
    )
    .await
    .unwrap_err();

    assert!(failure.error.is_timeout());
    // Polls at 0, 10, 20 and 30ms before the deadline.
    assert_eq!(failure.last_resource, Some(4));
    let err: WaitError = failure.into();
    assert_eq!(err.last_state(), Some(&StateLabel::from("CREATING")));
}

#[tokio::test(start_paused = true)]
async fn test_not_found_leaves_no_snapshot() {
    let polls = Arc::new(AtomicUsize::new(0));
    let spec = WaiterSpec::builder(Duration::from_secs(60))
        .pending(["CREATING"])
        .target(["ACTIVE"])
        .poll_interval(Duration::from_millis(10))
        .not_found_checks(1)
        .build()
        .unwrap();

    let failure = wait_with_snapshot(
        &WaitContext::new(),
        &spec,
        scripted(vec![Some("CREATING"), None], polls.clone()),
    )
    .await
    .unwrap_err();

    assert!(matches!(failure.error, WaitError::NotFound { checks: 2 }));
    assert_eq!(failure.last_resource, None);
}

fn run_paused<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .expect("runtime")
        .block_on(future)
}

fn labels(prefix: &'static str, count: usize) -> Vec<String> {
    (0..count).map(|i| format!("{prefix}{i}")).collect()
}

proptest! {
    #[test]
    fn prop_unexpected_state_always_terminates_first_poll(
        pending in 1usize..5,
        target in 0usize..5,
        unexpected in 0usize..100,
        timeout_secs in 1u64..86_400,
    ) {
        let spec = WaiterSpec::builder(Duration::from_secs(timeout_secs))
            .pending(labels("pending-", pending))
            .target(labels("target-", target))
            .build()
            .unwrap();
        let label = format!("unexpected-{unexpected}");
        let polls = Arc::new(AtomicUsize::new(0));
        let counter = polls.clone();

        let err = run_paused(wait(&WaitContext::new(), &spec, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            ready(Ok::<_, std::io::Error>(PollResult::found((), label.clone())))
        }))
        .unwrap_err();

        let is_unexpected = matches!(err, WaitError::UnexpectedState { .. });
        prop_assert!(is_unexpected);
        prop_assert_eq!(polls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn prop_immediate_target_converges_first_poll(
        pending in 0usize..5,
        target in 1usize..5,
        pick in 0usize..5,
    ) {
        let spec = WaiterSpec::builder(Duration::from_secs(60))
            .pending(labels("pending-", pending))
            .target(labels("target-", target))
            .build()
            .unwrap();
        let label = format!("target-{}", pick % target);
        let polls = Arc::new(AtomicUsize::new(0));
        let counter = polls.clone();

        let result = run_paused(wait(&WaitContext::new(), &spec, move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            ready(Ok::<_, std::io::Error>(PollResult::found(n, label.clone())))
        }));

        prop_assert_eq!(result.ok(), Some(Some(0)));
        prop_assert_eq!(polls.load(Ordering::SeqCst), 1);
    }
}
