mod support;

use chrono::Days;
use potd_core::{DateCursor, ExhaustReason, PotdError, WalkError, WalkPolicy};
use support::*;

fn harness(policy: WalkPolicy) -> (tempfile::TempDir, Harness) {
    let dir = tempfile::tempdir().unwrap();
    let harness = Harness::new(dir.path(), day(2024, 10, 5), policy);
    (dir, harness)
}

#[tokio::test]
async fn walk_lands_on_first_day_with_data_and_moves_cursor() {
    let (_dir, h) = harness(WalkPolicy::default());
    let requested = h.today;
    let target = requested - Days::new(3);
    h.source.answer(target, Scripted::Record(provider_video(target)));
    let cursor = DateCursor::new(requested);

    let success = h
        .service
        .walker()
        .walk_and_commit(&cursor, requested)
        .await
        .unwrap();

    assert_eq!(success.final_date, target);
    assert_eq!(success.requested_date, requested);
    assert_eq!(success.attempts, 3);
    assert!(!success.cached);
    assert_eq!(cursor.current(), target);
    assert_eq!(
        h.source.probes(),
        vec![
            requested,
            requested - Days::new(1),
            requested - Days::new(2),
            target
        ]
    );
}

#[tokio::test]
async fn walk_without_missing_days_takes_zero_steps() {
    let (_dir, h) = harness(WalkPolicy::default());
    h.records
        .inner
        .seed(stored_record(h.today, potd_model::MediaKind::Image));

    let success = h.service.walker().walk(h.today).await.unwrap();

    assert_eq!(success.attempts, 0);
    assert_eq!(success.final_date, h.today);
    assert!(success.cached);
    assert_eq!(h.source.calls(), 0);
}

/// (max_attempts, horizon_days, expected reason, expected probe count)
const BOUND_CASES: &[(u32, u32, ExhaustReason, usize)] = &[
    (20, 50, ExhaustReason::MaxAttemptsReached, 21),
    (20, 5, ExhaustReason::OldestDateReached, 6),
    (3, 60, ExhaustReason::MaxAttemptsReached, 4),
    (60, 50, ExhaustReason::OldestDateReached, 51),
];

#[tokio::test]
async fn empty_window_exhausts_on_whichever_bound_comes_first() {
    for &(max_attempts, horizon_days, reason, probes) in BOUND_CASES {
        let (_dir, h) = harness(WalkPolicy {
            max_attempts,
            horizon_days,
        });

        let err = h.service.walker().walk(h.today).await.unwrap_err();

        match err {
            WalkError::Exhausted {
                reason: got,
                requested,
                last_probe,
                attempts,
            } => {
                assert_eq!(got, reason, "max={max_attempts} horizon={horizon_days}");
                assert_eq!(requested, h.today);
                assert_eq!(attempts as usize, probes - 1);
                assert_eq!(last_probe, h.today - Days::new(attempts as u64));
                assert!(last_probe >= h.today - Days::new(horizon_days as u64));
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
        assert_eq!(h.source.calls(), probes);
    }
}

#[tokio::test]
async fn transport_errors_end_the_walk_immediately() {
    let (_dir, h) = harness(WalkPolicy::default());
    h.source.answer(h.today, Scripted::Fail("gateway timeout".into()));
    let cursor = DateCursor::new(h.today);

    let err = h
        .service
        .walker()
        .walk_and_commit(&cursor, h.today)
        .await
        .unwrap_err();

    assert!(matches!(err, WalkError::Failed(PotdError::Transport(_))));
    assert_eq!(h.source.calls(), 1);
    assert_eq!(cursor.current(), h.today);
}

#[tokio::test]
async fn misrouted_not_found_page_is_not_walked() {
    let (_dir, h) = harness(WalkPolicy::default());
    h.source.answer(
        h.today,
        Scripted::Status(404, "<html><body>404 Not Found</body></html>".into()),
    );

    let err = h.service.walker().walk(h.today).await.unwrap_err();

    assert!(matches!(err, WalkError::Failed(PotdError::Transport(_))));
    assert_eq!(h.source.calls(), 1);
}

#[tokio::test]
async fn provider_not_found_with_no_data_message_is_walked() {
    let (_dir, h) = harness(WalkPolicy::default());
    let previous = h.today - Days::new(1);
    h.source.answer(
        h.today,
        Scripted::Status(
            404,
            r#"{"code":404,"msg":"No data available for date: 2024-10-05"}"#.into(),
        ),
    );
    h.source
        .answer(previous, Scripted::Record(provider_video(previous)));

    let success = h.service.walker().walk(h.today).await.unwrap();

    assert_eq!(success.final_date, previous);
    assert_eq!(success.attempts, 1);
    assert_eq!(h.source.probes(), vec![h.today, previous]);
}

#[tokio::test]
async fn requests_behind_the_horizon_are_not_probed() {
    let (_dir, h) = harness(WalkPolicy::default());
    let ancient = day(2020, 1, 1);

    let err = h.service.walker().walk(ancient).await.unwrap_err();

    assert!(matches!(
        err,
        WalkError::Exhausted {
            reason: ExhaustReason::OldestDateReached,
            attempts: 0,
            ..
        }
    ));
    assert_eq!(h.source.calls(), 0);
    assert_eq!(h.records.gets(), 0);
}

#[tokio::test]
async fn late_walk_does_not_drag_cursor_back() {
    let (_dir, h) = harness(WalkPolicy::default());
    let requested = h.today;
    let target = requested - Days::new(1);
    h.source.answer(target, Scripted::Record(provider_video(target)));
    let cursor = DateCursor::new(requested);
    // The user has already moved on before the walk finishes.
    cursor.navigate(day(2024, 9, 30));

    let success = h
        .service
        .walker()
        .walk_and_commit(&cursor, requested)
        .await
        .unwrap();

    assert_eq!(success.final_date, target);
    assert_eq!(cursor.current(), day(2024, 9, 30));
}
