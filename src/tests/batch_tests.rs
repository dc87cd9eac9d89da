use std::{io, time::Duration};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{
    batch::{BatchConfig, BatchEvent, BatchOrchestrator, BatchReport, BatchState, BatchSummary},
    classifier::{LineType, ValidationResult},
    errors::SourceError,
    interfaces::Classify,
};

use super::init_logger;

/// Calls anything starting with `+` valid, everything else invalid.
struct PlusIsValid;

impl Classify for PlusIsValid {
    fn classify(&self, raw: &str) -> ValidationResult {
        if raw.starts_with('+') {
            ValidationResult {
                input: raw.to_owned(),
                valid: true,
                country: Some("US".to_owned()),
                line_type: Some(LineType::Unknown),
                formatted_national: Some(raw.to_owned()),
                formatted_international: Some(raw.to_owned()),
            }
        } else {
            ValidationResult::invalid(raw)
        }
    }
}

fn orchestrator(chunk_size: usize) -> BatchOrchestrator<PlusIsValid> {
    init_logger();
    BatchOrchestrator::new(
        PlusIsValid,
        BatchConfig { chunk_size, chunk_pause: Duration::ZERO, ..Default::default() },
    )
}

/// One candidate per fragment, alternating valid and invalid.
fn numbered_fragments(count: usize) -> Vec<Result<String, SourceError>> {
    (0..count)
        .map(|index| {
            let number = format!("773 555 {:04}", index % 10_000);
            Ok(if index % 2 == 0 { format!("+1 {number}") } else { number })
        })
        .collect()
}

/// Runs a batch while draining its events on the same task.
async fn run_collecting<C: Classify>(
    orchestrator: &BatchOrchestrator<C>,
    fragments: Vec<Result<String, SourceError>>,
    cancel: CancellationToken,
) -> (BatchReport, Vec<BatchEvent>) {
    let (events, mut receiver) = mpsc::channel(1);
    let collect = async move {
        let mut received = Vec::new();
        while let Some(event) = receiver.recv().await {
            received.push(event);
        }
        received
    };
    tokio::join!(orchestrator.run(fragments.into_iter(), events, cancel), collect)
}

fn progress_of(events: &[BatchEvent]) -> Vec<(usize, usize, u8)> {
    events
        .iter()
        .filter_map(|event| match event {
            BatchEvent::Progress { processed, total, percent } => {
                Some((*processed, *total, *percent))
            }
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn chunks_of_one_hundred() {
    let (report, events) =
        run_collecting(&orchestrator(100), numbered_fragments(250), CancellationToken::new()).await;

    assert_eq!(report.state, BatchState::Completed);
    assert_eq!(events.len(), 4);
    assert_eq!(
        progress_of(&events),
        vec![(100, 250, 40), (200, 250, 80), (250, 250, 100)]
    );
    match events.last() {
        Some(BatchEvent::Result { count, results, summary }) => {
            assert_eq!(*count, 250);
            assert_eq!(results.len(), 250);
            assert_eq!(
                *summary,
                BatchSummary { total: 250, valid: 125, invalid: 125, processed: 250 }
            );
            // Emission order is preserved.
            assert_eq!(results[0].input, "+1 773 555 0000");
            assert_eq!(results[1].input, "773 555 0001");
        }
        other => panic!("expected a result event, got {other:?}"),
    }
}

#[tokio::test]
async fn counts_add_up_and_percent_never_drops() {
    let (report, events) =
        run_collecting(&orchestrator(30), numbered_fragments(317), CancellationToken::new()).await;

    assert_eq!(report.state, BatchState::Completed);
    let progress = progress_of(&events);
    assert_eq!(progress.len(), 317usize.div_ceil(30));
    assert!(progress.windows(2).all(|pair| pair[0].2 <= pair[1].2));
    assert!(progress.windows(2).all(|pair| pair[0].0 < pair[1].0));
    assert_eq!(progress.last().map(|entry| entry.2), Some(100));

    let summary = report.progress;
    assert_eq!(summary.valid_count + summary.invalid_count, summary.processed_count);
    assert_eq!(summary.processed_count, summary.total_count);
    assert_eq!(summary.total_count, 317);
}

#[tokio::test]
async fn fragments_without_numbers_do_not_count() {
    let fragments = vec![
        Ok("+1 773 776 5277".to_owned()),
        Ok("not a number".to_owned()),
        Ok(String::new()),
        Ok("call 800 555 0199 or +1 773 776 5277".to_owned()),
    ];
    let (report, events) =
        run_collecting(&orchestrator(100), fragments, CancellationToken::new()).await;

    assert_eq!(report.state, BatchState::Completed);
    assert_eq!(progress_of(&events), vec![(3, 3, 100)]);
    assert!(matches!(
        events.last(),
        Some(BatchEvent::Result {
            summary: BatchSummary { total: 3, valid: 2, invalid: 1, processed: 3 },
            ..
        })
    ));
}

#[tokio::test]
async fn empty_source_reports_full_progress_once() {
    let fragments = vec![Ok("nothing to see".to_owned())];
    let (report, events) =
        run_collecting(&orchestrator(100), fragments, CancellationToken::new()).await;

    assert_eq!(report.state, BatchState::Completed);
    assert_eq!(
        events,
        vec![
            BatchEvent::Progress { processed: 0, total: 0, percent: 100 },
            BatchEvent::Result {
                count: 0,
                results: Vec::new(),
                summary: BatchSummary { total: 0, valid: 0, invalid: 0, processed: 0 },
            },
        ]
    );
}

#[tokio::test]
async fn source_failure_sends_one_error_and_no_result() {
    let mut fragments = numbered_fragments(120);
    fragments.push(Err(SourceError::Read(io::Error::other("disk unplugged"))));
    fragments.extend(numbered_fragments(179));

    let (report, events) =
        run_collecting(&orchestrator(100), fragments, CancellationToken::new()).await;

    assert_eq!(report.state, BatchState::Failed);
    assert_eq!(events.len(), 1);
    match &events[0] {
        BatchEvent::Error { message } => assert!(message.contains("disk unplugged")),
        other => panic!("expected an error event, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_records_are_skipped() {
    let fragments = vec![
        Ok("+1 773 776 5277".to_owned()),
        Err(SourceError::MalformedRecord { position: 2, reason: "bad utf-8".to_owned() }),
        Ok("800 555 0199".to_owned()),
    ];
    let (report, events) =
        run_collecting(&orchestrator(100), fragments, CancellationToken::new()).await;

    assert_eq!(report.state, BatchState::Completed);
    assert_eq!(report.progress.total_count, 2);
    assert!(matches!(events.last(), Some(BatchEvent::Result { count: 2, .. })));
}

#[tokio::test]
async fn cancelled_before_start_sends_nothing() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let (report, events) = run_collecting(&orchestrator(100), numbered_fragments(50), cancel).await;

    assert_eq!(report.state, BatchState::Cancelled);
    assert!(events.is_empty());
}

#[tokio::test]
async fn cancel_during_pause_stops_the_batch() {
    init_logger();
    let orchestrator = BatchOrchestrator::new(
        PlusIsValid,
        BatchConfig { chunk_size: 10, chunk_pause: Duration::from_secs(30), ..Default::default() },
    );
    let cancel = CancellationToken::new();
    let (events, mut receiver) = mpsc::channel(1);

    let consumer_cancel = cancel.clone();
    let consume = async move {
        let mut received = Vec::new();
        while let Some(event) = receiver.recv().await {
            received.push(event);
            consumer_cancel.cancel();
        }
        received
    };
    let (report, received) = tokio::join!(
        orchestrator.run(numbered_fragments(100).into_iter(), events, cancel),
        consume
    );

    assert_eq!(report.state, BatchState::Cancelled);
    assert_eq!(report.progress.processed_count, 10);
    assert_eq!(progress_of(&received), vec![(10, 100, 10)]);
}

#[tokio::test]
async fn dropped_receiver_cancels() {
    let (events, receiver) = mpsc::channel(1);
    drop(receiver);

    let report = orchestrator(100)
        .run(numbered_fragments(20).into_iter(), events, CancellationToken::new())
        .await;
    assert_eq!(report.state, BatchState::Cancelled);
    assert_eq!(report.progress.processed_count, 0);
}

#[tokio::test]
async fn zero_chunk_size_is_clamped() {
    let orchestrator = orchestrator(0);
    assert_eq!(orchestrator.config().chunk_size, 1);

    let (report, events) =
        run_collecting(&orchestrator, numbered_fragments(3), CancellationToken::new()).await;
    assert_eq!(report.state, BatchState::Completed);
    assert_eq!(progress_of(&events).len(), 3);
}
