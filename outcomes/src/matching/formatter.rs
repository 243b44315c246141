//! Human-readable rendering of match failures.
//!
//! Everything here is pure and deterministic: the same mismatch over the same
//! published events always renders the same text.

use crate::{ComparableEvent, StreamId};

use super::{ExecutionResult, Mismatch, PositiveMiss};

/// Renders the diagnostic for one stream's failed chain.
pub fn format_mismatch(
    stream_id: &StreamId,
    published: &[ComparableEvent],
    mismatch: &Mismatch,
) -> String {
    let mut output = String::new();

    match mismatch {
        Mismatch::NoEventsExpected => {
            output.push_str("No events expected.\n");
            output.push_str("Unexpected published event found at [0].\n");
            output.push_str(&format_published(published));
        }
        Mismatch::Positive {
            expected,
            order,
            miss,
        } => {
            output.push_str(&format!("Expected following events {order}:\n"));
            output.push_str(&format_events(expected));
            output.push_str("\n\n");

            if published.is_empty() {
                output.push_str(&format!(
                    "No events were published to the stream '{stream_id}'.\n"
                ));
            } else {
                output.push_str(&positive_locus(miss));
                output.push('\n');
                output.push_str(&format_published(published));
            }
        }
        Mismatch::Negative {
            exclusions,
            unexpected_at,
        } => {
            let plural = if *exclusions == 1 { "" } else { "s" };
            output.push_str(&format!(
                "Expected not to find any event matching {exclusions} specified rule{plural}.\n\n"
            ));
            output.push_str(&format!(
                "Unexpected published event found at [{unexpected_at}].\n"
            ));
            output.push_str(&format_published(published));
        }
    }

    output
}

/// Renders the combined report over every stream's result.
///
/// `streams_with_events` lists the streams that actually received events,
/// which helps spot expectations declared against the wrong stream.
pub fn format_report<'a>(
    results: &[ExecutionResult],
    streams_with_events: impl IntoIterator<Item = &'a StreamId>,
    separator_width: usize,
) -> String {
    let separator = "-".repeat(separator_width);
    let mut output = String::new();

    for result in results {
        output.push_str(&format!("{separator}\n"));
        output.push_str(&format!("RESULT FOR STREAM: {}\n\n", result.stream_id()));
        match result.error_message() {
            None => output.push_str("OK\n\n"),
            Some(message) => {
                output.push_str(message);
                output.push('\n');
            }
        }
    }

    output.push_str(&format!("{separator}\n"));
    let mut streams = streams_with_events.into_iter().peekable();
    if streams.peek().is_none() {
        output.push_str("No events were published to any stream.\n");
    } else {
        output.push_str("Events were published to the following streams:\n");
        for stream_id in streams {
            output.push_str(&format!("- {stream_id}\n"));
        }
    }
    output.push_str(&format!("{separator}\n"));

    output
}

/// Renders the published-events dump that closes every diagnostic.
pub fn format_published(published: &[ComparableEvent]) -> String {
    format!("Published events:\n{}\n", format_events(published))
}

fn format_events(events: &[ComparableEvent]) -> String {
    events
        .iter()
        .enumerate()
        .map(|(ix, event)| format!("{ix}. [{}]\n{}", event.type_tag(), event.content()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn positive_locus(miss: &PositiveMiss) -> String {
    match *miss {
        PositiveMiss::ExpectedNotFound(index) => format!("Expected event [{index}] not found."),
        PositiveMiss::UnexpectedAt(index) => {
            format!("Unexpected published event found at [{index}].")
        }
        PositiveMiss::SeriesNotFound { from, to } => {
            format!("Expected series of events not found in range [{from}..{to}].")
        }
        PositiveMiss::TrailingEvents { from, to } if from == to => {
            format!("Unexpected published event found at [{from}].")
        }
        PositiveMiss::TrailingEvents { from, to } => {
            format!("Unexpected published events found in range [{from}..{to}].")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MatchOrder;

    fn first(v: i64) -> ComparableEvent {
        ComparableEvent::new("First", format!(r#"{{"v":{v}}}"#))
    }

    fn second(v: &str) -> ComparableEvent {
        ComparableEvent::new("Second", format!(r#"{{"v":"{v}"}}"#))
    }

    fn stream() -> StreamId {
        StreamId::new("stream-1")
    }

    fn positive(expected: Vec<ComparableEvent>, order: MatchOrder, miss: PositiveMiss) -> Mismatch {
        Mismatch::Positive {
            expected,
            order,
            miss,
        }
    }

    #[test]
    fn positive_unexpected_at() {
        let published = [second("abc123"), first(1)];
        let mismatch = positive(
            vec![first(1), second("abc123")],
            MatchOrder::InOrder,
            PositiveMiss::UnexpectedAt(0),
        );

        let text = format_mismatch(&stream(), &published, &mismatch);
        assert_eq!(
            text,
            "Expected following events in specified order:\n\
             0. [First]\n{\"v\":1}\n\
             1. [Second]\n{\"v\":\"abc123\"}\n\
             \n\
             Unexpected published event found at [0].\n\
             Published events:\n\
             0. [Second]\n{\"v\":\"abc123\"}\n\
             1. [First]\n{\"v\":1}\n"
        );
    }

    #[test]
    fn positive_without_published_events() {
        let mismatch = positive(
            vec![first(1)],
            MatchOrder::InAnyOrder,
            PositiveMiss::ExpectedNotFound(0),
        );

        let text = format_mismatch(&stream(), &[], &mismatch);
        assert_eq!(
            text,
            "Expected following events in any order:\n\
             0. [First]\n{\"v\":1}\n\
             \n\
             No events were published to the stream 'stream-1'.\n"
        );
    }

    #[test]
    fn positive_loci() {
        let published = [first(1), first(2), first(3)];
        let cases = [
            (PositiveMiss::ExpectedNotFound(2), "Expected event [2] not found."),
            (
                PositiveMiss::SeriesNotFound { from: 0, to: 2 },
                "Expected series of events not found in range [0..2].",
            ),
            (
                PositiveMiss::TrailingEvents { from: 1, to: 2 },
                "Unexpected published events found in range [1..2].",
            ),
            (
                PositiveMiss::TrailingEvents { from: 2, to: 2 },
                "Unexpected published event found at [2].",
            ),
        ];

        for (miss, locus) in cases {
            let mismatch = positive(vec![first(1)], MatchOrder::InOrder, miss);
            let text = format_mismatch(&stream(), &published, &mismatch);
            assert!(text.contains(&format!("\n\n{locus}\nPublished events:\n")), "{text}");
        }
    }

    #[test]
    fn negative_pluralizes_rules() {
        let published = [first(8), second("abc")];

        let text = format_mismatch(
            &stream(),
            &published,
            &Mismatch::Negative {
                exclusions: 2,
                unexpected_at: 1,
            },
        );
        assert_eq!(
            text,
            "Expected not to find any event matching 2 specified rules.\n\
             \n\
             Unexpected published event found at [1].\n\
             Published events:\n\
             0. [First]\n{\"v\":8}\n\
             1. [Second]\n{\"v\":\"abc\"}\n"
        );

        let text = format_mismatch(
            &stream(),
            &published,
            &Mismatch::Negative {
                exclusions: 1,
                unexpected_at: 0,
            },
        );
        assert!(text.starts_with("Expected not to find any event matching 1 specified rule.\n"));
    }

    #[test]
    fn no_events_expected() {
        let text = format_mismatch(&stream(), &[first(5)], &Mismatch::NoEventsExpected);
        assert_eq!(
            text,
            "No events expected.\n\
             Unexpected published event found at [0].\n\
             Published events:\n\
             0. [First]\n{\"v\":5}\n"
        );
    }

    #[test]
    fn report_lists_every_stream() {
        let ok = ExecutionResult::succeeded(StreamId::new("a"));
        let failed = ExecutionResult::failed(
            StreamId::new("b"),
            Mismatch::NoEventsExpected,
            "No events expected.\n".to_string(),
        );
        let with_events = [StreamId::new("b")];

        let text = format_report(&[ok, failed], &with_events, 4);
        assert_eq!(
            text,
            "----\n\
             RESULT FOR STREAM: a\n\
             \n\
             OK\n\
             \n\
             ----\n\
             RESULT FOR STREAM: b\n\
             \n\
             No events expected.\n\
             \n\
             ----\n\
             Events were published to the following streams:\n\
             - b\n\
             ----\n"
        );
    }

    #[test]
    fn report_without_any_events() {
        let ok = ExecutionResult::succeeded(StreamId::new("a"));
        let text = format_report(&[ok], std::iter::empty(), 2);
        assert!(text.ends_with("--\nNo events were published to any stream.\n--\n"));
    }
}
