use core::time::Duration;

use rstest::*;

use crate::{
    Collector, DuplicateKeys, Error, ErrorKind, JsonProcessor, Location, Node, ProcessorOptions,
    ProcessorState, ProtocolViolation, PullSignal, Signal, StructureError, TokenKind,
};

type Processor = JsonProcessor<Collector, PullSignal>;

fn processor(options: ProcessorOptions) -> Processor {
    JsonProcessor::new(Collector::default(), PullSignal::default(), options)
}

fn streaming() -> Processor {
    processor(ProcessorOptions {
        stream_array: true,
        ..Default::default()
    })
}

/// Delivers a chunk the processor asked for.
fn feed(p: &mut Processor, chunk: &[u8]) {
    assert!(p.upstream_mut().take_request(), "chunk was not requested");
    p.on_next(chunk);
}

fn values(p: &mut Processor) -> Vec<Node> {
    let mut out = Vec::new();
    while let Some(Signal::Next(node)) = p.subscriber_mut().pop() {
        out.push(node);
    }
    out
}

/// Pops every queued signal and splits it into values and the terminal
/// signal, if one arrived.
fn outcome(p: &mut Processor) -> (Vec<Node>, Option<Result<(), Error>>) {
    let mut nodes = Vec::new();
    let mut terminal = None;
    for signal in p.subscriber_mut().drain() {
        match signal {
            Signal::Next(node) => {
                assert!(terminal.is_none(), "value after terminal signal");
                nodes.push(node);
            }
            Signal::Error(error) => {
                assert!(terminal.is_none(), "second terminal signal");
                terminal = Some(Err(error));
            }
            Signal::Complete => {
                assert!(terminal.is_none(), "second terminal signal");
                terminal = Some(Ok(()));
            }
        }
    }
    (nodes, terminal)
}

fn ints(values: &[i64]) -> Vec<Node> {
    values.iter().copied().map(Node::Int).collect()
}

// ─────────────────────────────────────────────────────────────────────
// Emission
// ─────────────────────────────────────────────────────────────────────

#[rstest]
#[timeout(Duration::from_millis(1_000))]
fn streaming_decomposes_root_array() {
    let mut p = streaming();
    p.request(u64::MAX);
    feed(&mut p, b"[1,2,3]");

    let (nodes, terminal) = outcome(&mut p);
    assert_eq!(nodes, ints(&[1, 2, 3]));
    assert!(matches!(terminal, Some(Ok(()))));
    assert!(p.upstream().is_cancelled());
    assert_eq!(p.state(), ProcessorState::Completed);
}

#[rstest]
#[timeout(Duration::from_millis(1_000))]
fn default_mode_emits_root_once() {
    let mut p = processor(ProcessorOptions::default());
    p.request(u64::MAX);
    feed(&mut p, b"[1,2,3]");

    let (nodes, terminal) = outcome(&mut p);
    assert_eq!(nodes, vec![Node::Array(ints(&[1, 2, 3]))]);
    assert!(terminal.is_none());

    assert!(p.upstream_mut().take_request());
    p.on_complete();
    let (nodes, terminal) = outcome(&mut p);
    assert!(nodes.is_empty());
    assert!(matches!(terminal, Some(Ok(()))));
    assert!(!p.upstream().is_cancelled());
}

#[test]
fn streamed_elements_may_be_containers() {
    let mut p = streaming();
    p.request(u64::MAX);
    feed(&mut p, br#"[{"id":1,"tags":["a"]},"#);
    feed(&mut p, br#"[true],"x",null]"#);

    let (nodes, terminal) = outcome(&mut p);
    let first: Node = [
        ("id", Node::Int(1)),
        ("tags", Node::from_iter([Node::from("a")])),
    ]
    .into_iter()
    .collect();
    assert_eq!(
        nodes,
        vec![
            first,
            Node::from_iter([Node::Bool(true)]),
            Node::from("x"),
            Node::Null,
        ]
    );
    assert!(matches!(terminal, Some(Ok(()))));
}

#[test]
fn streaming_object_root_is_emitted_whole() {
    let mut p = streaming();
    p.request(u64::MAX);
    feed(&mut p, br#"{"items":[1,2]}"#);

    let (nodes, _) = outcome(&mut p);
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].get("items"), Some(&Node::Array(ints(&[1, 2]))));
    assert!(!p.upstream().is_cancelled());
}

#[test]
fn utf8_split_anywhere() {
    let src = "[\"na\u{ef}ve \u{1F600}\"]".as_bytes();
    for split in 1..src.len() {
        let mut p = processor(ProcessorOptions::default());
        p.request(u64::MAX);
        feed(&mut p, &src[..split]);
        feed(&mut p, &src[split..]);
        let (nodes, _) = outcome(&mut p);
        assert_eq!(
            nodes,
            vec![Node::from_iter([Node::from("na\u{ef}ve \u{1F600}")])],
            "split at {split}"
        );
    }
}

#[test]
fn several_values_in_one_chunk() {
    let mut p = processor(ProcessorOptions::default());
    p.request(u64::MAX);
    feed(&mut p, b"{} [] {\"a\":null}");

    let (nodes, _) = outcome(&mut p);
    assert_eq!(nodes.len(), 3);
    assert_eq!(nodes[2].get("a"), Some(&Node::Null));
}

// ─────────────────────────────────────────────────────────────────────
// Demand
// ─────────────────────────────────────────────────────────────────────

#[test]
fn starts_idle_and_waits_for_demand() {
    let mut p = processor(ProcessorOptions::default());
    assert_eq!(p.state(), ProcessorState::Idle);
    assert_eq!(p.upstream().requests(), 0);

    p.request(1);
    assert_eq!(p.state(), ProcessorState::AwaitingUpstream);
    assert_eq!(p.upstream().wanted(), 1);
    assert!(p.is_awaiting_upstream());
}

#[test]
fn never_emits_beyond_demand() {
    let mut p = processor(ProcessorOptions::default());
    p.request(1);
    feed(&mut p, br#"{"a":1}{"b":2}"#);

    assert_eq!(values(&mut p).len(), 1);
    assert!(p.has_pending());
    assert_eq!(p.state(), ProcessorState::Buffering);
    assert_eq!(p.upstream().wanted(), 0);

    p.request(1);
    let nodes = values(&mut p);
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].get("b"), Some(&Node::Int(2)));
    assert_eq!(p.demand(), 0);
    assert_eq!(p.state(), ProcessorState::Idle);
    assert_eq!(p.upstream().wanted(), 0);

    p.request(1);
    assert_eq!(p.upstream().wanted(), 1);
}

#[test]
fn requests_chunks_one_at_a_time_while_mid_value() {
    let mut p = processor(ProcessorOptions::default());
    p.request(1);
    p.request(1);
    assert_eq!(p.upstream().wanted(), 1);

    for chunk in [&b"[\"lo"[..], b"ng str", b"ing\"", b","] {
        feed(&mut p, chunk);
        assert_eq!(p.upstream().wanted(), 1);
    }
    feed(&mut p, b"1]");
    assert_eq!(values(&mut p).len(), 1);
    assert_eq!(p.upstream().requests(), 6);
}

#[test]
fn completes_value_without_demand_once_started() {
    let mut p = processor(ProcessorOptions::default());
    p.request(1);
    feed(&mut p, b"[1");
    assert_eq!(p.upstream().wanted(), 1);

    feed(&mut p, b"]{\"next\":");
    assert_eq!(values(&mut p).len(), 1);
    assert_eq!(p.demand(), 0);
    // The second value is half read, so input is still requested.
    assert_eq!(p.upstream().wanted(), 1);

    feed(&mut p, b"1}");
    assert!(p.has_pending());
    assert_eq!(p.upstream().wanted(), 0);
}

#[test]
fn upstream_completion_waits_for_pending_value() {
    let mut p = processor(ProcessorOptions::default());
    p.request(1);
    feed(&mut p, b"[1] [2]");
    p.on_complete();

    let (nodes, terminal) = outcome(&mut p);
    assert_eq!(nodes.len(), 1);
    assert!(terminal.is_none());
    assert_eq!(p.state(), ProcessorState::Buffering);

    p.request(1);
    let (nodes, terminal) = outcome(&mut p);
    assert_eq!(nodes, vec![Node::Array(ints(&[2]))]);
    assert!(matches!(terminal, Some(Ok(()))));
}

#[test]
fn streamed_root_close_waits_for_pending_element() {
    let mut p = streaming();
    p.request(1);
    feed(&mut p, b"[1,2]");
    assert_eq!(values(&mut p), ints(&[1]));
    assert!(!p.upstream().is_cancelled());

    p.request(1);
    let (nodes, terminal) = outcome(&mut p);
    assert_eq!(nodes, ints(&[2]));
    assert!(matches!(terminal, Some(Ok(()))));
    assert!(p.upstream().is_cancelled());
}

#[test]
fn unbounded_demand_is_sticky() {
    let mut p = processor(ProcessorOptions::default());
    p.request(u64::MAX - 1);
    p.request(5);
    feed(&mut p, b"[] [] []");
    assert_eq!(values(&mut p).len(), 3);
    assert_eq!(p.demand(), u64::MAX);
}

// ─────────────────────────────────────────────────────────────────────
// Termination
// ─────────────────────────────────────────────────────────────────────

#[test]
fn truncated_input() {
    let mut p = processor(ProcessorOptions::default());
    p.request(u64::MAX);
    feed(&mut p, br#"{"a":1"#);
    p.on_complete();

    let (nodes, terminal) = outcome(&mut p);
    assert!(nodes.is_empty());
    let Some(Err(error)) = terminal else {
        panic!("expected an error");
    };
    assert_eq!(error.kind(), ErrorKind::TruncatedInput);
    assert!(error.is_truncated());
    assert!(matches!(
        error,
        Error::TruncatedInput {
            location: Location { line: 1, column: 7 }
        }
    ));
    assert_eq!(p.state(), ProcessorState::Failed);
}

#[test]
fn truncated_inside_token() {
    let mut p = processor(ProcessorOptions::default());
    p.request(u64::MAX);
    feed(&mut p, b"[1] \"unterminated");
    p.on_complete();

    let (nodes, terminal) = outcome(&mut p);
    assert_eq!(nodes.len(), 1);
    assert!(matches!(terminal, Some(Err(Error::TruncatedInput { .. }))));
}

#[test]
fn empty_input_completes() {
    let mut p = processor(ProcessorOptions::default());
    p.request(1);
    feed(&mut p, b"  \n");
    p.on_complete();

    let (nodes, terminal) = outcome(&mut p);
    assert!(nodes.is_empty());
    assert!(matches!(terminal, Some(Ok(()))));
}

#[test]
fn malformed_structure_on_bare_close() {
    let mut p = processor(ProcessorOptions::default());
    p.request(u64::MAX);
    feed(&mut p, b"]");

    let (nodes, terminal) = outcome(&mut p);
    assert!(nodes.is_empty());
    let Some(Err(error)) = terminal else {
        panic!("expected an error");
    };
    assert_eq!(error.kind(), ErrorKind::MalformedStructure);
    assert!(matches!(
        error,
        Error::MalformedStructure {
            source: StructureError::UnexpectedAtTopLevel(TokenKind::EndArray),
            ..
        }
    ));
    assert_eq!(
        error.to_string(),
        "malformed JSON structure: unexpected end of array at top level at 1:2"
    );
    assert!(p.upstream().is_cancelled());
}

#[test]
fn malformed_structure_keeps_earlier_values() {
    let mut p = processor(ProcessorOptions::default());
    p.request(u64::MAX);
    feed(&mut p, b"[1] 2");
    feed(&mut p, b" ");

    let (nodes, terminal) = outcome(&mut p);
    assert_eq!(nodes, vec![Node::Array(ints(&[1]))]);
    assert!(matches!(
        terminal,
        Some(Err(Error::MalformedStructure {
            source: StructureError::UnexpectedAtTopLevel(TokenKind::Int),
            ..
        }))
    ));
}

#[test]
fn duplicate_keys_rejected() {
    let mut p = processor(ProcessorOptions {
        duplicate_keys: DuplicateKeys::Reject,
        ..Default::default()
    });
    p.request(u64::MAX);
    feed(&mut p, br#"{"a":1,"a":2}"#);

    let (_, terminal) = outcome(&mut p);
    assert!(matches!(
        terminal,
        Some(Err(Error::MalformedStructure {
            source: StructureError::DuplicateKey(ref key),
            ..
        })) if key == "a"
    ));
}

#[test]
fn syntax_error_is_passed_through() {
    let mut p = processor(ProcessorOptions::default());
    p.request(u64::MAX);
    feed(&mut p, b"[1,\n ?]");

    let (_, terminal) = outcome(&mut p);
    let Some(Err(Error::Syntax(error))) = terminal else {
        panic!("expected a syntax error");
    };
    assert_eq!(error.location, Location { line: 2, column: 2 });
}

#[test]
fn upstream_error_drops_pending_value() {
    let mut p = processor(ProcessorOptions::default());
    p.request(1);
    feed(&mut p, b"{}{}");
    p.on_error(std::io::Error::other("connection reset"));

    let (nodes, terminal) = outcome(&mut p);
    assert_eq!(nodes.len(), 1);
    let Some(Err(error)) = terminal else {
        panic!("expected an error");
    };
    assert_eq!(error.kind(), ErrorKind::Upstream);
    assert_eq!(error.to_string(), "upstream failed: connection reset");
    assert!(!p.upstream().is_cancelled());
}

#[test]
fn cancellation_stops_everything() {
    let mut p = processor(ProcessorOptions::default());
    p.request(1);
    feed(&mut p, b"{}[1,");
    assert_eq!(values(&mut p).len(), 1);

    p.cancel();
    assert_eq!(p.state(), ProcessorState::Cancelled);
    assert!(p.upstream().is_cancelled());
    assert!(!p.upstream_mut().take_request());

    // Late signals are ignored.
    p.on_next(b"2]");
    p.request(10);
    p.on_complete();
    p.on_error(std::io::Error::other("late"));

    let (nodes, terminal) = outcome(&mut p);
    assert!(nodes.is_empty());
    assert!(terminal.is_none());
    assert_eq!(p.state(), ProcessorState::Cancelled);
}

#[test]
fn cancellation_discards_pending_value() {
    let mut p = processor(ProcessorOptions::default());
    p.request(1);
    feed(&mut p, b"[1][2]");
    assert!(p.has_pending());
    let _ = values(&mut p);

    p.cancel();
    p.request(1);
    assert!(p.subscriber().is_empty());
}

// ─────────────────────────────────────────────────────────────────────
// Protocol violations
// ─────────────────────────────────────────────────────────────────────

#[test]
fn zero_demand_is_rejected() {
    let mut p = processor(ProcessorOptions::default());
    p.request(0);

    let (_, terminal) = outcome(&mut p);
    assert!(matches!(
        terminal,
        Some(Err(Error::Protocol(ProtocolViolation::ZeroDemand)))
    ));
    assert!(p.upstream().is_cancelled());
}

#[test]
fn unrequested_chunk_is_rejected() {
    let mut p = processor(ProcessorOptions::default());
    p.on_next(b"[]");

    let (nodes, terminal) = outcome(&mut p);
    assert!(nodes.is_empty());
    assert!(matches!(
        terminal,
        Some(Err(Error::Protocol(ProtocolViolation::UnrequestedChunk)))
    ));
}

#[test]
fn signals_after_completion_are_ignored() {
    let mut p = processor(ProcessorOptions::default());
    p.request(u64::MAX);
    feed(&mut p, b"[]");
    p.on_complete();
    p.on_next(b"[]");
    p.on_complete();
    p.request(0);

    let (nodes, terminal) = outcome(&mut p);
    assert_eq!(nodes.len(), 1);
    assert!(matches!(terminal, Some(Ok(()))));
    assert!(p.subscriber().is_terminated());
}
