#![expect(missing_docs)]
#![allow(clippy::needless_raw_string_hashes)]

mod common;

use core::fmt::Write;

use common::STREAM;
use jsonflow::{Collector, JsonProcessor, Node, ProcessorOptions, PullSignal, Signal};

/// Drives a processor with unbounded demand and renders every signal next to
/// the index of the chunk whose delivery produced it.
fn render_signals(stream: &[&str], options: ProcessorOptions) -> String {
    let mut p = JsonProcessor::new(Collector::default(), PullSignal::default(), options);
    p.request(u64::MAX);

    let mut out = String::new();
    let mut render = |p: &mut JsonProcessor<Collector, PullSignal>, at: &str| {
        for signal in p.subscriber_mut().drain() {
            match signal {
                Signal::Next(node) => writeln!(out, "{at}: {node:?}").unwrap(),
                Signal::Error(error) => writeln!(out, "{at}: error: {error}").unwrap(),
                Signal::Complete => writeln!(out, "{at}: complete").unwrap(),
            }
        }
    };

    for (i, chunk) in stream.iter().enumerate() {
        if !p.upstream_mut().take_request() {
            break;
        }
        p.on_next(chunk.as_bytes());
        render(&mut p, &i.to_string());
    }
    p.on_complete();
    render(&mut p, "end");
    out
}

fn streaming() -> ProcessorOptions {
    ProcessorOptions {
        stream_array: true,
        ..Default::default()
    }
}

#[test]
fn snapshot_streamed_tool_calls() {
    insta::assert_snapshot!(render_signals(&STREAM, streaming()), @r#"
    3: Object({"id": String("call_1"), "name": String("search"), "arguments": Object({"query": String("rust json"), "limit": Int(5)})})
    7: Object({"id": String("call_2"), "name": String("fetch"), "arguments": Object({"url": String("https://example.com/a?b=c"), "headers": Object({"accept": String("text/html")}), "retries": Null})})
    11: Object({"id": String("call_3"), "name": String("summarize"), "arguments": Object({"text": String("café ☕"), "ratio": Float(0.25), "bullets": Array([Bool(true), Bool(false)]), "sections": Array([Array([String("intro")]), Array([])])})})
    12: complete
    "#);
}

#[test]
fn snapshot_whole_root() {
    insta::assert_snapshot!(render_signals(&STREAM, ProcessorOptions::default()), @r#"
    12: Array([Object({"id": String("call_1"), "name": String("search"), "arguments": Object({"query": String("rust json"), "limit": Int(5)})}), Object({"id": String("call_2"), "name": String("fetch"), "arguments": Object({"url": String("https://example.com/a?b=c"), "headers": Object({"accept": String("text/html")}), "retries": Null})}), Object({"id": String("call_3"), "name": String("summarize"), "arguments": Object({"text": String("café ☕"), "ratio": Float(0.25), "bullets": Array([Bool(true), Bool(false)]), "sections": Array([Array([String("intro")]), Array([])])})})])
    end: complete
    "#);
}

#[test]
fn streamed_elements_match_whole_root() {
    let streamed = jsonflow::parse_chunks(STREAM, streaming()).unwrap();
    let whole = jsonflow::parse_chunks(STREAM, ProcessorOptions::default()).unwrap();

    assert_eq!(whole, vec![Node::Array(streamed)]);
}

#[test]
fn snapshot_truncated_stream() {
    insta::assert_snapshot!(render_signals(&STREAM[..6], streaming()), @r#"
    3: Object({"id": String("call_1"), "name": String("search"), "arguments": Object({"query": String("rust json"), "limit": Int(5)})})
    end: error: unexpected end-of-input at 1:187: JSON value left unclosed
    "#);
}

#[test]
fn snapshot_corrupted_literal() {
    let mut stream = STREAM;
    stream[6] = r#","retries":nx"#;

    insta::assert_snapshot!(render_signals(&stream, streaming()), @r#"
    3: Object({"id": String("call_1"), "name": String("search"), "arguments": Object({"query": String("rust json"), "limit": Int(5)})})
    6: error: invalid character "x" at 1:199
    "#);
}
