//! Dispatches tool calls from a streamed JSON array as soon as each one is
//! complete, without waiting for the rest of the response.
//!
//! The chunks below mimic what a model API delivers: fragments cut at
//! arbitrary points, including inside strings and multi-byte characters.
//! With `stream_array` enabled every element of the root array is emitted
//! the moment its closing brace arrives.
//!
//! Run with
//!
//! ```bash
//! cargo run -p jsonflow --example tool_call_stream
//! ```

#![allow(clippy::needless_raw_string_hashes)]

use futures::{executor::block_on, stream, StreamExt};
use jsonflow::{Node, NodeStream, ProcessorOptions};

fn dispatch(call: &Node) -> String {
    let name = call.get("name").and_then(Node::as_str).unwrap_or("<unnamed>");
    let args = call.get("arguments");
    match name {
        "get_weather" => {
            let city = args.and_then(|a| a.get("city")).and_then(Node::as_str);
            format!("weather lookup for {}", city.unwrap_or("?"))
        }
        "convert" => {
            let amount = args.and_then(|a| a.get("amount")).and_then(Node::as_f64);
            format!("currency conversion of {}", amount.unwrap_or_default())
        }
        other => format!("no handler for {other:?}"),
    }
}

fn main() {
    let chunks: [&[u8]; 5] = [
        br#"[{"name":"get_wea"#,
        // 'ü' is split between these two chunks
        b"ther\",\"arguments\":{\"city\":\"Z\xC3",
        b"\xBCrich\"}},{\"name\":\"conv",
        br#"ert","arguments":{"amount":12.5,"from":"EUR","to":"CHF"}}"#,
        br#",{"name":"translate","arguments":{}}]"#,
    ];
    let chunks = chunks.map(Ok::<_, std::io::Error>);

    let options = ProcessorOptions {
        stream_array: true,
        ..Default::default()
    };
    let mut calls = NodeStream::new(stream::iter(chunks), options);

    block_on(async {
        while let Some(call) = calls.next().await {
            match call {
                Ok(call) => println!("{}", dispatch(&call)),
                Err(err) => {
                    eprintln!("stream failed: {err}");
                    break;
                }
            }
        }
    });
}
