#![no_main]
use arbitrary::Arbitrary;
use jsonflow::{DuplicateKeys, ErrorKind, Node, ProcessorOptions, parse_chunks, split_at_offsets};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    stream_array: bool,
    reject_duplicates: bool,
    offsets: Vec<u16>,
    data: Vec<u8>,
}

fn run(chunks: Vec<&[u8]>, options: ProcessorOptions) -> Result<Vec<Node>, ErrorKind> {
    parse_chunks(chunks, options).map_err(|e| e.kind())
}

// Splitting the input differently must never change what comes out.
// Locations may differ because a fresh tokenizer restarts its count, so only
// error kinds are compared.
fn split_invariance(input: Input) {
    let options = ProcessorOptions {
        stream_array: input.stream_array,
        duplicate_keys: if input.reject_duplicates {
            DuplicateKeys::Reject
        } else {
            DuplicateKeys::LastWins
        },
        ..Default::default()
    };
    let offsets: Vec<usize> = input.offsets.iter().map(|&o| usize::from(o)).collect();

    let whole = run(vec![input.data.as_slice()], options);
    let split = run(split_at_offsets(&input.data, &offsets), options);

    assert_eq!(whole, split, "input: {:?}", String::from_utf8_lossy(&input.data));
}

fuzz_target!(|input: Input| split_invariance(input));
