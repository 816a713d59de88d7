/// Split `payload` into `parts` chunks of roughly equal size.
///
/// Boundaries fall on arbitrary bytes, including inside UTF-8 sequences,
/// which is what a network stream may do.
///
/// # Panics
///
/// Panics if `parts` is zero.
#[must_use]
pub fn produce_chunks(payload: &[u8], parts: usize) -> Vec<&[u8]> {
    assert!(parts > 0);
    let chunk_size = payload.len().div_ceil(parts).max(1);
    payload.chunks(chunk_size).collect()
}

/// Split `payload` at the given byte offsets.
///
/// Offsets may come in any order; duplicates and offsets past the end are
/// ignored, so every split is non-empty.
#[must_use]
pub fn split_at_offsets<'a>(payload: &'a [u8], offsets: &[usize]) -> Vec<&'a [u8]> {
    let mut cuts: Vec<usize> = offsets
        .iter()
        .copied()
        .filter(|&o| o > 0 && o < payload.len())
        .collect();
    cuts.sort_unstable();
    cuts.dedup();

    let mut chunks = Vec::with_capacity(cuts.len() + 1);
    let mut start = 0;
    for cut in cuts {
        chunks.push(&payload[start..cut]);
        start = cut;
    }
    if start < payload.len() {
        chunks.push(&payload[start..]);
    }
    chunks
}
