//! Criterion benchmarks for the character translation table.
//!
//! Text synthesis calls [`char_to_keystroke`] once per character on the
//! injection hot path, so the lookup must stay in the sub-microsecond class.
//!
//! Run with:
//! ```bash
//! cargo bench --package displayd-core --bench keymap_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use displayd_core::keymap::char_to_keystroke;

/// Characters covering the main table branches: letters, shifted letters,
/// digits, plain punctuation, shifted punctuation, whitespace, unmapped.
const BENCH_CHARS: &[char] = &[
    'a', 'z', 'A', 'Z', '0', '9', ' ', '\n', '\t', ',', '.', '/', '!', '@', '(', ')', '_', '?',
    '~', 'é',
];

fn bench_char_to_keystroke(c: &mut Criterion) {
    c.bench_function("char_to_keystroke/mixed", |b| {
        b.iter(|| {
            for &ch in BENCH_CHARS {
                black_box(char_to_keystroke(black_box(ch)));
            }
        })
    });

    c.bench_function("char_to_keystroke/ascii_sweep", |b| {
        b.iter(|| {
            for byte in 0x20u8..0x7F {
                black_box(char_to_keystroke(black_box(byte as char)));
            }
        })
    });
}

criterion_group!(benches, bench_char_to_keystroke);
criterion_main!(benches);
