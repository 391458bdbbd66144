#![allow(clippy::unwrap_used)]

use std::hint::black_box;

use divan::Bencher;
use dynbuf_buffer::Buffer;

fn main() {
    divan::main();
}

const CHUNK: &[u8] = b"0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

#[divan::bench(args = [1, 100, 1_000, 100_000])]
fn append(bencher: Bencher, n: usize) {
    bencher.bench_local(|| {
        let mut buf = Buffer::new();
        for _ in 0..n {
            buf.append(black_box(CHUNK)).unwrap();
        }
        buf
    });
}

#[divan::bench(args = [1, 100, 1_000, 100_000])]
fn append_vec(bencher: Bencher, n: usize) {
    bencher.bench_local(|| {
        let mut buf = Vec::new();
        for _ in 0..n {
            buf.extend_from_slice(black_box(CHUNK));
        }
        buf
    });
}

// A streaming reader: append a chunk, consume most of it from the front.
#[divan::bench(args = [100, 10_000])]
fn append_then_skip(bencher: Bencher, n: usize) {
    bencher.bench_local(|| {
        let mut buf = Buffer::with_capacity(4 * CHUNK.len()).unwrap();
        for _ in 0..n {
            buf.append(black_box(CHUNK)).unwrap();
            buf.skip(CHUNK.len() - 3);
        }
        buf
    });
}

#[divan::bench(args = [100, 10_000])]
fn append_then_drain_vec(bencher: Bencher, n: usize) {
    bencher.bench_local(|| {
        let mut buf = Vec::with_capacity(4 * CHUNK.len());
        for _ in 0..n {
            buf.extend_from_slice(black_box(CHUNK));
            buf.drain(..CHUNK.len() - 3);
        }
        buf
    });
}

#[divan::bench(args = [10, 1_000])]
fn append_fmt(bencher: Bencher, n: usize) {
    bencher.bench_local(|| {
        let mut buf = Buffer::new();
        for i in 0..n {
            dynbuf_buffer::buffer_fmt!(buf, "{}:{}\n", i, black_box("value")).unwrap();
        }
        buf
    });
}
