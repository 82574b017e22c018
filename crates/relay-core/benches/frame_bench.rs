//! Criterion benchmarks for the stdio frame codec and event decoding.
//!
//! Run with:
//! ```bash
//! cargo bench --package mouse-relay-core --bench frame_bench
//! ```

use std::io::Cursor;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mouse_relay_core::device::RecordingMouse;
use mouse_relay_core::protocol::frame::{encode_frame, read_frame, write_frame};
use mouse_relay_core::{Dispatcher, Event, ScrollDivisor};

const MOVE_ENVELOPE: &[u8] = br#"{"type":"MOUSE_EVENT","event":{"type":"move","dx":3.5,"dy":-1.25}}"#;

fn bench_write_frame(c: &mut Criterion) {
    c.bench_function("write_frame/move", |b| {
        let mut out = Vec::with_capacity(256);
        b.iter(|| {
            out.clear();
            write_frame(&mut out, black_box(MOVE_ENVELOPE)).unwrap();
        });
    });
}

fn bench_read_frame(c: &mut Criterion) {
    let frame = encode_frame(MOVE_ENVELOPE).unwrap();
    c.bench_function("read_frame/move", |b| {
        b.iter(|| {
            let mut cursor = Cursor::new(black_box(frame.as_slice()));
            read_frame(&mut cursor).unwrap()
        });
    });
}

fn bench_decode_and_plan(c: &mut Criterion) {
    let dispatcher = Dispatcher::new(RecordingMouse::new(), ScrollDivisor::default());
    c.bench_function("decode_plan/move", |b| {
        b.iter(|| {
            let event = Event::from_envelope_slice(black_box(MOVE_ENVELOPE)).unwrap();
            dispatcher.plan(&event)
        });
    });
}

criterion_group!(
    benches,
    bench_write_frame,
    bench_read_frame,
    bench_decode_and_plan
);
criterion_main!(benches);
