//! Benchmarks for incremental stream decoding
//!
//! Measures decode throughput for a long answer delivered in chunks of
//! different sizes, and answer assembly.
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use brain_client::answer::AnswerAssembler;
use brain_client::sse::{classify, ChatEvent, EventDecoder};

/// A stream body with a meta event, `tokens` token events and a done event
fn generate_stream_body(tokens: usize) -> String {
    let mut body = String::from(
        "event: meta\ndata: {\"conversation_id\":1,\"citations\":[{\"chunk_id\":\"1\",\
         \"document_id\":1,\"chunk_index\":0,\"text\":\"source text\",\"score\":0.9}]}\n\n",
    );
    for i in 0..tokens {
        body.push_str(&format!("data: token{} é\n\n", i));
    }
    body.push_str("event: done\ndata: {}\n\n");
    body
}

/// Benchmark decoding the same body at different chunk sizes
fn bench_decode_chunked(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_chunked");
    let body = generate_stream_body(2_000);
    group.throughput(Throughput::Bytes(body.len() as u64));

    for chunk_size in [1, 16, 256, 4096].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_bytes", chunk_size)),
            chunk_size,
            |b, &chunk_size| {
                b.iter(|| {
                    let mut decoder = EventDecoder::new();
                    let mut count = 0;
                    for chunk in body.as_bytes().chunks(chunk_size) {
                        count += decoder.decode_chunk(black_box(chunk)).count();
                    }
                    count += decoder.finish().count();
                    black_box(count)
                });
            },
        );
    }

    group.finish();
}

/// Benchmark classification plus assembly of a full answer
fn bench_assemble_answer(c: &mut Criterion) {
    let mut group = c.benchmark_group("assemble_answer");

    for tokens in [100, 1_000, 10_000].iter() {
        let events = EventDecoder::decode_all(generate_stream_body(*tokens).as_bytes());

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_tokens", tokens)),
            &events,
            |b, events| {
                b.iter(|| {
                    let mut answer = AnswerAssembler::new();
                    for event in events.iter().cloned() {
                        if let Some(ChatEvent::Token(token)) = classify(event) {
                            answer.push_token(&token);
                        }
                    }
                    black_box(answer.display().len())
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_decode_chunked, bench_assemble_answer);
criterion_main!(benches);
