use criterion::{BenchmarkId, Criterion, Throughput};
use libmqisdp::network::application::mqtt::Framer;
use libmqisdp::network::application::mqtt::packet::{
    build_connect, build_publish, build_subscribe,
};
use libmqisdp::network::application::mqtt::varint::{
    decode_remaining_length, encode_remaining_length,
};
use std::hint::black_box;

const LENGTHS: [u32; 4] = [127, 16_383, 2_097_151, 268_435_455];

pub fn bench_remaining_length(c: &mut Criterion) {
    let mut group = c.benchmark_group("remaining_length");
    for value in LENGTHS {
        group.bench_with_input(BenchmarkId::new("encode", value), &value, |b, &value| {
            b.iter(|| encode_remaining_length(black_box(value)).expect("encodable"));
        });

        let mut header = vec![0x30];
        header.extend_from_slice(&encode_remaining_length(value).expect("encodable"));
        group.bench_with_input(BenchmarkId::new("decode", value), &header, |b, header| {
            b.iter(|| decode_remaining_length(black_box(header), 1).expect("decodable"));
        });
    }
    group.finish();
}

pub fn bench_builders(c: &mut Criterion) {
    let mut group = c.benchmark_group("builders");
    group.bench_function("connect", |b| {
        b.iter(|| build_connect(black_box("myMQTT-42"), 15, true).expect("fits"));
    });
    group.bench_function("subscribe", |b| {
        b.iter(|| build_subscribe(black_box(10), black_box("random/")).expect("fits"));
    });

    for size in [16usize, 256, 1024] {
        let payload = vec![0x5A; size];
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("publish", size), &payload, |b, payload| {
            b.iter(|| build_publish(black_box("random/"), black_box(payload)).expect("fits"));
        });
    }
    group.finish();
}

pub fn bench_framer(c: &mut Criterion) {
    let publish = build_publish("random/", &[0x42; 200]).expect("fits");
    let stream: Vec<u8> = publish.iter().copied().cycle().take(publish.len() * 8).collect();

    let mut group = c.benchmark_group("framer");
    group.throughput(Throughput::Bytes(stream.len() as u64));
    for chunk in [1usize, 64, 256] {
        group.bench_with_input(BenchmarkId::new("reassemble", chunk), &chunk, |b, &chunk| {
            b.iter(|| {
                let mut framer = Framer::new();
                let mut frames = 0;
                for piece in stream.chunks(chunk) {
                    framer.push(piece).expect("room");
                    while framer.next_frame().expect("well formed").is_some() {
                        frames += 1;
                    }
                }
                assert_eq!(frames, 8);
            });
        });
    }
    group.finish();
}
