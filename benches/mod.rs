use criterion::{criterion_group, criterion_main};

mod network;

criterion_group!(
    benches,
    network::application::mqtt::codec::bench_remaining_length,
    network::application::mqtt::codec::bench_builders,
    network::application::mqtt::codec::bench_framer,
    network::application::mqtt::client::bench_publish,
    network::application::mqtt::client::bench_poll
);
criterion_main!(benches);
