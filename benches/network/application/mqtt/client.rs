use criterion::{BatchSize, Criterion, Throughput};
use libmqisdp::network::application::mqtt::{Client, Clock, Event, Options};
use libmqisdp::network::{Close, Connection, Read, Write};
use std::collections::VecDeque;

const CONNACK: [u8; 4] = [0x20, 0x02, 0x00, 0x00];

/// In-memory transport: accepts every write, replays queued chunks.
#[derive(Default)]
struct LoopbackConnection {
    inbound: VecDeque<Vec<u8>>,
}

impl Read for LoopbackConnection {
    type Error = ();
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let Some(chunk) = self.inbound.pop_front() else {
            return Ok(0);
        };
        let len = chunk.len().min(buf.len());
        buf[..len].copy_from_slice(&chunk[..len]);
        Ok(len)
    }
}

impl Write for LoopbackConnection {
    type Error = ();
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Close for LoopbackConnection {
    type Error = ();
    fn close(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Connection for LoopbackConnection {}

struct FrozenClock;

impl Clock for FrozenClock {
    fn now_millis(&mut self) -> u64 {
        0
    }
}

fn setup_client() -> Client<'static, LoopbackConnection, FrozenClock> {
    let mut connection = LoopbackConnection::default();
    connection.inbound.push_back(CONNACK.to_vec());
    let mut client = Client::new(connection, Options::new("myMQTT-bench"), FrozenClock);
    client.connect(|_| Ok(())).expect("handshake");
    client
}

pub fn bench_publish(c: &mut Criterion) {
    let mut group = c.benchmark_group("client");
    let payload = br#"{"temperature":74}"#;
    group.throughput(Throughput::Bytes(payload.len() as u64));
    group.bench_function("publish", |b| {
        let mut client = setup_client();
        b.iter(|| client.publish("random/", payload).expect("publish"));
    });
    group.finish();
}

pub fn bench_poll(c: &mut Criterion) {
    let mut group = c.benchmark_group("client");
    let publish = libmqisdp::network::application::mqtt::build_publish("random/", &[0x42; 64])
        .expect("fits")
        .to_vec();
    group.bench_function("poll_inbound_publish", |b| {
        b.iter_batched_ref(
            || {
                let mut client = setup_client();
                client.connection_mut().inbound.push_back(publish.clone());
                client
            },
            |client| match client.poll().expect("poll") {
                Some(Event::Packet(_)) => {}
                other => panic!("unexpected {:?}", other),
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}
