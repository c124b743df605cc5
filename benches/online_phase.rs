use divan;
use frodo_pir::{client, server, Csprng, SEED_BYTE_LEN};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

fn main() {
    divan::main();
}

fn generate_random_db_bytes(rng: &mut ChaCha8Rng, db_entry_count: usize, db_entry_byte_len: usize) -> Vec<u8> {
    let mut db_bytes = vec![0u8; db_entry_count * db_entry_byte_len];
    rng.fill_bytes(&mut db_bytes);

    db_bytes
}

fn setup_pir(db_config: &DBConfig) -> (server::Server, client::Client) {
    let mut rng = ChaCha8Rng::from_os_rng();

    let db_bytes = generate_random_db_bytes(&mut rng, db_config.db_entry_count, db_config.db_entry_byte_len);

    let mut seed_μ = [0u8; SEED_BYTE_LEN];
    rng.fill_bytes(&mut seed_μ);

    let (server, hint_bytes) = server::Server::setup(
        &seed_μ,
        &db_bytes,
        db_config.db_entry_count,
        db_config.db_entry_byte_len,
        db_config.mat_element_bitlen,
    )
    .unwrap();
    let client = client::Client::setup(
        &seed_μ,
        &hint_bytes,
        db_config.db_entry_count,
        db_config.db_entry_byte_len,
        db_config.mat_element_bitlen,
    )
    .unwrap();

    (server, client)
}

#[derive(Debug)]
struct DBConfig {
    db_entry_count: usize,
    db_entry_byte_len: usize,
    mat_element_bitlen: usize,
}

const ARGS: &[DBConfig] = &[DBConfig {
    db_entry_count: 1usize << 16,
    db_entry_byte_len: 32,
    mat_element_bitlen: 10,
}];

const QUERIED_DB_ROW_INDEX: usize = 31;

#[divan::bench(args = ARGS, max_time = Duration::from_secs(300), skip_ext_time = true)]
fn client_prepare_query(bencher: divan::Bencher, db_config: &DBConfig) {
    let (_, client) = setup_pir(db_config);

    bencher.with_inputs(|| (client.clone(), Csprng::new().unwrap())).bench_refs(|(client, csprng)| {
        let _ = divan::black_box(&mut *client).prepare_query(divan::black_box(QUERIED_DB_ROW_INDEX), csprng);
    });
}

#[divan::bench(args = ARGS, max_time = Duration::from_secs(300), skip_ext_time = true)]
fn client_query(bencher: divan::Bencher, db_config: &DBConfig) {
    let (_, mut client) = setup_pir(db_config);
    let mut csprng = Csprng::new().unwrap();

    client.prepare_query(QUERIED_DB_ROW_INDEX, &mut csprng).unwrap();

    bencher.with_inputs(|| client.clone()).bench_refs(|client| {
        let _ = divan::black_box(&mut *client).query(divan::black_box(QUERIED_DB_ROW_INDEX));
    });
}

#[divan::bench(args = ARGS, max_time = Duration::from_secs(300), skip_ext_time = true)]
fn server_respond(bencher: divan::Bencher, db_config: &DBConfig) {
    let (server, mut client) = setup_pir(db_config);
    let mut csprng = Csprng::new().unwrap();

    client.prepare_query(QUERIED_DB_ROW_INDEX, &mut csprng).unwrap();
    let query_bytes = client.query(QUERIED_DB_ROW_INDEX).unwrap();

    bencher.bench(|| divan::black_box(&server).respond(divan::black_box(&query_bytes)));
}

#[divan::bench(args = ARGS, max_time = Duration::from_secs(300), skip_ext_time = true)]
fn client_process_response(bencher: divan::Bencher, db_config: &DBConfig) {
    let (server, mut client) = setup_pir(db_config);
    let mut csprng = Csprng::new().unwrap();

    client.prepare_query(QUERIED_DB_ROW_INDEX, &mut csprng).unwrap();
    let query_bytes = client.query(QUERIED_DB_ROW_INDEX).unwrap();
    let response_bytes = server.respond(&query_bytes).unwrap();

    bencher.with_inputs(|| client.clone()).bench_refs(|client| {
        let _ = divan::black_box(&mut *client).process_response(divan::black_box(QUERIED_DB_ROW_INDEX), divan::black_box(&response_bytes));
    });
}
