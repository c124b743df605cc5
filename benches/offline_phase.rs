use divan;
use frodo_pir::{client, server, Prng, SEED_BYTE_LEN};
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

#[divan::bench(args = ARGS, max_time = Duration::from_secs(300), skip_ext_time = true)]
fn server_setup(bencher: divan::Bencher, db_config: &DBConfig) {
    let mut rng = ChaCha8Rng::from_os_rng();

    let db_bytes = generate_random_db_bytes(&mut rng, db_config.db_entry_count, db_config.db_entry_byte_len);

    let mut seed_μ = [0u8; SEED_BYTE_LEN];
    rng.fill_bytes(&mut seed_μ);

    bencher.with_inputs(|| (seed_μ, db_bytes.clone())).bench_values(|(seed, db)| {
        server::Server::setup(
            divan::black_box(&seed),
            divan::black_box(&db),
            divan::black_box(db_config.db_entry_count),
            divan::black_box(db_config.db_entry_byte_len),
            divan::black_box(db_config.mat_element_bitlen),
        )
    });
}

#[divan::bench(args = ARGS, max_time = Duration::from_secs(300), skip_ext_time = true)]
fn client_setup(bencher: divan::Bencher, db_config: &DBConfig) {
    let mut rng = ChaCha8Rng::from_os_rng();

    let mut seed_μ = [0u8; SEED_BYTE_LEN];
    rng.fill_bytes(&mut seed_μ);

    // The hint matrix is public and fully determined by the database, any well-sized
    // byte stream exercises the same client setup work.
    let parsed_db_num_cols = (db_config.db_entry_byte_len * 8).div_ceil(db_config.mat_element_bitlen);
    let mut hint_bytes = vec![0u8; frodo_pir::LWE_DIMENSION * parsed_db_num_cols * 4];

    let mut prng = Prng::new(&seed_μ);
    prng.generate(&mut hint_bytes);

    bencher.with_inputs(|| (seed_μ, hint_bytes.clone())).bench_values(|(seed, hint)| {
        client::Client::setup(
            divan::black_box(&seed),
            divan::black_box(&hint),
            divan::black_box(db_config.db_entry_count),
            divan::black_box(db_config.db_entry_byte_len),
            divan::black_box(db_config.mat_element_bitlen),
        )
    });
}
