// This program demonstrates a full run of the FrodoPIR protocol.
// It uses the `frodo-pir` crate to perform the PIR operations.
// The program fills a toy database with random bytes, sets up a PIR server and client,
// then privately retrieves one database row, measuring the time taken by each phase.
// The retrieved row is compared against the original database content at the end.

use frodo_pir::{client::Client, server::Server, Csprng, LWE_DIMENSION, SEED_BYTE_LEN};
use std::time::Instant;

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{:02x}", byte)).collect()
}

fn format_bytes(num_bytes: usize) -> String {
    const SUFFIXES: [&str; 4] = ["B", "KB", "MB", "GB"];

    let mut size = num_bytes as f64;
    let mut suffix_idx = 0;

    while size >= 1024.0 && suffix_idx < (SUFFIXES.len() - 1) {
        size /= 1024.0;
        suffix_idx += 1;
    }

    format!("{:.1}{}", size, SUFFIXES[suffix_idx])
}

fn main() {
    // Parameter setup for instantiating FrodoPIR
    const DB_ENTRY_COUNT: usize = 1usize << 16;
    const DB_ENTRY_BYTE_LEN: usize = 1024;
    const MAT_ELEMENT_BITLEN: usize = 10;

    // Database, query and response byte length
    const PARSED_DB_COLUMN_COUNT: usize = (DB_ENTRY_BYTE_LEN * 8).div_ceil(MAT_ELEMENT_BITLEN);
    const DB_BYTE_LEN: usize = DB_ENTRY_COUNT * DB_ENTRY_BYTE_LEN;
    const HINT_BYTE_LEN: usize = LWE_DIMENSION * PARSED_DB_COLUMN_COUNT * 4;
    const QUERY_BYTE_LEN: usize = DB_ENTRY_COUNT * 4;
    const RESPONSE_BYTE_LEN: usize = PARSED_DB_COLUMN_COUNT * 4;

    println!("FrodoPIR:");
    println!("Number of entries in Index Database  : {}", DB_ENTRY_COUNT);
    println!("Size of each database entry          : {}", format_bytes(DB_ENTRY_BYTE_LEN));
    println!("DB size                              : {}", format_bytes(DB_BYTE_LEN));
    println!("Encoded DB matrix element bit length : {}", MAT_ELEMENT_BITLEN);
    println!("Encoded DB matrix dimension          : {} x {}", DB_ENTRY_COUNT, PARSED_DB_COLUMN_COUNT);
    println!("Seed size                            : {}", format_bytes(SEED_BYTE_LEN));
    println!("Hint download size                   : {}", format_bytes(HINT_BYTE_LEN));
    println!("Query vector size                    : {}", format_bytes(QUERY_BYTE_LEN));
    println!("Response vector size                 : {}", format_bytes(RESPONSE_BYTE_LEN));
    println!();

    let mut csprng = Csprng::new().expect("Entropy source must be available");

    // Sample pseudo random seed
    let mut seed_μ = [0u8; SEED_BYTE_LEN];
    csprng.generate(&mut seed_μ);

    // Fill pseudo random database content
    let mut db_bytes = vec![0u8; DB_BYTE_LEN];
    csprng.generate(&mut db_bytes);

    // Setup the FrodoPIR server
    let begin = Instant::now();
    let (server, hint_bytes) =
        Server::setup(&seed_μ, &db_bytes, DB_ENTRY_COUNT, DB_ENTRY_BYTE_LEN, MAT_ELEMENT_BITLEN).expect("Server setup failed");
    println!("Server setup took                    : {:?}", begin.elapsed());

    // Setup a FrodoPIR client
    let begin = Instant::now();
    let mut client = Client::setup(&seed_μ, &hint_bytes, DB_ENTRY_COUNT, DB_ENTRY_BYTE_LEN, MAT_ELEMENT_BITLEN).expect("Client setup failed");
    println!("Client setup took                    : {:?}", begin.elapsed());

    // We will enquire server about the content of this database row
    const TO_BE_QUERIED_DB_ROW_INDEX: usize = 31;

    // Client preprocesses a query, keeps it cached for now; to be used when enquiring content of specified row of the database
    let begin = Instant::now();
    client.prepare_query(TO_BE_QUERIED_DB_ROW_INDEX, &mut csprng).expect("Query preparation failed");
    println!("Query preparation took               : {:?}", begin.elapsed());

    // Client wants to query content of specific database row, for which we've already a query partially prepared
    let begin = Instant::now();
    let query_bytes = client.query(TO_BE_QUERIED_DB_ROW_INDEX).expect("Query finalization failed");
    println!("Query finalization took              : {:?}", begin.elapsed());

    // Query reaches FrodoPIR server, it responds back
    let begin = Instant::now();
    let response_bytes = server.respond(&query_bytes).expect("Server failed to respond");
    println!("Server response took                 : {:?}", begin.elapsed());

    // Response reaches FrodoPIR client, decodes it, obtains database row content
    let begin = Instant::now();
    let obtained_db_row_bytes = client.process_response(TO_BE_QUERIED_DB_ROW_INDEX, &response_bytes).expect("Response decoding failed");
    println!("Response decoding took               : {:?}", begin.elapsed());
    println!();

    // Original database row content, which server has access to
    let db_row_begins_at = TO_BE_QUERIED_DB_ROW_INDEX * DB_ENTRY_BYTE_LEN;
    let orig_db_row_bytes = &db_bytes[db_row_begins_at..(db_row_begins_at + DB_ENTRY_BYTE_LEN)];

    println!("Original database row bytes    : {}", to_hex(&orig_db_row_bytes[..32]));
    println!("PIR decoded database row bytes : {}", to_hex(&obtained_db_row_bytes[..32]));

    // Original database row content and FrodoPIR client decoded row content must match !
    assert_eq!(orig_db_row_bytes, obtained_db_row_bytes);
}
