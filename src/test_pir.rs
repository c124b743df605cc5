#![cfg(test)]

use crate::{client::Client, server::Server, Csprng, FrodoPIRError, Prng, SEED_BYTE_LEN};

/// Builds a deterministic database of `db_entry_count * db_entry_byte_len` bytes, by
/// squeezing the seed-expansion PRNG seeded with the public matrix seed itself.
fn generate_db_bytes(seed_μ: &[u8; SEED_BYTE_LEN], db_entry_count: usize, db_entry_byte_len: usize) -> Vec<u8> {
    let mut db_bytes = vec![0u8; db_entry_count * db_entry_byte_len];

    let mut prng = Prng::new(seed_μ);
    prng.generate(&mut db_bytes);

    db_bytes
}

fn test_private_information_retrieval(db_entry_count: usize, db_entry_byte_len: usize, mat_element_bitlen: usize, num_queries: usize) {
    let seed_μ = [0u8; SEED_BYTE_LEN];
    let db_bytes = generate_db_bytes(&seed_μ, db_entry_count, db_entry_byte_len);

    let (server, hint_bytes) = Server::setup(&seed_μ, &db_bytes, db_entry_count, db_entry_byte_len, mat_element_bitlen).expect("Server setup must pass");
    let mut client = Client::setup(&seed_μ, &hint_bytes, db_entry_count, db_entry_byte_len, mat_element_bitlen).expect("Client setup must pass");

    let mut csprng = Csprng::from_seed(&[0xb1u8; 32]);
    let mut index_sampler = Prng::new(b"db-row-index-sampler");

    for _ in 0..num_queries {
        let db_row_index = {
            let mut index_bytes = [0u8; 8];
            index_sampler.generate(&mut index_bytes);

            (u64::from_le_bytes(index_bytes) as usize) % db_entry_count
        };

        // An earlier iteration may have already drawn this row index, skipping is fine.
        if client.prepare_query(db_row_index, &mut csprng).is_err() {
            continue;
        }

        let query_bytes = client.query(db_row_index).expect("Prepared query must be finalizable");
        let response_bytes = server.respond(&query_bytes).expect("Server must respond to well-formed query");
        let db_row_bytes = client.process_response(db_row_index, &response_bytes).expect("Response must be decodable");

        let db_row_begins_at = db_row_index * db_entry_byte_len;
        assert_eq!(db_row_bytes, db_bytes[db_row_begins_at..(db_row_begins_at + db_entry_byte_len)]);
    }
}

#[test]
fn private_information_retrieval() {
    test_private_information_retrieval(1usize << 16, 32, 10, 32);
}

#[test]
#[ignore = "public matrix A alone takes ~7.4GB per party at this parameter combination"]
fn private_information_retrieval_with_large_db() {
    test_private_information_retrieval(1usize << 20, 32, 9, 32);
}

#[test]
fn queried_db_row_is_decoded_exactly() {
    const DB_ENTRY_COUNT: usize = 1usize << 16;
    const DB_ENTRY_BYTE_LEN: usize = 32;
    const MAT_ELEMENT_BITLEN: usize = 10;
    const DB_ROW_INDEX: usize = 31;

    let seed_μ = [0u8; SEED_BYTE_LEN];
    let db_bytes = generate_db_bytes(&seed_μ, DB_ENTRY_COUNT, DB_ENTRY_BYTE_LEN);

    let (server, hint_bytes) = Server::setup(&seed_μ, &db_bytes, DB_ENTRY_COUNT, DB_ENTRY_BYTE_LEN, MAT_ELEMENT_BITLEN).expect("Server setup must pass");
    let mut client = Client::setup(&seed_μ, &hint_bytes, DB_ENTRY_COUNT, DB_ENTRY_BYTE_LEN, MAT_ELEMENT_BITLEN).expect("Client setup must pass");

    let mut csprng = Csprng::new().expect("Entropy source must be available");

    client.prepare_query(DB_ROW_INDEX, &mut csprng).expect("Query preparation must pass");

    let query_bytes = client.query(DB_ROW_INDEX).expect("Prepared query must be finalizable");
    assert_eq!(query_bytes.len(), DB_ENTRY_COUNT * 4);

    let response_bytes = server.respond(&query_bytes).expect("Server must respond to well-formed query");
    assert_eq!(response_bytes.len(), (DB_ENTRY_BYTE_LEN * 8).div_ceil(MAT_ELEMENT_BITLEN) * 4);

    let db_row_bytes = client.process_response(DB_ROW_INDEX, &response_bytes).expect("Response must be decodable");

    let db_row_begins_at = DB_ROW_INDEX * DB_ENTRY_BYTE_LEN;
    assert_eq!(db_row_bytes, db_bytes[db_row_begins_at..(db_row_begins_at + DB_ENTRY_BYTE_LEN)]);
}

#[test]
fn boundary_db_row_indices_are_decoded_exactly() {
    const DB_ENTRY_COUNT: usize = 1usize << 16;
    const DB_ENTRY_BYTE_LEN: usize = 32;
    const MAT_ELEMENT_BITLEN: usize = 10;

    let seed_μ = [0u8; SEED_BYTE_LEN];
    let db_bytes = generate_db_bytes(&seed_μ, DB_ENTRY_COUNT, DB_ENTRY_BYTE_LEN);

    let (server, hint_bytes) = Server::setup(&seed_μ, &db_bytes, DB_ENTRY_COUNT, DB_ENTRY_BYTE_LEN, MAT_ELEMENT_BITLEN).expect("Server setup must pass");
    let mut client = Client::setup(&seed_μ, &hint_bytes, DB_ENTRY_COUNT, DB_ENTRY_BYTE_LEN, MAT_ELEMENT_BITLEN).expect("Client setup must pass");

    let mut csprng = Csprng::new().expect("Entropy source must be available");

    for db_row_index in [0, DB_ENTRY_COUNT - 1] {
        client.prepare_query(db_row_index, &mut csprng).expect("Query preparation must pass");

        let query_bytes = client.query(db_row_index).expect("Prepared query must be finalizable");
        let response_bytes = server.respond(&query_bytes).expect("Server must respond to well-formed query");
        let db_row_bytes = client.process_response(db_row_index, &response_bytes).expect("Response must be decodable");

        let db_row_begins_at = db_row_index * DB_ENTRY_BYTE_LEN;
        assert_eq!(db_row_bytes, db_bytes[db_row_begins_at..(db_row_begins_at + DB_ENTRY_BYTE_LEN)]);
    }
}

#[test]
fn repeated_query_preparation_for_same_db_row_index_is_rejected() {
    const DB_ENTRY_COUNT: usize = 1usize << 16;
    const DB_ENTRY_BYTE_LEN: usize = 32;
    const MAT_ELEMENT_BITLEN: usize = 10;
    const DB_ROW_INDEX: usize = 31;

    let seed_μ = [0u8; SEED_BYTE_LEN];
    let db_bytes = generate_db_bytes(&seed_μ, DB_ENTRY_COUNT, DB_ENTRY_BYTE_LEN);

    let (server, hint_bytes) = Server::setup(&seed_μ, &db_bytes, DB_ENTRY_COUNT, DB_ENTRY_BYTE_LEN, MAT_ELEMENT_BITLEN).expect("Server setup must pass");
    let mut client = Client::setup(&seed_μ, &hint_bytes, DB_ENTRY_COUNT, DB_ENTRY_BYTE_LEN, MAT_ELEMENT_BITLEN).expect("Client setup must pass");

    let mut csprng = Csprng::new().expect("Entropy source must be available");

    assert_eq!(client.prepare_query(DB_ROW_INDEX, &mut csprng), Ok(()));
    assert_eq!(client.prepare_query(DB_ROW_INDEX, &mut csprng), Err(FrodoPIRError::PendingQueryExistsForDBRowIndex));

    // The first prepared query must still go through its full lifecycle unharmed.
    let query_bytes = client.query(DB_ROW_INDEX).expect("Prepared query must be finalizable");
    let response_bytes = server.respond(&query_bytes).expect("Server must respond to well-formed query");
    let db_row_bytes = client.process_response(DB_ROW_INDEX, &response_bytes).expect("Response must be decodable");

    let db_row_begins_at = DB_ROW_INDEX * DB_ENTRY_BYTE_LEN;
    assert_eq!(db_row_bytes, db_bytes[db_row_begins_at..(db_row_begins_at + DB_ENTRY_BYTE_LEN)]);
}

#[test]
fn out_of_order_query_lifecycle_is_rejected() {
    const DB_ENTRY_COUNT: usize = 1usize << 16;
    const DB_ENTRY_BYTE_LEN: usize = 32;
    const MAT_ELEMENT_BITLEN: usize = 10;
    const DB_ROW_INDEX: usize = 5;

    let parsed_db_num_cols = (DB_ENTRY_BYTE_LEN * 8).div_ceil(MAT_ELEMENT_BITLEN);

    let seed_μ = [0u8; SEED_BYTE_LEN];
    let db_bytes = generate_db_bytes(&seed_μ, DB_ENTRY_COUNT, DB_ENTRY_BYTE_LEN);

    let (server, hint_bytes) = Server::setup(&seed_μ, &db_bytes, DB_ENTRY_COUNT, DB_ENTRY_BYTE_LEN, MAT_ELEMENT_BITLEN).expect("Server setup must pass");
    let mut client = Client::setup(&seed_μ, &hint_bytes, DB_ENTRY_COUNT, DB_ENTRY_BYTE_LEN, MAT_ELEMENT_BITLEN).expect("Client setup must pass");

    // Finalizing before preparing must fail.
    assert_eq!(client.query(DB_ROW_INDEX), Err(FrodoPIRError::PendingQueryDoesNotExistForDBRowIndex));

    // So must decoding a response before preparing.
    let well_sized_response_bytes = vec![0u8; parsed_db_num_cols * 4];
    assert_eq!(
        client.process_response(DB_ROW_INDEX, &well_sized_response_bytes),
        Err(FrodoPIRError::PendingQueryDoesNotExistForDBRowIndex)
    );

    // Decoding a response for a prepared-but-unsent query must fail too.
    let mut csprng = Csprng::new().expect("Entropy source must be available");
    client.prepare_query(DB_ROW_INDEX, &mut csprng).expect("Query preparation must pass");
    assert_eq!(
        client.process_response(DB_ROW_INDEX, &well_sized_response_bytes),
        Err(FrodoPIRError::QueryNotYetSentForDBRowIndex)
    );

    // Finalizing twice must fail, while the first finalization stays usable.
    let query_bytes = client.query(DB_ROW_INDEX).expect("Prepared query must be finalizable");
    assert_eq!(client.query(DB_ROW_INDEX), Err(FrodoPIRError::QueryAlreadySentForDBRowIndex));

    let response_bytes = server.respond(&query_bytes).expect("Server must respond to well-formed query");
    let db_row_bytes = client.process_response(DB_ROW_INDEX, &response_bytes).expect("Response must be decodable");

    let db_row_begins_at = DB_ROW_INDEX * DB_ENTRY_BYTE_LEN;
    assert_eq!(db_row_bytes, db_bytes[db_row_begins_at..(db_row_begins_at + DB_ENTRY_BYTE_LEN)]);
}

#[test]
fn queries_for_distinct_db_row_indices_evolve_independently() {
    const DB_ENTRY_COUNT: usize = 1usize << 16;
    const DB_ENTRY_BYTE_LEN: usize = 32;
    const MAT_ELEMENT_BITLEN: usize = 10;

    let seed_μ = [0u8; SEED_BYTE_LEN];
    let db_bytes = generate_db_bytes(&seed_μ, DB_ENTRY_COUNT, DB_ENTRY_BYTE_LEN);

    let (server, hint_bytes) = Server::setup(&seed_μ, &db_bytes, DB_ENTRY_COUNT, DB_ENTRY_BYTE_LEN, MAT_ELEMENT_BITLEN).expect("Server setup must pass");
    let mut client = Client::setup(&seed_μ, &hint_bytes, DB_ENTRY_COUNT, DB_ENTRY_BYTE_LEN, MAT_ELEMENT_BITLEN).expect("Client setup must pass");

    let mut csprng = Csprng::new().expect("Entropy source must be available");

    let prep_statuses = client.prepare_queries(&[10, 20, 10], &mut csprng);
    assert_eq!(prep_statuses, vec![true, true, false]);

    // Interleave the two lifecycles; each index must progress on its own.
    let query_bytes_10 = client.query(10).expect("Prepared query must be finalizable");
    assert_eq!(client.query(10), Err(FrodoPIRError::QueryAlreadySentForDBRowIndex));

    let query_bytes_20 = client.query(20).expect("Prepared query must be finalizable");

    let response_bytes_20 = server.respond(&query_bytes_20).expect("Server must respond to well-formed query");
    let db_row_bytes_20 = client.process_response(20, &response_bytes_20).expect("Response must be decodable");
    assert_eq!(db_row_bytes_20, db_bytes[20 * DB_ENTRY_BYTE_LEN..21 * DB_ENTRY_BYTE_LEN]);

    let response_bytes_10 = server.respond(&query_bytes_10).expect("Server must respond to well-formed query");
    let db_row_bytes_10 = client.process_response(10, &response_bytes_10).expect("Response must be decodable");
    assert_eq!(db_row_bytes_10, db_bytes[10 * DB_ENTRY_BYTE_LEN..11 * DB_ENTRY_BYTE_LEN]);

    // Both lifecycles have completed, their cache entries are gone.
    assert_eq!(client.query(10), Err(FrodoPIRError::PendingQueryDoesNotExistForDBRowIndex));
    assert_eq!(client.query(20), Err(FrodoPIRError::PendingQueryDoesNotExistForDBRowIndex));
}

#[test]
fn malformed_wire_artifacts_are_rejected() {
    const DB_ENTRY_COUNT: usize = 1usize << 16;
    const DB_ENTRY_BYTE_LEN: usize = 32;
    const MAT_ELEMENT_BITLEN: usize = 10;

    let seed_μ = [0u8; SEED_BYTE_LEN];
    let db_bytes = generate_db_bytes(&seed_μ, DB_ENTRY_COUNT, DB_ENTRY_BYTE_LEN);

    let (server, hint_bytes) = Server::setup(&seed_μ, &db_bytes, DB_ENTRY_COUNT, DB_ENTRY_BYTE_LEN, MAT_ELEMENT_BITLEN).expect("Server setup must pass");

    assert_eq!(
        Client::setup(&seed_μ, &hint_bytes[1..], DB_ENTRY_COUNT, DB_ENTRY_BYTE_LEN, MAT_ELEMENT_BITLEN).err(),
        Some(FrodoPIRError::InvalidHintByteLength)
    );
    assert_eq!(server.respond(&[0u8; 16]).err(), Some(FrodoPIRError::InvalidQueryByteLength));

    let mut client = Client::setup(&seed_μ, &hint_bytes, DB_ENTRY_COUNT, DB_ENTRY_BYTE_LEN, MAT_ELEMENT_BITLEN).expect("Client setup must pass");
    let mut csprng = Csprng::new().expect("Entropy source must be available");

    assert_eq!(client.prepare_query(DB_ENTRY_COUNT, &mut csprng), Err(FrodoPIRError::DBRowIndexOutOfRange));

    client.prepare_query(7, &mut csprng).expect("Query preparation must pass");
    let _ = client.query(7).expect("Prepared query must be finalizable");
    assert_eq!(client.process_response(7, &[0u8; 16]), Err(FrodoPIRError::InvalidResponseByteLength));
}

#[test]
fn unsupported_parameter_combinations_are_rejected_at_setup() {
    let seed_μ = [0u8; SEED_BYTE_LEN];

    // 2^15 entries is not a recommended combination; rejection happens before the database
    // byte length is even looked at.
    assert_eq!(
        Server::setup(&seed_μ, &[], 1usize << 15, 32, 10).err(),
        Some(FrodoPIRError::UnsupportedParameters)
    );
    assert_eq!(
        Client::setup(&seed_μ, &[], 1usize << 19, 10, 10).err(),
        Some(FrodoPIRError::UnsupportedParameters)
    );
}
