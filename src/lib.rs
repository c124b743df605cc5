//! FrodoPIR: A Rust library implementation of the FrodoPIR **P**rivate **I**nformation **R**etrieval protocol, described in <https://ia.cr/2022/981>.
//!
//! This crate provides a Rust library implementation of the FrodoPIR protocol, enabling efficient and private retrieval of a chosen row
//! of a public, replicated database, stored server-side. The server learns nothing about which row a client asked for. Security rests on
//! the Learning With Errors (LWE) assumption over Z_q with q = 2^32.
//!
//! ## Features
//!
//! * **Secure Private Information Retrieval:** Allows clients to retrieve a database row from a PIR server without disclosing the row index.
//! * **Offline/ Online Split:** Per database version, each client downloads a one-time public hint; each subsequent query is a single short
//!   request/ response round trip, with the expensive work already done offline.
//! * **Error Handling:** Comprehensive error handling to catch and report issues during setup, query generation, and response processing.
//!
//! ## Usage
//!
//! This crate is designed to be used in conjunction with other crates which provide a communication mechanism between clients and server.
//! You'll typically interact with the `Client` and `Server` structs to perform/ handle queries and process responses.
//!
//! Add FrodoPIR as dependency to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! frodo-pir = "=0.1.0"
//! ```
//!
//! Then, you can use it in your code:
//!
//! ```no_run
//! use frodo_pir::{client::Client, server::Server, Csprng, SEED_BYTE_LEN};
//!
//! fn main() {
//!     const DB_ENTRY_COUNT: usize = 1usize << 16;
//!     const DB_ENTRY_BYTE_LEN: usize = 32;
//!     const MAT_ELEMENT_BITLEN: usize = 10;
//!
//!     let mut csprng = Csprng::new().expect("Entropy source must be available");
//!
//!     // Public seed and example database (replace with your own)
//!     let mut seed_μ = [0u8; SEED_BYTE_LEN];
//!     csprng.generate(&mut seed_μ);
//!
//!     let mut db_bytes = vec![0u8; DB_ENTRY_COUNT * DB_ENTRY_BYTE_LEN];
//!     csprng.generate(&mut db_bytes);
//!
//!     // Server setup (offline phase)
//!     let (server, hint_bytes) =
//!         Server::setup(&seed_μ, &db_bytes, DB_ENTRY_COUNT, DB_ENTRY_BYTE_LEN, MAT_ELEMENT_BITLEN).expect("Server setup failed");
//!
//!     // Client setup (offline phase)
//!     let mut client =
//!         Client::setup(&seed_μ, &hint_bytes, DB_ENTRY_COUNT, DB_ENTRY_BYTE_LEN, MAT_ELEMENT_BITLEN).expect("Client setup failed");
//!
//!     // Client query (online phase)
//!     let db_row_index = 31;
//!     client.prepare_query(db_row_index, &mut csprng).expect("Query preparation failed");
//!
//!     let query_bytes = client.query(db_row_index).expect("Query finalization failed");
//!     // Send `query_bytes` to the server
//!
//!     // Server response (online phase)
//!     let response_bytes = server.respond(&query_bytes).expect("Server failed to respond");
//!
//!     // Client processes the response (online phase)
//!     let db_row_bytes = client.process_response(db_row_index, &response_bytes).expect("Response decoding failed");
//!     assert_eq!(db_row_bytes, db_bytes[db_row_index * DB_ENTRY_BYTE_LEN..(db_row_index + 1) * DB_ENTRY_BYTE_LEN]);
//! }
//! ```
//!
//! ## Modules
//!
//! * `server`: Contains the `Server` struct and associated methods for setting up a PIR server from a byte serialized database and responding to client queries.
//! * `client`: Contains the `Client` struct and associated methods for generating PIR queries and decoding server responses.

#![allow(uncommon_codepoints, mixed_script_confusables)]

pub use pir_internals::error::FrodoPIRError;
pub use pir_internals::params::{BIT_SECURITY_LEVEL, LWE_DIMENSION, SEED_BYTE_LEN};
pub use pir_internals::rng::{Csprng, Prng};

pub mod client;
pub mod server;

mod pir_internals;

mod test_pir;
