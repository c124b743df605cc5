use crate::pir_internals::{
    branch_opt_util,
    error::FrodoPIRError,
    matrix::Matrix,
    params::{self, LWE_DIMENSION, SEED_BYTE_LEN},
    rng::Csprng,
    serialization,
};
use std::collections::HashMap;

/// Lifecycle stage of one in-flight client query.
#[derive(Clone)]
pub enum QueryStatus {
    Prepared,
    Sent,
}

/// One in-flight query: the finalizable LWE vector `b = s * A + e` and the decoding
/// vector `c = s * M`. The secret vector `s` itself is folded into both and discarded
/// at preparation time.
#[derive(Clone)]
pub struct Query {
    status: QueryStatus,
    vec_b: Matrix,
    vec_c: Matrix,
}

/// Frodo *P*rivate *I*nformation *R*etrieval Client.
///
/// Holds the seed-derived public matrix A and the server-provided hint matrix M for one
/// database version, along with a cache of in-flight queries, keyed by database row index.
/// The per-index query lifecycle is `prepare_query` -> `query` -> `process_response`; any
/// call outside that order fails without touching client state.
#[derive(Clone)]
pub struct Client {
    pub_mat_a: Matrix,
    hint_mat_m: Matrix,
    db_entry_count: usize,
    db_entry_byte_len: usize,
    mat_element_bitlen: usize,
    pending_queries: HashMap<usize, Query>,
}

impl Client {
    /// Given a `SEED_BYTE_LEN` -bytes public seed and the byte serialized hint matrix M,
    /// computed by a FrodoPIR server over a database of `db_entry_count` entries of
    /// `db_entry_byte_len` bytes each, this routine sets up a FrodoPIR client, ready to
    /// generate queries and process server responses.
    pub fn setup(
        seed_μ: &[u8; SEED_BYTE_LEN],
        hint_bytes: &[u8],
        db_entry_count: usize,
        db_entry_byte_len: usize,
        mat_element_bitlen: usize,
    ) -> Result<Client, FrodoPIRError> {
        params::validate_pir_params(db_entry_count, mat_element_bitlen)?;

        let parsed_db_num_cols = params::get_required_num_columns(db_entry_byte_len, mat_element_bitlen);
        if branch_opt_util::unlikely(hint_bytes.len() != LWE_DIMENSION * parsed_db_num_cols * size_of::<u32>()) {
            return Err(FrodoPIRError::InvalidHintByteLength);
        }

        let pub_mat_a = Matrix::generate_from_seed(LWE_DIMENSION, db_entry_count, seed_μ)?;
        let hint_mat_m = Matrix::from_le_bytes(LWE_DIMENSION, parsed_db_num_cols, hint_bytes)?;

        Ok(Client {
            pub_mat_a,
            hint_mat_m,
            db_entry_count,
            db_entry_byte_len,
            mat_element_bitlen,
            pending_queries: HashMap::new(),
        })
    }

    /// Given a database row index, this routine prepares a query, so that the value at that
    /// index can be enquired later. On success an entry is placed in the internal query
    /// cache, under that row index. In case a query for this row index is already pending,
    /// the call fails and no change is made to the internal cache.
    pub fn prepare_query(&mut self, db_row_index: usize, csprng: &mut Csprng) -> Result<(), FrodoPIRError> {
        if branch_opt_util::unlikely(db_row_index >= self.db_entry_count) {
            return Err(FrodoPIRError::DBRowIndexOutOfRange);
        }
        if branch_opt_util::unlikely(self.pending_queries.contains_key(&db_row_index)) {
            return Err(FrodoPIRError::PendingQueryExistsForDBRowIndex);
        }

        let secret_vec_s = Matrix::sample_from_uniform_ternary_dist(1, LWE_DIMENSION, csprng)?;
        let error_vec_e = Matrix::sample_from_uniform_ternary_dist(1, self.db_entry_count, csprng)?;

        let vec_b = ((&secret_vec_s * &self.pub_mat_a)? + error_vec_e)?;
        let vec_c = (&secret_vec_s * &self.hint_mat_m)?;

        self.pending_queries.insert(
            db_row_index,
            Query {
                status: QueryStatus::Prepared,
                vec_b,
                vec_c,
            },
        );

        Ok(())
    }

    /// Vector form of [`Client::prepare_query`]: prepares one query per requested database
    /// row index, returning a parallel list of per-index preparation statuses. Indices with
    /// an already pending query come back `false`; no retry is attempted for them.
    pub fn prepare_queries(&mut self, db_row_indices: &[usize], csprng: &mut Csprng) -> Vec<bool> {
        db_row_indices.iter().map(|&db_row_index| self.prepare_query(db_row_index, csprng).is_ok()).collect()
    }

    /// Given a database row index, for which a query has already been prepared, this routine
    /// finalizes the query, returning its byte serialized form, ready to be sent to the
    /// server. It fails, without state change, in case either of
    ///
    /// (a) No query was prepared for the requested database row index.
    /// (b) The query for the requested database row index was already sent to the server.
    pub fn query(&mut self, db_row_index: usize) -> Result<Vec<u8>, FrodoPIRError> {
        match self.pending_queries.get_mut(&db_row_index) {
            Some(query) => match query.status {
                QueryStatus::Prepared => {
                    let query_indicator = Self::query_indicator(self.mat_element_bitlen);

                    let masked_elem = query.vec_b[(0, db_row_index)];
                    query.vec_b[(0, db_row_index)] = masked_elem.wrapping_add(query_indicator);

                    let query_bytes = query.vec_b.to_le_bytes();
                    query.status = QueryStatus::Sent;

                    Ok(query_bytes)
                }
                QueryStatus::Sent => {
                    branch_opt_util::cold();
                    Err(FrodoPIRError::QueryAlreadySentForDBRowIndex)
                }
            },
            None => {
                branch_opt_util::cold();
                Err(FrodoPIRError::PendingQueryDoesNotExistForDBRowIndex)
            }
        }
    }

    /// Given a database row index, for which a query has been sent to the server, this
    /// routine decodes the server's response, returning the byte serialized content of the
    /// queried database row, while also removing the corresponding entry from the internal
    /// query cache. It fails, without state change, in case either of
    ///
    /// (a) No query was prepared for the requested database row index.
    /// (b) The query for the requested database row index has not yet been sent.
    pub fn process_response(&mut self, db_row_index: usize, response_bytes: &[u8]) -> Result<Vec<u8>, FrodoPIRError> {
        let query = match self.pending_queries.get(&db_row_index) {
            Some(query) => query,
            None => {
                branch_opt_util::cold();
                return Err(FrodoPIRError::PendingQueryDoesNotExistForDBRowIndex);
            }
        };
        if branch_opt_util::unlikely(matches!(query.status, QueryStatus::Prepared)) {
            return Err(FrodoPIRError::QueryNotYetSentForDBRowIndex);
        }

        let parsed_db_num_cols = params::get_required_num_columns(self.db_entry_byte_len, self.mat_element_bitlen);
        if branch_opt_util::unlikely(response_bytes.len() != parsed_db_num_cols * size_of::<u32>()) {
            return Err(FrodoPIRError::InvalidResponseByteLength);
        }

        let vec_c_tilda = Matrix::from_le_bytes(1, parsed_db_num_cols, response_bytes)?;

        let rho = 1u32 << self.mat_element_bitlen;
        let rounding_factor = Self::query_indicator(self.mat_element_bitlen);
        let rounding_floor = rounding_factor / 2;

        let mut db_row_elems = vec![0u32; parsed_db_num_cols];

        for (c_idx, db_row_elem) in db_row_elems.iter_mut().enumerate() {
            let unscaled_res = vec_c_tilda[(0, c_idx)].wrapping_sub(query.vec_c[(0, c_idx)]);

            let scaled_res = unscaled_res / rounding_factor;
            let scaled_rem = unscaled_res % rounding_factor;

            let rounded_res = (scaled_res + (scaled_rem > rounding_floor) as u32) % rho;

            *db_row_elem = rounded_res;
        }

        let db_row = Matrix::from_values(1, parsed_db_num_cols, db_row_elems)?;
        let db_row_bytes = serialization::serialize_db_row(&db_row, self.db_entry_byte_len, self.mat_element_bitlen)?;

        self.pending_queries.remove(&db_row_index);

        Ok(db_row_bytes)
    }

    /// The scaling factor Δ = q / 2^mat_element_bitlen, added as the plaintext indicator at
    /// the queried index and divided out again when decoding the server response.
    const fn query_indicator(mat_element_bitlen: usize) -> u32 {
        let rho = 1u64 << mat_element_bitlen;
        (params::Q / rho) as u32
    }
}
