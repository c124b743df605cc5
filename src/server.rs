use crate::pir_internals::{
    branch_opt_util,
    error::FrodoPIRError,
    matrix::Matrix,
    params::{self, LWE_DIMENSION, SEED_BYTE_LEN},
    serialization,
};

/// Frodo *P*rivate *I*nformation *R*etrieval Server.
///
/// Holds the parsed database for one database version. The parsed matrix is stored
/// transposed, so that responding to a query strides contiguously through it. It is
/// treated as immutable after setup - `respond` takes `&self` and is safe to call from
/// many threads concurrently.
pub struct Server {
    transposed_parsed_db_mat_d: Matrix,
    db_entry_count: usize,
}

impl Server {
    /// Given a `SEED_BYTE_LEN` -bytes public seed and a byte serialized database which has
    /// `db_entry_count` -many entries s.t. each entry is `db_entry_byte_len` -bytes, this
    /// routine sets up a FrodoPIR server, returning an initialized server handle (ready to
    /// respond to client queries) and the byte serialized public hint matrix M = A * D,
    /// which clients download for preprocessing queries.
    ///
    /// The seed is public; A itself is not persisted, every client regenerates it.
    pub fn setup(
        seed_μ: &[u8; SEED_BYTE_LEN],
        db_bytes: &[u8],
        db_entry_count: usize,
        db_entry_byte_len: usize,
        mat_element_bitlen: usize,
    ) -> Result<(Server, Vec<u8>), FrodoPIRError> {
        params::validate_pir_params(db_entry_count, mat_element_bitlen)?;

        let pub_mat_a = Matrix::generate_from_seed(LWE_DIMENSION, db_entry_count, seed_μ)?;
        let parsed_db_mat_d = serialization::parse_db_bytes(db_bytes, db_entry_count, db_entry_byte_len, mat_element_bitlen)?;

        let hint_mat_m = (&pub_mat_a * &parsed_db_mat_d)?;
        let hint_bytes = hint_mat_m.to_le_bytes();

        Ok((
            Server {
                transposed_parsed_db_mat_d: parsed_db_mat_d.transpose(),
                db_entry_count,
            },
            hint_bytes,
        ))
    }

    /// Given a byte serialized client query, this routine responds to it, returning the
    /// byte serialized response vector `c̃ = b̃ * D`. Respond is stateless and pure in the
    /// query bytes; it learns nothing about which database row the client is after.
    pub fn respond(&self, query_bytes: &[u8]) -> Result<Vec<u8>, FrodoPIRError> {
        if branch_opt_util::unlikely(query_bytes.len() != self.db_entry_count * size_of::<u32>()) {
            return Err(FrodoPIRError::InvalidQueryByteLength);
        }

        let vec_b_tilda = Matrix::from_le_bytes(1, self.db_entry_count, query_bytes)?;
        let vec_c_tilda = vec_b_tilda.row_vector_x_transposed_matrix(&self.transposed_parsed_db_mat_d)?;

        Ok(vec_c_tilda.to_le_bytes())
    }
}
