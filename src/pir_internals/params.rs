use crate::pir_internals::{branch_opt_util, error::FrodoPIRError};

pub const BIT_SECURITY_LEVEL: usize = 128;
pub const LWE_DIMENSION: usize = 1774;
pub const SEED_BYTE_LEN: usize = BIT_SECURITY_LEVEL / 8;

/// All arithmetic is performed modulo 2^32, for which u32 gives native reduction.
pub const Q: u64 = 1 << u32::BITS;

/// Computes the row width (i.e. number of columns) of the parsed database matrix,
/// when each database entry spans `db_entry_byte_len` -bytes and each matrix element
/// holds `mat_element_bitlen` -many of those bits.
pub const fn get_required_num_columns(db_entry_byte_len: usize, mat_element_bitlen: usize) -> usize {
    (db_entry_byte_len * 8).div_ceil(mat_element_bitlen)
}

/// Correctness margin of the scheme, following Eq. 8 in section 5.1 of <https://ia.cr/2022/981>.
fn check_param_correctness(db_entry_count: usize, mat_element_bitlen: usize) -> bool {
    let rho = 1u64 << mat_element_bitlen;
    Q >= 8 * rho * rho * (db_entry_count.isqrt() as u64)
}

/// Validates a requested FrodoPIR instantiation, accepting only the recommended parameter
/// combinations of table 5 in <https://ia.cr/2022/981>, each of which must also satisfy
/// the correctness margin. Both `Server::setup` and `Client::setup` call this before
/// allocating anything.
pub fn validate_pir_params(db_entry_count: usize, mat_element_bitlen: usize) -> Result<(), FrodoPIRError> {
    let is_recommended = matches!(
        (db_entry_count, mat_element_bitlen),
        (0x1_0000, 10) | (0x2_0000, 10) | (0x4_0000, 10) | (0x8_0000, 9) | (0x10_0000, 9)
    );

    if branch_opt_util::likely(is_recommended && check_param_correctness(db_entry_count, mat_element_bitlen)) {
        Ok(())
    } else {
        Err(FrodoPIRError::UnsupportedParameters)
    }
}
