use crate::pir_internals::{branch_opt_util, error::FrodoPIRError, matrix::Matrix, params};
use rayon::prelude::*;
use std::cmp::min;

/// Given a byte serialized database s.t. it has `db_entry_count` -number of rows and each row
/// contains a `db_entry_byte_len` -bytes entry, this routine parses the database into a matrix
/// s.t. each element of the matrix has at max `mat_element_bitlen` significant bits. Rows are
/// independent, hence they are parsed in parallel.
///
/// Note, 0 < `mat_element_bitlen` < 32.
/// Collects inspiration from <https://github.com/brave-experiments/frodo-pir/blob/15573960/src/db.rs#L229-L254>.
pub fn parse_db_bytes(db_bytes: &[u8], db_entry_count: usize, db_entry_byte_len: usize, mat_element_bitlen: usize) -> Result<Matrix, FrodoPIRError> {
    if branch_opt_util::unlikely(!(0 < mat_element_bitlen && mat_element_bitlen < u32::BITS as usize)) {
        return Err(FrodoPIRError::UnsupportedMatElementBitLength);
    }
    if branch_opt_util::unlikely(db_bytes.len() != db_entry_count * db_entry_byte_len) {
        return Err(FrodoPIRError::InvalidDatabaseByteLength);
    }

    let rows = db_entry_count;
    let cols = params::get_required_num_columns(db_entry_byte_len, mat_element_bitlen);
    let mat_element_mask = (1u64 << mat_element_bitlen) - 1;

    let mut mat_elems = vec![0u32; rows * cols];

    mat_elems.par_chunks_mut(cols).zip(db_bytes.par_chunks(db_entry_byte_len)).for_each(|(mat_row, db_row)| {
        let mut buffer = 0u64;
        let mut buf_num_bits = 0usize;

        let mut c_idx = 0;
        let mut byte_off = 0;

        while byte_off < db_row.len() {
            let remaining_num_bytes = db_row.len() - byte_off;

            let fillable_num_bits = u64::BITS as usize - buf_num_bits;
            let readable_num_bits = fillable_num_bits & 8usize.wrapping_neg();
            let readable_num_bytes = min(readable_num_bits / 8, remaining_num_bytes);
            let read_num_bits = readable_num_bytes * 8;

            let read_word = u64_from_le_bytes(&db_row[byte_off..(byte_off + readable_num_bytes)]);
            byte_off += readable_num_bytes;

            buffer |= read_word << buf_num_bits;
            buf_num_bits += read_num_bits;

            let fillable_num_elems = buf_num_bits / mat_element_bitlen;

            for elem in mat_row[c_idx..(c_idx + fillable_num_elems)].iter_mut() {
                *elem = (buffer & mat_element_mask) as u32;

                buffer >>= mat_element_bitlen;
                buf_num_bits -= mat_element_bitlen;
            }

            c_idx += fillable_num_elems;
        }

        // A row's bit count need not be a multiple of the element bit length, the leftover
        // bits become one final partial element.
        if (buf_num_bits > 0) && (c_idx < mat_row.len()) {
            mat_row[c_idx] = (buffer & mat_element_mask) as u32;
        }
    });

    Matrix::from_values(rows, cols, mat_elems)
}

/// Given a parsed database matrix as input s.t. each element of the matrix has at max
/// `mat_element_bitlen` significant bits, this routine serializes it back into little-endian
/// bytes of length `db_entry_count x db_entry_byte_len`, processing rows in parallel.
///
/// Per row, at most `8 x db_entry_byte_len` bits are written; the up-to `mat_element_bitlen - 1`
/// slack bits of the final element are encoding padding and get discarded.
///
/// ```text
/// M = parse_db_bytes(orig_database_bytes)
/// comp_database_bytes = serialize_parsed_db_matrix(M)
/// assert(orig_database_bytes == comp_database_bytes)
/// ```
pub fn serialize_parsed_db_matrix(db_matrix: &Matrix, db_entry_byte_len: usize, mat_element_bitlen: usize) -> Result<Vec<u8>, FrodoPIRError> {
    if branch_opt_util::unlikely(!(0 < mat_element_bitlen && mat_element_bitlen < u32::BITS as usize)) {
        return Err(FrodoPIRError::UnsupportedMatElementBitLength);
    }
    if branch_opt_util::unlikely(db_matrix.num_cols() != params::get_required_num_columns(db_entry_byte_len, mat_element_bitlen)) {
        return Err(FrodoPIRError::InvalidMatrixDimension);
    }

    let rows = db_matrix.num_rows();
    let cols = db_matrix.num_cols();

    let total_num_writable_bits_per_row = db_entry_byte_len * 8;
    let mat_element_mask = (1u64 << mat_element_bitlen) - 1;

    let mut db_bytes = vec![0u8; rows * db_entry_byte_len];

    db_bytes.par_chunks_mut(db_entry_byte_len).enumerate().for_each(|(r_idx, db_row)| {
        let mut buffer = 0u64;
        let mut buf_num_bits = 0usize;

        let mut byte_off = 0;

        for c_idx in 0..cols {
            let remaining_num_bits = total_num_writable_bits_per_row - (byte_off * 8 + buf_num_bits);
            let selected_bits = (db_matrix[(r_idx, c_idx)] as u64) & mat_element_mask;

            buffer |= selected_bits << buf_num_bits;
            buf_num_bits += min(mat_element_bitlen, remaining_num_bits);

            let writable_num_bits = buf_num_bits & 8usize.wrapping_neg();
            let writable_num_bytes = writable_num_bits / 8;

            u64_to_le_bytes(buffer, &mut db_row[byte_off..(byte_off + writable_num_bytes)]);

            buffer >>= writable_num_bits;
            buf_num_bits -= writable_num_bits;

            byte_off += writable_num_bytes;
        }
    });

    Ok(db_bytes)
}

/// Serializes a single decoded database row (a 1 x cols matrix of `mat_element_bitlen` -bits
/// elements) into the original `db_entry_byte_len` -bytes entry. This is the 1-row
/// specialization of [`serialize_parsed_db_matrix`], used by the client after decoding a
/// server response.
pub fn serialize_db_row(db_row: &Matrix, db_entry_byte_len: usize, mat_element_bitlen: usize) -> Result<Vec<u8>, FrodoPIRError> {
    if branch_opt_util::unlikely(db_row.num_rows() != 1) {
        return Err(FrodoPIRError::InvalidDimensionForVector);
    }

    serialize_parsed_db_matrix(db_row, db_entry_byte_len, mat_element_bitlen)
}

/// Converts a slice of bytes into a u64 in little-endian byte order.
///
/// Reads at most 8 bytes from the input slice. If the slice is shorter than 8 bytes, it reads
/// only the available bytes, while setting other bytes to 0. The function handles cases where
/// the input slice is empty.
#[inline(always)]
pub fn u64_from_le_bytes(bytes: &[u8]) -> u64 {
    let mut word = 0;
    let readable_num_bytes = min(bytes.len(), size_of::<u64>());

    for (idx, &byte) in bytes.iter().enumerate().take(readable_num_bytes) {
        word |= (byte as u64) << (idx * 8);
    }

    word
}

/// Converts a u64 into a slice of bytes in little-endian byte order.
///
/// Writes at most 8 bytes to the output slice. If the slice is shorter than 8 bytes, it writes
/// only those many bytes. The function handles cases where the output slice is empty.
#[inline(always)]
pub fn u64_to_le_bytes(word: u64, bytes: &mut [u8]) {
    let writable_num_bytes = min(bytes.len(), size_of::<u64>());

    for (idx, byte) in bytes.iter_mut().enumerate().take(writable_num_bytes) {
        *byte = (word >> (idx * 8)) as u8;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::pir_internals::rng::Prng;

    fn check_db_parsing_and_serialization_roundtrip(db_entry_count: usize, db_entry_byte_len: usize, mat_element_bitlen: usize) {
        let mut prng = Prng::new(&[0xfeu8; 16]);

        let mut orig_db_bytes = vec![0u8; db_entry_count * db_entry_byte_len];
        prng.generate(&mut orig_db_bytes);

        let parsed_db_mat = parse_db_bytes(&orig_db_bytes, db_entry_count, db_entry_byte_len, mat_element_bitlen).expect("Database must be parsable");
        let comp_db_bytes = serialize_parsed_db_matrix(&parsed_db_mat, db_entry_byte_len, mat_element_bitlen).expect("Parsed database must be serializable");

        assert_eq!(orig_db_bytes, comp_db_bytes, "db_entry_count = {}, db_entry_byte_len = {}, mat_element_bitlen = {}", db_entry_count, db_entry_byte_len, mat_element_bitlen);
    }

    #[test]
    fn parsing_database_and_serializing_database_matrix_is_lossless() {
        check_db_parsing_and_serialization_roundtrip(1usize << 10, 1024, 10);
        check_db_parsing_and_serialization_roundtrip(1usize << 10, 1024, 9);
        check_db_parsing_and_serialization_roundtrip(1usize << 16, 32, 10);
    }

    #[test]
    fn roundtrip_is_lossless_when_element_count_overshoots_row_bit_length() {
        // ceil(8 * 1024 / 9) = 911 columns, spanning 8199 bits; the final 7 bits per row
        // are encoding slack and must not leak into the serialized bytes.
        check_db_parsing_and_serialization_roundtrip(1usize << 8, 1024, 9);
    }

    #[test]
    fn parsed_matrix_elements_fit_in_element_bit_length() {
        const DB_ENTRY_COUNT: usize = 1usize << 8;
        const DB_ENTRY_BYTE_LEN: usize = 64;
        const MAT_ELEMENT_BITLEN: usize = 10;

        let mut prng = Prng::new(&[0xabu8; 16]);

        let mut db_bytes = vec![0u8; DB_ENTRY_COUNT * DB_ENTRY_BYTE_LEN];
        prng.generate(&mut db_bytes);

        let parsed_db_mat = parse_db_bytes(&db_bytes, DB_ENTRY_COUNT, DB_ENTRY_BYTE_LEN, MAT_ELEMENT_BITLEN).expect("Database must be parsable");

        for r_idx in 0..parsed_db_mat.num_rows() {
            for c_idx in 0..parsed_db_mat.num_cols() {
                assert!(parsed_db_mat[(r_idx, c_idx)] < (1u32 << MAT_ELEMENT_BITLEN));
            }
        }
    }

    #[test]
    fn mismatched_database_byte_length_is_rejected() {
        let db_bytes = vec![0u8; 100];

        assert_eq!(parse_db_bytes(&db_bytes, 16, 32, 10).unwrap_err(), FrodoPIRError::InvalidDatabaseByteLength);
        assert_eq!(parse_db_bytes(&db_bytes, 10, 10, 0).unwrap_err(), FrodoPIRError::UnsupportedMatElementBitLength);
        assert_eq!(parse_db_bytes(&db_bytes, 10, 10, 32).unwrap_err(), FrodoPIRError::UnsupportedMatElementBitLength);
    }
}
