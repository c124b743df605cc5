use crate::pir_internals::{
    branch_opt_util,
    error::FrodoPIRError,
    params::SEED_BYTE_LEN,
    rng::{Csprng, Prng, CSPRNG_RATE_BYTE_LEN},
};
use rayon::prelude::*;
use std::ops::{Add, Index, IndexMut, Mul};

#[cfg(test)]
use std::ops::Neg;

/// Dense row-major matrix over Z_q with q = 2^32. All arithmetic wraps modulo q, for
/// which u32 gives native reduction. Row and column vectors are 1 x n and n x 1 matrices.
#[derive(Clone, Debug, Eq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    elems: Vec<u32>,
}

impl Matrix {
    /// Creates a new matrix with the given number of rows and columns, s.t. all elements are zero-initialized.
    pub fn new(rows: usize, cols: usize) -> Result<Matrix, FrodoPIRError> {
        if branch_opt_util::likely((rows > 0) && (cols > 0)) {
            Ok(Matrix {
                rows,
                cols,
                elems: vec![0; rows * cols],
            })
        } else {
            Err(FrodoPIRError::InvalidMatrixDimension)
        }
    }

    /// Creates a new matrix with the given number of rows and columns, s.t. elements are initialized with the given values.
    pub fn from_values(rows: usize, cols: usize, values: Vec<u32>) -> Result<Matrix, FrodoPIRError> {
        if branch_opt_util::unlikely(rows == 0 || cols == 0) {
            return Err(FrodoPIRError::InvalidMatrixDimension);
        }

        if branch_opt_util::likely(rows * cols == values.len()) {
            Ok(Matrix { rows, cols, elems: values })
        } else {
            Err(FrodoPIRError::InvalidNumberOfElementsInMatrix)
        }
    }

    #[inline(always)]
    pub const fn num_rows(&self) -> usize {
        self.rows
    }

    #[inline(always)]
    pub const fn num_cols(&self) -> usize {
        self.cols
    }

    #[inline(always)]
    pub fn num_elems(&self) -> usize {
        self.elems.len()
    }

    /// Uniform random samples a matrix of dimension `rows x cols`, expanding a short
    /// SEED_BYTE_LEN -bytes seed through the deterministic SHAKE128 -backed PRNG. The
    /// result is fully determined by the seed and the requested dimensions, hence both
    /// FrodoPIR server and client can independently derive the same public matrix A.
    pub fn generate_from_seed(rows: usize, cols: usize, seed_μ: &[u8; SEED_BYTE_LEN]) -> Result<Matrix, FrodoPIRError> {
        let mut mat = Matrix::new(rows, cols)?;
        let mut prng = Prng::new(seed_μ);

        let row_byte_len = cols * size_of::<u32>();
        let mut row_bytes = vec![0u8; row_byte_len];

        for row_elems in mat.elems.chunks_exact_mut(cols) {
            prng.generate(&mut row_bytes);

            for (elem, elem_bytes) in row_elems.iter_mut().zip(row_bytes.chunks_exact(size_of::<u32>())) {
                *elem = u32::from_le_bytes(elem_bytes.try_into().unwrap());
            }
        }

        Ok(mat)
    }

    /// Returns an identity matrix of dimension `dim x dim`.
    pub fn identity(dim: usize) -> Result<Matrix, FrodoPIRError> {
        let mut mat = Matrix::new(dim, dim)?;

        (0..dim).for_each(|idx| {
            mat[(idx, idx)] = 1;
        });

        Ok(mat)
    }

    /// Samples a row/ column vector s.t. each element is rejection sampled from a uniform
    /// ternary distribution {0, +1, -1}, drawing 32 -bit little-endian words from the CSPRNG.
    /// Note, -1 is represented as its Z_q residue q - 1 = u32::MAX.
    ///
    /// Random words are consumed from a buffer of eight TurboSHAKE256 rates, which is
    /// refilled in bulk, preserving any unconsumed tail bytes.
    ///
    /// Collects inspiration from <https://github.com/brave-experiments/frodo-pir/blob/15573960/src/utils.rs#L102-L125>.
    pub fn sample_from_uniform_ternary_dist(rows: usize, cols: usize, csprng: &mut Csprng) -> Result<Matrix, FrodoPIRError> {
        if branch_opt_util::unlikely(!(rows == 1 || cols == 1)) {
            return Err(FrodoPIRError::InvalidDimensionForVector);
        }

        const TERNARY_INTERVAL_SIZE: u32 = (u32::MAX - 2) / 3;
        const TERNARY_REJECTION_SAMPLING_MAX: u32 = TERNARY_INTERVAL_SIZE * 3;
        const SAMPLING_BUFFER_BYTE_LEN: usize = 8 * CSPRNG_RATE_BYTE_LEN;

        let mut vec = Matrix::new(rows, cols)?;

        let mut buffer = [0u8; SAMPLING_BUFFER_BYTE_LEN];
        let mut buffer_offset = 0;

        csprng.generate(&mut buffer);

        let num_elems = rows * cols;
        let mut elem_idx = 0;

        while branch_opt_util::likely(elem_idx < num_elems) {
            let mut val = u32::MAX;

            while branch_opt_util::unlikely(val > TERNARY_REJECTION_SAMPLING_MAX) {
                if branch_opt_util::unlikely((buffer_offset + size_of::<u32>()) > buffer.len()) {
                    let remaining_num_random_bytes = buffer.len() - buffer_offset;

                    buffer.copy_within(buffer_offset.., 0);
                    csprng.generate(&mut buffer[remaining_num_random_bytes..]);
                    buffer_offset = 0;
                }

                val = u32::from_le_bytes(buffer[buffer_offset..(buffer_offset + size_of::<u32>())].try_into().unwrap());
                buffer_offset += size_of::<u32>();
            }

            let ternary = if val <= TERNARY_INTERVAL_SIZE {
                0
            } else if val <= 2 * TERNARY_INTERVAL_SIZE {
                1
            } else {
                u32::MAX
            };

            vec.elems[elem_idx] = ternary;
            elem_idx += 1;
        }

        Ok(vec)
    }

    /// Performs the multiplication of a row vector (1 x N matrix) by the transpose of the
    /// given matrix (M x N), producing a 1 x M row vector.
    ///
    /// The right operand is stored as if already transposed, so the inner dot product loop
    /// strides contiguously through both operands. This is the server's hot path, invoked
    /// once per client query, and is parallelized over the output columns.
    pub fn row_vector_x_transposed_matrix(&self, rhs: &Matrix) -> Result<Matrix, FrodoPIRError> {
        if branch_opt_util::unlikely(!(self.rows == 1 && self.cols == rhs.cols)) {
            return Err(FrodoPIRError::IncompatibleDimensionForRowVectorTransposedMatrixMultiplication);
        }

        let res_num_rows = self.rows;
        let res_num_cols = rhs.rows;

        let mut res_elems = vec![0u32; res_num_rows * res_num_cols];

        res_elems.par_iter_mut().enumerate().for_each(|(c_idx, v)| {
            let rhs_row = &rhs.elems[(c_idx * rhs.cols)..((c_idx + 1) * rhs.cols)];

            *v = self
                .elems
                .iter()
                .zip(rhs_row)
                .fold(0u32, |acc, (&lhs_elem, &rhs_elem)| acc.wrapping_add(lhs_elem.wrapping_mul(rhs_elem)));
        });

        Matrix::from_values(res_num_rows, res_num_cols, res_elems)
    }

    /// Transposes the matrix, producing a new one of dimension `cols x rows`.
    pub fn transpose(&self) -> Matrix {
        let mut res_elems = vec![0u32; self.num_elems()];

        res_elems.chunks_exact_mut(self.rows).enumerate().for_each(|(r_idx, res_row)| {
            res_row.iter_mut().enumerate().for_each(|(c_idx, elem)| {
                *elem = self[(c_idx, r_idx)];
            });
        });

        Matrix {
            rows: self.cols,
            cols: self.rows,
            elems: res_elems,
        }
    }

    /// Serializes the matrix into `rows * cols * 4` bytes, concatenating elements in
    /// row-major order, each as four little-endian bytes.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; self.num_elems() * size_of::<u32>()];

        bytes.chunks_exact_mut(size_of::<u32>()).zip(self.elems.iter()).for_each(|(elem_bytes, elem)| {
            elem_bytes.copy_from_slice(&elem.to_le_bytes());
        });

        bytes
    }

    /// Deserializes a matrix of dimension `rows x cols` from `rows * cols * 4` bytes,
    /// interpreting four consecutive bytes, in little-endian order, as one element.
    pub fn from_le_bytes(rows: usize, cols: usize, bytes: &[u8]) -> Result<Matrix, FrodoPIRError> {
        if branch_opt_util::unlikely(rows == 0 || cols == 0) {
            return Err(FrodoPIRError::InvalidMatrixDimension);
        }
        if branch_opt_util::unlikely(bytes.len() != rows * cols * size_of::<u32>()) {
            return Err(FrodoPIRError::InvalidSerializedMatrixByteLength);
        }

        let elems = bytes
            .chunks_exact(size_of::<u32>())
            .map(|elem_bytes| u32::from_le_bytes(elem_bytes.try_into().unwrap()))
            .collect::<Vec<u32>>();

        Matrix::from_values(rows, cols, elems)
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = u32;

    #[inline(always)]
    fn index(&self, index: (usize, usize)) -> &Self::Output {
        let (r_idx, c_idx) = index;
        unsafe { self.elems.get_unchecked(r_idx * self.cols + c_idx) }
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    #[inline(always)]
    fn index_mut(&mut self, index: (usize, usize)) -> &mut Self::Output {
        let (r_idx, c_idx) = index;
        unsafe { self.elems.get_unchecked_mut(r_idx * self.cols + c_idx) }
    }
}

/// Equality of two equal dimension matrices. Element comparison xor-folds the whole
/// operands, s.t. the running time of a mismatch does not depend on where it occurs.
impl PartialEq for Matrix {
    fn eq(&self, other: &Self) -> bool {
        if branch_opt_util::unlikely(!(self.rows == other.rows && self.cols == other.cols)) {
            return false;
        }

        let diff_bits = self.elems.iter().zip(other.elems.iter()).fold(0u32, |acc, (&l, &r)| acc ^ (l ^ r));
        diff_bits == 0
    }
}

impl Mul for Matrix {
    type Output = Result<Matrix, FrodoPIRError>;

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self::Output {
        &self * &rhs
    }
}

/// Matrix multiplication over Z_q, parallelized s.t. each rayon worker owns a disjoint
/// contiguous slice of the output, partitioned along whichever output axis is larger.
///
/// When rows dominate, loop order is `row, shared dim, column`, keeping the inner loop
/// striding contiguously through both the output row and the right operand row, following
/// homebrewed matrix multiplication technique from
/// <https://lemire.me/blog/2024/06/13/rolling-your-own-fast-matrix-multiplication-loop-order-and-vectorization>.
/// When columns dominate (a row vector times a tall matrix), workers instead fold one
/// output element each.
impl<'b> Mul<&'b Matrix> for &Matrix {
    type Output = Result<Matrix, FrodoPIRError>;

    fn mul(self, rhs: &'b Matrix) -> Self::Output {
        if branch_opt_util::unlikely(self.cols != rhs.rows) {
            return Err(FrodoPIRError::IncompatibleDimensionForMatrixMultiplication);
        }

        let mut res_elems = vec![0u32; self.rows * rhs.cols];

        if self.rows >= rhs.cols {
            res_elems.par_chunks_mut(rhs.cols).enumerate().for_each(|(r_idx, res_row)| {
                for k in 0..self.cols {
                    let lhs_elem = self[(r_idx, k)];
                    let rhs_row = &rhs.elems[(k * rhs.cols)..((k + 1) * rhs.cols)];

                    res_row.iter_mut().zip(rhs_row).for_each(|(res_elem, &rhs_elem)| {
                        *res_elem = res_elem.wrapping_add(lhs_elem.wrapping_mul(rhs_elem));
                    });
                }
            });
        } else {
            res_elems.par_iter_mut().enumerate().for_each(|(lin_idx, v)| {
                let r_idx = lin_idx / rhs.cols;
                let c_idx = lin_idx - r_idx * rhs.cols;

                *v = (0..self.cols).fold(0u32, |acc, k| acc.wrapping_add(self[(r_idx, k)].wrapping_mul(rhs[(k, c_idx)])));
            });
        }

        Matrix::from_values(self.rows, rhs.cols, res_elems)
    }
}

impl Add for Matrix {
    type Output = Result<Matrix, FrodoPIRError>;

    #[inline(always)]
    fn add(self, rhs: Self) -> Self::Output {
        &self + &rhs
    }
}

impl<'b> Add<&'b Matrix> for &Matrix {
    type Output = Result<Matrix, FrodoPIRError>;

    fn add(self, rhs: &'b Matrix) -> Self::Output {
        if branch_opt_util::unlikely(!(self.rows == rhs.rows && self.cols == rhs.cols)) {
            return Err(FrodoPIRError::IncompatibleDimensionForMatrixAddition);
        }

        let mut res_elems = vec![0u32; self.rows * self.cols];

        res_elems.par_iter_mut().enumerate().for_each(|(lin_idx, v)| {
            *v = unsafe { self.elems.get_unchecked(lin_idx).wrapping_add(*rhs.elems.get_unchecked(lin_idx)) };
        });

        Matrix::from_values(self.rows, self.cols, res_elems)
    }
}

#[cfg(test)]
impl Neg for Matrix {
    type Output = Matrix;

    #[inline(always)]
    fn neg(self) -> Self::Output {
        -(&self)
    }
}

#[cfg(test)]
impl<'a> Neg for &'a Matrix {
    type Output = Matrix;

    fn neg(self) -> Self::Output {
        let mut res = self.clone();

        res.elems.iter_mut().for_each(|elem| {
            *elem = elem.wrapping_neg();
        });

        res
    }
}

#[cfg(test)]
mod test {
    use crate::pir_internals::{matrix::Matrix, params::SEED_BYTE_LEN, rng::Csprng};
    use rand::prelude::*;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn matrix_generation_from_seed_is_deterministic() {
        const NUM_ROWS_IN_MATRIX: usize = 128;
        const NUM_COLS_IN_MATRIX: usize = 1024;

        let mut rng = ChaCha8Rng::from_os_rng();

        let mut seed_μ = [0u8; SEED_BYTE_LEN];
        rng.fill_bytes(&mut seed_μ);

        let matrix_a = Matrix::generate_from_seed(NUM_ROWS_IN_MATRIX, NUM_COLS_IN_MATRIX, &seed_μ).expect("Matrix must be generated from seed");
        let matrix_a_prime = Matrix::generate_from_seed(NUM_ROWS_IN_MATRIX, NUM_COLS_IN_MATRIX, &seed_μ).expect("Matrix must be generated from seed");

        assert_eq!(matrix_a, matrix_a_prime);
    }

    #[test]
    fn matrix_multiplication_identity_laws_hold() {
        const NUM_ATTEMPT_MATRIX_MULTIPLICATIONS: usize = 8;
        const MIN_MATRIX_DIM: usize = 1;
        const MAX_MATRIX_DIM: usize = 512;

        let mut rng = ChaCha8Rng::from_os_rng();

        let mut seed_μ = [0u8; SEED_BYTE_LEN];
        rng.fill_bytes(&mut seed_μ);

        for _ in 0..NUM_ATTEMPT_MATRIX_MULTIPLICATIONS {
            let num_rows = rng.random_range(MIN_MATRIX_DIM..=MAX_MATRIX_DIM);
            let num_cols = rng.random_range(MIN_MATRIX_DIM..=MAX_MATRIX_DIM);

            let matrix_a = Matrix::generate_from_seed(num_rows, num_cols, &seed_μ).expect("Matrix must be generated from seed");
            let matrix_i = Matrix::identity(num_cols).expect("Identity matrix must be created");
            let matrix_i_prime = Matrix::identity(num_rows).expect("Identity matrix must be created");

            let matrix_ai = (&matrix_a * &matrix_i).expect("Matrix multiplication must pass");
            assert_eq!(matrix_a, matrix_ai);

            let matrix_ia = (&matrix_i_prime * &matrix_a).expect("Matrix multiplication must pass");
            assert_eq!(matrix_a, matrix_ia);
        }
    }

    #[test]
    fn matrix_addition_by_negation_produces_zero() {
        const NUM_ROWS_IN_MATRIX: usize = 1024;
        const NUM_COLS_IN_MATRIX: usize = NUM_ROWS_IN_MATRIX + 1;

        let mut rng = ChaCha8Rng::from_os_rng();

        let mut seed_μ = [0u8; SEED_BYTE_LEN];
        rng.fill_bytes(&mut seed_μ);

        let matrix_a = Matrix::generate_from_seed(NUM_ROWS_IN_MATRIX, NUM_COLS_IN_MATRIX, &seed_μ).expect("Matrix must be generated from seed");
        let matrix_neg_a = -&matrix_a;

        let matrix_a_plus_neg_a = (&matrix_a + &matrix_neg_a).expect("Matrix addition must pass");
        let matrix_zero = Matrix::new(NUM_ROWS_IN_MATRIX, NUM_COLS_IN_MATRIX).expect("Must be able to create zero matrix");

        assert_eq!(matrix_a_plus_neg_a, matrix_zero);
    }

    #[test]
    fn serialized_matrix_can_be_deserialized() {
        const NUM_ROWS_IN_MATRIX: usize = 1024;
        const NUM_COLS_IN_MATRIX: usize = NUM_ROWS_IN_MATRIX + 1;

        let mut rng = ChaCha8Rng::from_os_rng();

        let mut seed_μ = [0u8; SEED_BYTE_LEN];
        rng.fill_bytes(&mut seed_μ);

        let matrix_a = Matrix::generate_from_seed(NUM_ROWS_IN_MATRIX, NUM_COLS_IN_MATRIX, &seed_μ).expect("Matrix must be generated from seed");
        let matrix_a_bytes = matrix_a.to_le_bytes();
        let matrix_b = Matrix::from_le_bytes(NUM_ROWS_IN_MATRIX, NUM_COLS_IN_MATRIX, &matrix_a_bytes).expect("Matrix must be deserializable");

        assert_eq!(matrix_a, matrix_b);
        assert_eq!(matrix_a_bytes.len(), NUM_ROWS_IN_MATRIX * NUM_COLS_IN_MATRIX * 4);
    }

    #[test]
    fn matrix_transposition_is_an_involution() {
        const NUM_ROWS_IN_MATRIX: usize = 1024;
        const NUM_COLS_IN_MATRIX: usize = NUM_ROWS_IN_MATRIX + 1;

        let mut rng = ChaCha8Rng::from_os_rng();

        let mut seed_μ = [0u8; SEED_BYTE_LEN];
        rng.fill_bytes(&mut seed_μ);

        let matrix_a = Matrix::generate_from_seed(NUM_ROWS_IN_MATRIX, NUM_COLS_IN_MATRIX, &seed_μ).expect("Matrix must be generated from seed");
        let matrix_a_transposed_transposed = matrix_a.transpose().transpose();

        assert_eq!(matrix_a, matrix_a_transposed_transposed);
    }

    #[test]
    fn row_vector_x_transposed_matrix_agrees_with_matrix_multiplication() {
        const VEC_NUM_COLS: usize = 1024;
        const MAT_NUM_COLS: usize = VEC_NUM_COLS + 1;

        let mut rng = ChaCha8Rng::from_os_rng();

        let mut seed_μ = [0u8; SEED_BYTE_LEN];
        rng.fill_bytes(&mut seed_μ);

        let row_vec = Matrix::generate_from_seed(1, VEC_NUM_COLS, &seed_μ).expect("Row vector must be generated from seed");
        let matrix_b = Matrix::generate_from_seed(VEC_NUM_COLS, MAT_NUM_COLS, &seed_μ).expect("Matrix must be generated from seed");

        let expected = (&row_vec * &matrix_b).expect("Matrix multiplication must pass");
        let computed = row_vec
            .row_vector_x_transposed_matrix(&matrix_b.transpose())
            .expect("Row vector and transposed matrix multiplication must pass");

        assert_eq!(expected, computed);
    }

    #[test]
    fn ternary_sampled_values_are_uniformly_distributed() {
        const NUM_SAMPLES: usize = 1 << 20;

        // 3-sigma band around the expected per-value frequency of a uniform ternary draw.
        let expected_frequency = (NUM_SAMPLES as f64) / 3.0;
        let sigma = ((NUM_SAMPLES as f64) * (1.0 / 3.0) * (2.0 / 3.0)).sqrt();
        let tolerance = 3.0 * sigma;

        let mut csprng = Csprng::from_seed(&[0x2fu8; 32]);
        let vec = Matrix::sample_from_uniform_ternary_dist(1, NUM_SAMPLES, &mut csprng).expect("Ternary vector must be sampled");

        let mut frequencies = [0usize; 3];
        for c_idx in 0..vec.num_cols() {
            match vec[(0, c_idx)] {
                0 => frequencies[0] += 1,
                1 => frequencies[1] += 1,
                u32::MAX => frequencies[2] += 1,
                elem => panic!("Sampled value {} is not in the ternary set", elem),
            }
        }

        for frequency in frequencies {
            assert!(((frequency as f64) - expected_frequency).abs() <= tolerance);
        }
    }

    #[test]
    fn ternary_sampling_is_deterministic_in_csprng_seed() {
        const VEC_NUM_COLS: usize = 4096;

        let mut csprng0 = Csprng::from_seed(&[0x51u8; 32]);
        let mut csprng1 = Csprng::from_seed(&[0x51u8; 32]);

        let vec0 = Matrix::sample_from_uniform_ternary_dist(1, VEC_NUM_COLS, &mut csprng0).expect("Ternary vector must be sampled");
        let vec1 = Matrix::sample_from_uniform_ternary_dist(1, VEC_NUM_COLS, &mut csprng1).expect("Ternary vector must be sampled");

        assert_eq!(vec0, vec1);
    }
}
