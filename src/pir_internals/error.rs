use std::{error::Error, fmt::Display};

#[derive(Debug, PartialEq)]
pub enum FrodoPIRError {
    // Parameters
    UnsupportedParameters,
    UnsupportedMatElementBitLength,

    // Matrix
    InvalidMatrixDimension,
    IncompatibleDimensionForMatrixMultiplication,
    IncompatibleDimensionForMatrixAddition,
    InvalidNumberOfElementsInMatrix,
    IncompatibleDimensionForRowVectorTransposedMatrixMultiplication,
    InvalidDimensionForVector,
    InvalidSerializedMatrixByteLength,

    // Database codec
    InvalidDatabaseByteLength,

    // Randomness
    EntropySourceFailure,

    // PIR
    InvalidHintByteLength,
    InvalidQueryByteLength,
    InvalidResponseByteLength,
    DBRowIndexOutOfRange,
    PendingQueryExistsForDBRowIndex,
    PendingQueryDoesNotExistForDBRowIndex,
    QueryAlreadySentForDBRowIndex,
    QueryNotYetSentForDBRowIndex,
}

impl Display for FrodoPIRError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedParameters => write!(f, "Requested (db_entry_count, mat_element_bitlen) is not a supported FrodoPIR parameter combination."),
            Self::UnsupportedMatElementBitLength => write!(f, "Bit length of a database matrix element must be in [1, 32)."),

            Self::InvalidMatrixDimension => write!(f, "The number of rows and columns in the matrix must be non-zero."),
            Self::IncompatibleDimensionForMatrixMultiplication => write!(f, "The matrix dimensions do not allow multiplication."),
            Self::IncompatibleDimensionForMatrixAddition => write!(f, "The matrix dimensions do not allow addition."),
            Self::InvalidNumberOfElementsInMatrix => write!(f, "The matrix must have 'rows * columns' elements."),
            Self::IncompatibleDimensionForRowVectorTransposedMatrixMultiplication => {
                write!(f, "The dimensions are incompatible for multiplication of a row vector and a transposed matrix.")
            }
            Self::InvalidDimensionForVector => write!(f, "A vector must have either one row or one column."),
            Self::InvalidSerializedMatrixByteLength => write!(f, "Byte length of a serialized matrix must be 'rows * columns * 4'."),

            Self::InvalidDatabaseByteLength => write!(f, "Byte length of the database must be 'db_entry_count * db_entry_byte_len'."),

            Self::EntropySourceFailure => write!(f, "Failed to acquire seed bytes from the system entropy source."),

            Self::InvalidHintByteLength => write!(f, "Unexpected byte length of serialized hint matrix."),
            Self::InvalidQueryByteLength => write!(f, "Unexpected byte length of serialized query vector."),
            Self::InvalidResponseByteLength => write!(f, "Unexpected byte length of serialized response vector."),
            Self::DBRowIndexOutOfRange => write!(f, "Database row index is out of range."),
            Self::PendingQueryExistsForDBRowIndex => write!(f, "Pending query for this database row index found in internal client state."),
            Self::PendingQueryDoesNotExistForDBRowIndex => write!(f, "No pending query for this database row index in internal client state."),
            Self::QueryAlreadySentForDBRowIndex => write!(f, "Query for this database row index has already been finalized and sent."),
            Self::QueryNotYetSentForDBRowIndex => write!(f, "Query for this database row index has not yet been sent to the server."),
        }
    }
}

impl Error for FrodoPIRError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}
