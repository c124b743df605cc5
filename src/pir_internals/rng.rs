use crate::pir_internals::error::FrodoPIRError;
use rand::{rngs::OsRng, TryRngCore};
use sha3::{
    digest::{ExtendableOutput, Update, XofReader},
    Shake128, Shake128Reader,
};
use turboshake::TurboShake256;

/// Byte rate of the TurboSHAKE256 sponge, backing `Csprng`.
pub const CSPRNG_RATE_BYTE_LEN: usize = 136;

/// Deterministic pseudo random number generator, reading N (>0) -many bytes from a
/// SHAKE128 xof state, which is obtained by absorbing a short public seed. Two instances
/// constructed from the same seed produce the exact same byte stream - this is what lets
/// the server and every client independently derive an identical public matrix A.
pub struct Prng {
    reader: Shake128Reader,
}

impl Prng {
    pub fn new(seed: &[u8]) -> Prng {
        let mut hasher = Shake128::default();
        hasher.update(seed);

        Prng { reader: hasher.finalize_xof() }
    }

    /// Fills `bytes` with the next bytes of the stream.
    pub fn generate(&mut self, bytes: &mut [u8]) {
        self.reader.read(bytes);
    }
}

/// Cryptographically secure pseudo random number generator, backed by a TurboSHAKE256
/// xof state, seeded with 32 bytes sampled from the OS entropy source. Used by the client
/// for sampling LWE secret and error vectors, and for minting fresh database seeds.
pub struct Csprng {
    state: TurboShake256,
}

impl Csprng {
    pub fn new() -> Result<Csprng, FrodoPIRError> {
        let mut seed = [0u8; 32];
        OsRng.try_fill_bytes(&mut seed).map_err(|_| FrodoPIRError::EntropySourceFailure)?;

        Ok(Self::from_seed(&seed))
    }

    /// Deterministic construction, for reproducible tests and benchmarks. Don't use this
    /// for live queries - secret vectors sampled from a guessable seed break query privacy.
    pub fn from_seed(seed: &[u8]) -> Csprng {
        let mut state = TurboShake256::default();
        state.absorb(seed);
        state.finalize::<{ TurboShake256::DEFAULT_DOMAIN_SEPARATOR }>();

        Csprng { state }
    }

    /// Fills `bytes` with the next bytes of the stream.
    pub fn generate(&mut self, bytes: &mut [u8]) {
        self.state.squeeze(bytes);
    }
}
