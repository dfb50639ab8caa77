//! Anonymised caller identity.
//!
//! A like is keyed by a bcrypt hash of the caller's IP address computed with a
//! fixed, server-held salt. The fixed salt makes the hash deterministic (so it can
//! be used for deduplication) while the bcrypt cost keeps brute-forcing the
//! small IPv4 space expensive.

use std::net::IpAddr;

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use bcrypt::Version;
use thiserror::Error;
use tracing::instrument;

/// bcrypt's radix-64 alphabet, unpadded. The 22nd salt character carries four
/// unused bits, hence the relaxed trailing-bit check.
const BCRYPT_B64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::BCRYPT,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::RequireNone)
        .with_decode_allow_trailing_bits(true),
);

const SALT_CHARS: usize = 22;
const MIN_COST: u32 = 4;
const MAX_COST: u32 = 31;

#[derive(Error, Debug)]
pub enum FingerprintError {
    #[error("invalid bcrypt salt (expected $2b$<cost>$<22 chars>): {0}")]
    InvalidSalt(String),

    #[error("bcrypt hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("hashing worker failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Variant {
    A,
    B,
    Y,
}

impl Variant {
    fn version(self) -> Version {
        match self {
            Variant::A => Version::TwoA,
            Variant::B => Version::TwoB,
            Variant::Y => Version::TwoY,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Fingerprinter {
    variant: Variant,
    cost: u32,
    salt: [u8; 16],
}

impl Fingerprinter {
    /// Parses a bcrypt salt string such as `$2b$10$abcdefghijklmnopqrstuu`.
    pub fn from_salt(salt: &str) -> Result<Self, FingerprintError> {
        let invalid = || FingerprintError::InvalidSalt(salt.to_string());

        let mut parts = salt.trim().split('$');
        let (Some(""), Some(variant), Some(cost), Some(encoded), None) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return Err(invalid());
        };

        let variant = match variant {
            "2a" => Variant::A,
            "2b" => Variant::B,
            "2y" => Variant::Y,
            _ => return Err(invalid()),
        };

        let cost: u32 = cost.parse().map_err(|_| invalid())?;
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(invalid());
        }

        // A full hash is accepted too; only the salt prefix matters.
        let encoded = encoded.get(..SALT_CHARS).ok_or_else(invalid)?;
        let salt: [u8; 16] = BCRYPT_B64
            .decode(encoded)
            .map_err(|_| invalid())?
            .try_into()
            .map_err(|_| invalid())?;

        Ok(Self {
            variant,
            cost,
            salt,
        })
    }

    /// Hashes the caller address on the blocking pool so the bcrypt rounds don't
    /// stall other requests on the runtime.
    #[instrument(skip_all, fields(cost = self.cost), level = "debug")]
    pub async fn fingerprint(&self, ip: IpAddr) -> Result<String, FingerprintError> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.fingerprint_blocking(ip)).await?
    }

    pub fn fingerprint_blocking(&self, ip: IpAddr) -> Result<String, FingerprintError> {
        // IPv4 peers on a dual-stack socket show up as ::ffff:a.b.c.d
        let ip = ip.to_canonical();
        let parts = bcrypt::hash_with_salt(ip.to_string(), self.cost, self.salt)?;
        Ok(parts.format_for_version(self.variant.version()))
    }
}
