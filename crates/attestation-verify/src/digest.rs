//! Streaming file digests

use crate::error::{Error, Result};
use attestation_types::{Digest, HashAlgorithm};
use sha2::{Sha256, Sha384, Sha512};
use std::path::Path;
use tokio::io::AsyncReadExt;

const CHUNK_SIZE: usize = 64 * 1024;

/// Hash a file in a single forward pass without buffering it whole
pub async fn compute_digest(path: impl AsRef<Path>, algorithm: HashAlgorithm) -> Result<Digest> {
    let path = path.as_ref();
    let io_error = |source| Error::Io {
        path: path.display().to_string(),
        source,
    };

    let mut file = tokio::fs::File::open(path).await.map_err(io_error)?;
    let bytes = match algorithm {
        HashAlgorithm::Sha256 => hash_reader::<Sha256>(&mut file).await,
        HashAlgorithm::Sha384 => hash_reader::<Sha384>(&mut file).await,
        HashAlgorithm::Sha512 => hash_reader::<Sha512>(&mut file).await,
    }
    .map_err(io_error)?;

    Ok(Digest::from_bytes(algorithm, &bytes)?)
}

async fn hash_reader<D: sha2::Digest>(
    reader: &mut (impl tokio::io::AsyncRead + Unpin),
) -> std::io::Result<Vec<u8>> {
    let mut hasher = D::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_vec())
}
