use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clients::errors::{Error, Result};

// Elements stay as raw JSON so one bad record can't fail the whole batch.
#[derive(Deserialize)]
struct RawEnvelope {
    results: Vec<Value>,
}

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    results: &'a [T],
}

/// Records decoded from a `{ "results": [...] }` response.
#[derive(Debug)]
pub struct Decoded<T> {
    /// Records that decoded, in response order.
    pub records: Vec<T>,
    /// Number of elements dropped because they didn't match `T`.
    pub skipped: usize,
}

/// Decode an iTunes response body.
///
/// A body that isn't an object with a `results` array is an [`Error::Decode`].
/// Individual elements that don't fit `T` are dropped and counted.
pub fn decode_envelope<T: DeserializeOwned>(body: &str) -> Result<Decoded<T>> {
    let envelope: RawEnvelope = serde_json::from_str(body)?;

    let mut records = Vec::with_capacity(envelope.results.len());
    let mut skipped = 0;
    for (index, value) in envelope.results.into_iter().enumerate() {
        match serde_json::from_value::<T>(value) {
            Ok(record) => records.push(record),
            Err(e) => {
                debug!("Skipping result #{index}: {e}");
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        warn!(
            "Dropped {skipped} of {} results that could not be decoded",
            records.len() + skipped
        );
    }

    Ok(Decoded { records, skipped })
}

/// Encode records in the same envelope shape the API returns.
pub fn encode_envelope<T: Serialize>(records: &[T]) -> Result<String> {
    serde_json::to_string_pretty(&EnvelopeRef { results: records }).map_err(Error::from)
}
