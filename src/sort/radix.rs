//! LSD radix sort, base 10, on the non-negative integer key of each value.
//!
//! The comparator is not consulted: keys always end up ascending. Values
//! without a key are reported before anything moves.
use super::Tracker;
use crate::error::{Result, SortError};
use crate::value::RadixKey;

const BASE: u64 = 10;

pub(super) fn sort<T: Clone + RadixKey>(tracker: &mut Tracker<'_, T>) -> Result<()> {
    let len = tracker.len();
    let mut values = Vec::with_capacity(len);
    tracker.read_range_into(0, len, &mut values)?;
    let mut keyed = Vec::with_capacity(len);
    for value in values {
        match value.radix_key() {
            Some(key) => keyed.push((key, value)),
            None => return Err(SortError::UnsupportedType(value.kind())),
        }
    }
    let max = keyed.iter().map(|(key, _)| *key).max().unwrap_or(0);

    let mut buckets: Vec<Vec<(u64, T)>> = (0..BASE).map(|_| Vec::new()).collect();
    let mut exp = 1u64;
    loop {
        for (key, value) in keyed.drain(..) {
            buckets[((key / exp) % BASE) as usize].push((key, value));
        }
        for bucket in buckets.iter_mut() {
            keyed.append(bucket);
        }
        for (index, (_, value)) in keyed.iter().enumerate() {
            tracker.write(index, value.clone())?;
            tracker.step(Some(value));
        }
        match exp.checked_mul(BASE) {
            Some(next) if max / next > 0 => exp = next,
            _ => return Ok(()),
        }
    }
}
