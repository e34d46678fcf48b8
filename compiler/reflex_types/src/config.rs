//! Registry configuration.
//!
//! Every layout threshold the synthesizers use lives here instead of in
//! literals. The defaults describe a 64-bit target.

/// Tuned constants for layout and GC map computation.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RegistryConfig {
    /// Machine word size in bytes (4 or 8).
    pub ptr_size: usize,
    /// Arrays up to `max_ptrmask_bytes * 8 * ptr_size` bytes get a literal
    /// pointer mask; larger ones get a GC program.
    pub max_ptrmask_bytes: usize,
    /// Literal bits per GC program chunk. Must be a multiple of 8 below 128.
    pub prog_chunk_bits: usize,
    /// Channel element types must be smaller than this.
    pub max_chan_elem_size: usize,
    /// Ceiling on the total number of function inputs and outputs.
    pub max_func_args: usize,
    /// Key/value slots per map bucket.
    pub map_bucket_count: usize,
    /// Keys larger than this are stored indirectly in map buckets.
    pub max_key_size: usize,
    /// Values larger than this are stored indirectly in map buckets.
    pub max_elem_size: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        RegistryConfig {
            ptr_size: 8,
            max_ptrmask_bytes: 2048,
            prog_chunk_bits: 120,
            max_chan_elem_size: 1 << 16,
            max_func_args: 50,
            map_bucket_count: 8,
            max_key_size: 128,
            max_elem_size: 128,
        }
    }
}

/// Inconsistent configuration value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("ptr_size must be 4 or 8, got {0}")]
    PtrSize(usize),
    #[error("prog_chunk_bits must be a multiple of 8 in 8..=120, got {0}")]
    ChunkBits(usize),
    #[error("map_bucket_count must be a positive multiple of ptr_size ({ptr_size}), got {count}")]
    BucketCount { count: usize, ptr_size: usize },
    #[error("{field} must be in 1..={max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: usize,
        max: usize,
    },
}

impl RegistryConfig {
    /// Configuration for a 32-bit target.
    pub fn target_32bit() -> Self {
        RegistryConfig {
            ptr_size: 4,
            ..Self::default()
        }
    }

    /// Reject values that would produce inconsistent layouts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ptr_size != 4 && self.ptr_size != 8 {
            return Err(ConfigError::PtrSize(self.ptr_size));
        }
        if self.prog_chunk_bits % 8 != 0 || !(8..=120).contains(&self.prog_chunk_bits) {
            return Err(ConfigError::ChunkBits(self.prog_chunk_bits));
        }
        if self.map_bucket_count == 0 || self.map_bucket_count % self.ptr_size != 0 {
            return Err(ConfigError::BucketCount {
                count: self.map_bucket_count,
                ptr_size: self.ptr_size,
            });
        }
        // Slot sizes are stored in a byte.
        check_range("max_key_size", self.max_key_size, u8::MAX.into())?;
        check_range("max_elem_size", self.max_elem_size, u8::MAX.into())?;
        check_range("max_func_args", self.max_func_args, u16::MAX.into())?;
        check_range("max_ptrmask_bytes", self.max_ptrmask_bytes, 1 << 20)?;
        check_range("max_chan_elem_size", self.max_chan_elem_size, usize::MAX)?;
        Ok(())
    }
}

fn check_range(field: &'static str, value: usize, max: usize) -> Result<(), ConfigError> {
    if value == 0 || value > max {
        return Err(ConfigError::OutOfRange { field, value, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests;
