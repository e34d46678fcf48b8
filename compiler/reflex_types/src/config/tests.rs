use super::*;
use pretty_assertions::assert_eq;

#[test]
fn defaults_are_valid() {
    assert_eq!(RegistryConfig::default().validate(), Ok(()));
    assert_eq!(RegistryConfig::target_32bit().validate(), Ok(()));
}

#[test]
fn default_constants() {
    let cfg = RegistryConfig::default();
    assert_eq!(cfg.ptr_size, 8);
    assert_eq!(cfg.max_ptrmask_bytes, 2048);
    assert_eq!(cfg.prog_chunk_bits, 120);
    assert_eq!(cfg.max_chan_elem_size, 65536);
    assert_eq!(cfg.max_func_args, 50);
    assert_eq!(cfg.map_bucket_count, 8);
    assert_eq!(cfg.max_key_size, 128);
    assert_eq!(cfg.max_elem_size, 128);
}

#[test]
fn rejects_odd_word_size() {
    let cfg = RegistryConfig {
        ptr_size: 2,
        ..RegistryConfig::default()
    };
    assert_eq!(cfg.validate(), Err(ConfigError::PtrSize(2)));
}

#[test]
fn rejects_partial_byte_chunks() {
    for bits in [0, 7, 127, 128] {
        let cfg = RegistryConfig {
            prog_chunk_bits: bits,
            ..RegistryConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ChunkBits(bits)));
    }
}

#[test]
fn bucket_count_must_fill_words() {
    let cfg = RegistryConfig {
        map_bucket_count: 12,
        ..RegistryConfig::default()
    };
    assert_eq!(
        cfg.validate(),
        Err(ConfigError::BucketCount {
            count: 12,
            ptr_size: 8
        })
    );
}

#[test]
fn slot_size_fits_in_a_byte() {
    let cfg = RegistryConfig {
        max_key_size: 256,
        ..RegistryConfig::default()
    };
    assert!(matches!(
        cfg.validate(),
        Err(ConfigError::OutOfRange {
            field: "max_key_size",
            ..
        })
    ));
}
