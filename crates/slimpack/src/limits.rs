//! Limits for decoding untrusted input and sizing the array pool.

/// Maximum container nesting accepted by the decoder and encoder.
pub const MAX_DEPTH: usize = 512;

/// Largest string, array or map the wire format can describe (32-bit length).
pub const MAX_CONTAINER_LEN: usize = u32::MAX as usize;

/// Arrays of at most this many elements are drawn from the pool.
pub const POOLED_ARRAY_LEN: usize = 15;

/// Upper bound on arrays kept in a pool's free list.
pub const POOL_MAX_RETAINED: usize = 1024;
