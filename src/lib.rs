//! chain-hashmap: a single-threaded separate-chaining hash table with
//! pluggable hash/equality policies, plus the byte-slice view and Murmur3
//! hash it builds on.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a dynamically-resizing chained map whose structural invariants
//!   can be audited layer by layer, with no raw-pointer chain plumbing.
//! - Layers:
//!   - `hash`: Murmur3 32-bit over bytes with a seed; the default hasher
//!     for byte-sequence keys. Leaf module, no dependencies.
//!   - `policy`: `HashPolicy`/`EqPolicy` customization points plus the
//!     per-type `KeyHash` defaults (identity cast for integer scalars,
//!     Murmur3 for byte sequences). Both policies bind to the key type;
//!     equality never sees values.
//!   - `slice`: `Slice<'a>`, a non-owning view over an externally-owned
//!     byte range with sub-ranging, prefix tests, and lexicographic
//!     comparison. Its lifetime parameter makes outliving the source
//!     buffer a compile error.
//!   - `chain_hash_map`: `ChainHashMap<K, V, H, E>`, the bucket array of
//!     chain heads over a `SlotMap` node arena.
//!
//! Constraints
//! - Single-threaded: `!Send`/`!Sync` by design (no atomics); external
//!   synchronization is the caller's problem.
//! - Nodes live in a slotmap arena and chains link generational handles,
//!   so unlink/rebuild can never dangle or double-free.
//! - The bucket array never drops below 4 slots; automatic resizes only
//!   double or halve, explicit `resize` accepts any size >= 4.
//! - Insert is get-or-create: at most one node per distinct key.
//!
//! Hasher and rehashing invariants
//! - Each node stores its `u64` hash word at insertion and every rebuild
//!   indexes by the stored hash; the hash policy runs once per
//!   caller-supplied key per operation and never during a rebuild.
//! - References returned by `get_or_insert_default` borrow the table, so
//!   holding one across a later mutating call is rejected at compile time
//!   rather than being documented undefined behavior.
//!
//! Reentrancy policy
//! - Probing runs user code via the policies; a debug-only reentrancy
//!   check at each public entry point panics on nested entry and compiles
//!   away in release builds.
//!
//! Notes and non-goals
//! - `get` keeps the original cache-fill contract: reading an absent key
//!   inserts a default entry. `find` is the side-effect-free lookup.
//! - No persistence, no wire formats, no concurrent access.

mod chain_hash_map;
mod chain_hash_map_proptest;
pub mod hash;
pub mod policy;
mod reentrancy;
pub mod slice;

// Public surface
pub use chain_hash_map::{ChainHashMap, Iter, IterMut, MAX_TABLE_SIZE, MIN_TABLE_SIZE};
pub use policy::{DefaultEq, DefaultHash, EqPolicy, HashPolicy, KeyHash};
pub use slice::Slice;
