//! Hash and equality policies for table keys.
//!
//! The table takes two independent customization points: a [`HashPolicy`]
//! mapping a key to a `u64` hash word and an [`EqPolicy`] comparing two
//! keys. Both are bound to the key type; equality in particular must never
//! be parameterized on the value type, since it only ever compares keys
//! during chain search.
//!
//! The defaults are zero-sized: [`DefaultHash`] dispatches through
//! [`KeyHash`] (identity cast for integer scalars, Murmur3 for byte
//! sequences) and [`DefaultEq`] uses `PartialEq`.

use crate::hash::murmur3_32;
use crate::slice::Slice;

/// Maps a key to the table's hash word.
pub trait HashPolicy<K: ?Sized> {
    fn hash(&self, key: &K) -> u64;
}

/// Decides whether two keys are the same key.
pub trait EqPolicy<K: ?Sized> {
    fn eq(&self, a: &K, b: &K) -> bool;
}

/// Default hash policy: delegates to the key's [`KeyHash`] impl.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultHash;

impl<K: ?Sized + KeyHash> HashPolicy<K> for DefaultHash {
    #[inline]
    fn hash(&self, key: &K) -> u64 {
        key.key_hash()
    }
}

/// Default equality policy: native `PartialEq` between two keys.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultEq;

impl<K: ?Sized + PartialEq> EqPolicy<K> for DefaultEq {
    #[inline]
    fn eq(&self, a: &K, b: &K) -> bool {
        a == b
    }
}

/// Per-type default hash used by [`DefaultHash`].
///
/// Integer scalars hash to themselves (identity cast); byte-sequence keys
/// hash their bytes with Murmur3 under the default seed.
pub trait KeyHash {
    fn key_hash(&self) -> u64;
}

macro_rules! identity_key_hash {
    ($($t:ty),*) => {
        $(impl KeyHash for $t {
            #[inline]
            fn key_hash(&self) -> u64 {
                *self as u64
            }
        })*
    };
}

identity_key_hash!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

impl KeyHash for [u8] {
    #[inline]
    fn key_hash(&self) -> u64 {
        u64::from(murmur3_32(self))
    }
}

impl KeyHash for str {
    #[inline]
    fn key_hash(&self) -> u64 {
        u64::from(murmur3_32(self.as_bytes()))
    }
}

impl KeyHash for String {
    #[inline]
    fn key_hash(&self) -> u64 {
        self.as_str().key_hash()
    }
}

impl KeyHash for Vec<u8> {
    #[inline]
    fn key_hash(&self) -> u64 {
        self.as_slice().key_hash()
    }
}

impl KeyHash for Slice<'_> {
    #[inline]
    fn key_hash(&self) -> u64 {
        u64::from(murmur3_32(self.data()))
    }
}

impl<T: ?Sized + KeyHash> KeyHash for &T {
    #[inline]
    fn key_hash(&self) -> u64 {
        (**self).key_hash()
    }
}
