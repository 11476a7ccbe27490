// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::affinity::{MemoryAffinity, PinnedAffinity};
use crate::core::ThreadAware;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use std::{collections::HashMap, path::PathBuf};

// To make impl_transfer(...) work
macro_rules! impl_transfer {
    ($t:ty) => {
        impl ThreadAware for $t {
            fn relocated(self, _source: MemoryAffinity, _destination: PinnedAffinity) -> Self {
                self
            }
        }
    };
}

impl_transfer!(bool);
impl_transfer!(u8);
impl_transfer!(u16);
impl_transfer!(u32);
impl_transfer!(u64);
impl_transfer!(i8);
impl_transfer!(i16);
impl_transfer!(i32);
impl_transfer!(i64);
impl_transfer!(usize);
impl_transfer!(isize);
impl_transfer!(f32);
impl_transfer!(f64);
impl_transfer!(char);

impl_transfer!(String);
impl_transfer!(PathBuf);
impl_transfer!(Duration);
impl_transfer!(&Path);

impl_transfer!(&'static str);

// We need to implement `ThreadAware` for tuples ranging from 0 to 12 elements
macro_rules! impl_transfer_tuple {
    ($head:ident, $($tail:ident,)*) => {
        impl<$head, $($tail),*> ThreadAware for ($head, $($tail),*)
            where
                $head: ThreadAware,
                $($tail: ThreadAware),*
                {
                    fn relocated(self, source: MemoryAffinity, destination: PinnedAffinity) -> Self {
                        #[expect(non_snake_case, reason = "Macro-generated code uses uppercase identifiers for tuple elements")]
                        let ($head, $($tail),*) = self;
                        (
                            $head.relocated(source, destination),
                            $( $tail.relocated(source, destination), )*
                        )
                    }
                }

                // Recursively call the macro for the rest of the tuple
                impl_transfer_tuple!($($tail,)*);
    };

    () => {
        impl ThreadAware for () {
            fn relocated(self, _source: MemoryAffinity, _destination: PinnedAffinity) -> Self {
                self
            }
        }
    };
}

impl_transfer_tuple!(A, B, C, D, E, F, G, H, I, J, K, L,);

macro_rules! impl_transfer_fn {
    ($head:ident, $($tail:ident,)*) => {
        impl<R, $head, $($tail),*> ThreadAware for fn($head, $($tail),*) -> R {
            fn relocated(self, _source: MemoryAffinity, _destination: PinnedAffinity) -> Self {
                self
            }
        }

        // Recursively call the macro for the rest of the function parameters
        impl_transfer_fn!($($tail,)*);
    };
    () => {
        impl<R> ThreadAware for fn() -> R {
            fn relocated(self, _source: MemoryAffinity, _destination: PinnedAffinity) -> Self {
                self
            }
        }
    }
}

impl_transfer_fn!(A, B, C, D, E, F, G, H, I, J, K, L,);

//TODO impl_transfer_array! macro to implement ThreadAware for arrays

impl<T> ThreadAware for Option<T>
where
    T: ThreadAware,
{
    fn relocated(self, source: MemoryAffinity, destination: PinnedAffinity) -> Self {
        self.map(|value| value.relocated(source, destination))
    }
}

impl<T, E> ThreadAware for Result<T, E>
where
    T: ThreadAware,
    E: ThreadAware,
{
    fn relocated(self, source: MemoryAffinity, destination: PinnedAffinity) -> Self {
        match self {
            Ok(value) => Ok(value.relocated(source, destination)),
            Err(err) => Err(err.relocated(source, destination)),
        }
    }
}

impl<T> ThreadAware for Vec<T>
where
    T: ThreadAware,
{
    fn relocated(self, source: MemoryAffinity, destination: PinnedAffinity) -> Self {
        let mut result = Self::with_capacity(self.len());
        for value in self {
            result.push(value.relocated(source, destination));
        }
        result
    }
}

// TODO: We should probably support custom hashers as well.
#[expect(
    clippy::implicit_hasher,
    reason = "Supporting custom hashers would complicate the implementation significantly."
)]
impl<K, V> ThreadAware for HashMap<K, V>
where
    K: ThreadAware + Eq + std::hash::Hash,
    V: ThreadAware,
{
    fn relocated(self, source: MemoryAffinity, destination: PinnedAffinity) -> Self {
        let mut result = Self::with_capacity(self.len());
        for (key, value) in self {
            result.insert(key.relocated(source, destination), value.relocated(source, destination));
        }
        result
    }
}

impl<T> ThreadAware for Arc<T> {
    fn relocated(self, _source: MemoryAffinity, _destination: PinnedAffinity) -> Self {
        self
    }
}
