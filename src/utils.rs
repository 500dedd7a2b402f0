/// Interprets up to 8 bytes as a big-endian unsigned integer.
pub(crate) fn bytes_to_u64(bytes: &[u8]) -> u64 {
    debug_assert!(bytes.len() <= 8);
    bytes.iter().fold(0_u64, |acc, &b| (acc << 8) | b as u64)
}

/// A mask keeping the `bits` least significant bits of a `u64`.
pub(crate) const fn low_bits_mask(bits: usize) -> u64 {
    if bits >= 64 {
        !0_u64
    } else {
        (1_u64 << bits) - 1
    }
}

pub(crate) fn set_u32_at(array: &mut [u8], value: u32, start_index: usize) {
    array[start_index..start_index + 4].copy_from_slice(&value.to_be_bytes());
}

pub(crate) fn set_u64_at(array: &mut [u8], value: u64, start_index: usize) {
    array[start_index..start_index + 8].copy_from_slice(&value.to_be_bytes());
}

/// Defines a byte container whose length is fixed by a [`ParameterSet`] constant.
///
/// [`ParameterSet`]: crate::params::ParameterSet
macro_rules! sized_bytes_struct {
    ($(#[$meta: meta])* $type: ident, $size: ident) => {
        $(#[$meta])*
        ///
        /// The bytes are wiped from memory when the value is dropped. Cloning is supported
        /// but should be done cautiously, as it duplicates the data in memory. Equality is
        /// evaluated in constant time. Serialization is provided via the `serialization`
        /// feature.
        pub struct $type<P: ParameterSet> {
            bytes: Vec<u8>,
            _params: PhantomData<P>,
        }

        impl<P: ParameterSet> $type<P> {
            /// Byte length of this value under the parameter set `P`.
            pub const BYTES: usize = P::$size;

            pub(crate) fn from_vec(bytes: Vec<u8>) -> Self {
                debug_assert_eq!(bytes.len(), P::$size);
                Self {
                    bytes,
                    _params: PhantomData,
                }
            }

            /// Returns a copy of the underlying bytes.
            pub fn to_bytes(&self) -> Vec<u8> {
                self.bytes.clone()
            }
        }

        impl<P: ParameterSet> Clone for $type<P> {
            fn clone(&self) -> Self {
                Self::from_vec(self.bytes.clone())
            }
        }

        impl<P: ParameterSet> AsRef<[u8]> for $type<P> {
            fn as_ref(&self) -> &[u8] {
                &self.bytes
            }
        }

        impl<P: ParameterSet> TryFrom<&[u8]> for $type<P> {
            type Error = Error;
            fn try_from(data: &[u8]) -> Result<$type<P>> {
                if data.len() != P::$size {
                    Err(Error::BadLength(P::$size, data.len()))
                } else {
                    Ok(Self::from_vec(data.to_vec()))
                }
            }
        }

        impl<P: ParameterSet> PartialEq for $type<P> {
            fn eq(&self, other: &Self) -> bool {
                self.bytes.ct_eq(&other.bytes).into()
            }
        }

        impl<P: ParameterSet> Eq for $type<P> {}

        impl<P: ParameterSet> std::fmt::Debug for $type<P> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($type))
                    .field("params", &P::NAME)
                    .field("len", &self.bytes.len())
                    .finish()
            }
        }

        impl<P: ParameterSet> Zeroize for $type<P> {
            fn zeroize(&mut self) {
                self.bytes.zeroize();
            }
        }

        impl<P: ParameterSet> Drop for $type<P> {
            fn drop(&mut self) {
                self.zeroize();
            }
        }

        impl<P: ParameterSet> ZeroizeOnDrop for $type<P> {}

        #[cfg(feature = "serialization")]
        impl<P: ParameterSet> Serialize for $type<P> {
            fn serialize<S: Serializer>(
                &self,
                serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_bytes(&self.bytes)
            }
        }

        #[cfg(feature = "serialization")]
        impl<'de, P: ParameterSet> Deserialize<'de> for $type<P> {
            fn deserialize<D: Deserializer<'de>>(
                deserializer: D,
            ) -> std::result::Result<Self, D::Error> {
                let bytes = Zeroizing::new(Vec::<u8>::deserialize(deserializer)?);
                Self::try_from(bytes.as_slice()).map_err(serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use sized_bytes_struct;
