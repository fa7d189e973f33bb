use std::convert::TryFrom;
use std::fmt::Debug;
use std::hash::Hash;

use crate::encodings::delta_bitpacked::DeltaInteger;
use crate::errors::Result;

/// Fixed-width types that travel through the plain codec as little-endian bytes.
pub trait NativeType:
    bytemuck::Pod + Debug + Default + PartialEq + PartialOrd + Send + Sync + 'static
{
    type Bytes: AsRef<[u8]> + for<'a> TryFrom<&'a [u8], Error = std::array::TryFromSliceError>;

    fn to_le_bytes(&self) -> Self::Bytes;

    fn from_le_bytes(bytes: Self::Bytes) -> Self;
}

macro_rules! native_type {
    ($type:ty) => {
        impl NativeType for $type {
            type Bytes = [u8; std::mem::size_of::<$type>()];

            #[inline]
            fn to_le_bytes(&self) -> Self::Bytes {
                Self::to_le_bytes(*self)
            }

            #[inline]
            fn from_le_bytes(bytes: Self::Bytes) -> Self {
                Self::from_le_bytes(bytes)
            }
        }
    };
}

native_type!(u8);
native_type!(u16);
native_type!(u32);
native_type!(u64);
native_type!(i8);
native_type!(i16);
native_type!(i32);
native_type!(i64);
native_type!(f32);
native_type!(f64);

pub trait IntegerType: NativeType + Hash + Eq + Ord {}

macro_rules! integer_type {
    ($type:ty) => {
        impl IntegerType for $type {}
    };
}

integer_type!(u8);
integer_type!(u16);
integer_type!(u32);
integer_type!(u64);
integer_type!(i8);
integer_type!(i16);
integer_type!(i32);
integer_type!(i64);

/// A logical integer type and the physical integer stream it is stored on.
///
/// 8 and 16 bit integers as well as `u32` are stored on the 32-bit physical type,
/// `u64` on the 64-bit one. Unsigned 32 and 64 bit values keep their bit pattern;
/// narrower types are range checked when read back.
pub trait ValueType: IntegerType {
    type Physical: DeltaInteger + IntegerType;

    fn from_physical(value: Self::Physical) -> Result<Self>;

    fn to_physical(self) -> Self::Physical;
}

macro_rules! identity_value {
    ($type:ty) => {
        impl ValueType for $type {
            type Physical = $type;

            #[inline]
            fn from_physical(value: Self::Physical) -> Result<Self> {
                Ok(value)
            }

            #[inline]
            fn to_physical(self) -> Self::Physical {
                self
            }
        }
    };
}

macro_rules! narrow_value {
    ($type:ty, $physical:ty) => {
        impl ValueType for $type {
            type Physical = $physical;

            #[inline]
            fn from_physical(value: Self::Physical) -> Result<Self> {
                <$type>::try_from(value).map_err(|_| {
                    range_err!("{} does not fit in {}", value, stringify!($type))
                })
            }

            #[inline]
            fn to_physical(self) -> Self::Physical {
                self as $physical
            }
        }
    };
}

macro_rules! reinterpret_value {
    ($type:ty, $physical:ty) => {
        impl ValueType for $type {
            type Physical = $physical;

            #[inline]
            fn from_physical(value: Self::Physical) -> Result<Self> {
                Ok(value as $type)
            }

            #[inline]
            fn to_physical(self) -> Self::Physical {
                self as $physical
            }
        }
    };
}

identity_value!(i32);
identity_value!(i64);
narrow_value!(i8, i32);
narrow_value!(i16, i32);
narrow_value!(u8, i32);
narrow_value!(u16, i32);
reinterpret_value!(u32, i32);
reinterpret_value!(u64, i64);
