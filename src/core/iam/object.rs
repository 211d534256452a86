//! Object-only decoding for policy documents
//!
//! Derived struct impls also accept a JSON array and fill fields by
//! position, so `[]` would parse as an empty policy. Document types route
//! through [`deserialize_object`] instead, which only visits maps.

use serde::de::{value::MapAccessDeserializer, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use std::fmt;
use std::marker::PhantomData;

/// A document type that is only ever written as a JSON object
pub(crate) trait ObjectShape<'de>: Sized {
    const EXPECTING: &'static str;

    fn from_fields<A: MapAccess<'de>>(map: A) -> Result<Self, A::Error>;
}

pub(crate) fn deserialize_object<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: ObjectShape<'de>,
{
    struct ObjectVisitor<T>(PhantomData<T>);

    impl<'de, T: ObjectShape<'de>> Visitor<'de> for ObjectVisitor<T> {
        type Value = T;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(T::EXPECTING)
        }

        fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<T, A::Error> {
            T::from_fields(map)
        }
    }

    deserializer.deserialize_map(ObjectVisitor(PhantomData))
}

/// `"Statement"` holds either one statement object or an array of them
pub(crate) fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    struct OneOrManyVisitor<T>(PhantomData<T>);

    impl<'de, T: Deserialize<'de>> Visitor<'de> for OneOrManyVisitor<T> {
        type Value = Vec<T>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a statement object or an array of statements")
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
            while let Some(item) = seq.next_element::<T>()? {
                items.push(item);
            }
            Ok(items)
        }

        fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
            let item = T::deserialize(MapAccessDeserializer::new(map))?;
            Ok(vec![item])
        }
    }

    deserializer.deserialize_any(OneOrManyVisitor(PhantomData))
}

/// Implement `Serialize`/`Deserialize` for a struct derived with
/// `#[serde(remote = "Self")]`, decoding from JSON objects only
macro_rules! object_serde {
    ($ty:ident, $expecting:literal) => {
        impl<'de> $crate::core::iam::object::ObjectShape<'de> for $ty {
            const EXPECTING: &'static str = $expecting;

            fn from_fields<A: serde::de::MapAccess<'de>>(
                map: A,
            ) -> std::result::Result<Self, A::Error> {
                $ty::deserialize(serde::de::value::MapAccessDeserializer::new(map))
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(
                deserializer: D,
            ) -> std::result::Result<Self, D::Error> {
                $crate::core::iam::object::deserialize_object(deserializer)
            }
        }

        impl serde::Serialize for $ty {
            fn serialize<S: serde::Serializer>(
                &self,
                serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                $ty::serialize(self, serializer)
            }
        }
    };
}

pub(crate) use object_serde;
