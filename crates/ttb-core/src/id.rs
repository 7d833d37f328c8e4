use std::cmp::Ordering;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::hash::Hash;
use std::hash::Hasher;
use std::marker::PhantomData;

/// Generic ID wrapper providing compile-time type safety over uuid::Uuid.
///
/// `Id<Room>` and `Id<Player>` are distinct types even though both are
/// newtype wrappers around the same `uuid::Uuid` representation, so a
/// room id can never be passed where a player id is expected.
pub struct Id<T> {
    inner: uuid::Uuid,
    marker: PhantomData<T>,
}

impl<T> Id<T> {
    pub fn inner(&self) -> uuid::Uuid {
        self.inner
    }
    /// Cast `Id<T>` to `Id<U>` while preserving the underlying UUID.
    pub fn cast<U>(self) -> Id<U> {
        Id {
            inner: self.inner,
            marker: PhantomData,
        }
    }
}

impl<T> From<Id<T>> for uuid::Uuid {
    fn from(id: Id<T>) -> Self {
        id.inner()
    }
}
impl<T> From<uuid::Uuid> for Id<T> {
    fn from(inner: uuid::Uuid) -> Self {
        Self {
            inner,
            marker: PhantomData,
        }
    }
}

impl<T> std::str::FromStr for Id<T> {
    type Err = uuid::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(uuid::Uuid::parse_str(s)?))
    }
}

impl<T> Default for Id<T> {
    fn default() -> Self {
        Self {
            inner: uuid::Uuid::now_v7(),
            marker: PhantomData,
        }
    }
}

impl<T> Copy for Id<T> {}
impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Eq for Id<T> {}
impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}
impl<T> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Hash for Id<T> {
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        self.inner.hash(state);
    }
}

impl<T> Debug for Id<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Id").field(&self.inner).finish()
    }
}
impl<T> Display for Id<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.inner, f)
    }
}

impl<T> serde::Serialize for Id<T> {
    fn serialize<S: serde::Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        self.inner.serialize(ser)
    }
}
impl<'de, T> serde::Deserialize<'de> for Id<T> {
    fn deserialize<D: serde::Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        Ok(Self::from(uuid::Uuid::deserialize(de)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    struct Room;
    struct Player;

    #[test]
    fn distinct_ids_are_unequal() {
        let a = Id::<Room>::default();
        let b = Id::<Room>::default();
        assert_ne!(a, b);
    }

    #[test]
    fn cast_preserves_uuid() {
        let room = Id::<Room>::default();
        let raw = room.inner();
        let player: Id<Player> = room.cast();
        assert_eq!(player.inner(), raw);
    }

    #[test]
    fn round_trips_through_string() {
        let id = Id::<Room>::default();
        let parsed: Id<Room> = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }
}
