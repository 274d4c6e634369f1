/// A record with a stable identity.
///
/// Stores key records by this identifier, so it must be assigned before the
/// record is handed to any persistence layer.
pub trait Entity {
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> Self::Id;
}
