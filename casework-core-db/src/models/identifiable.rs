/// Trait for entities that can be uniquely identified
pub trait Identifiable {
    type Id: Copy + Eq + std::hash::Hash + std::fmt::Debug + Send + Sync;

    /// Returns the unique identifier of the entity
    fn get_id(&self) -> Self::Id;
}
