use foundation::handles::Generation;
use foundation::ids::FeatureId;

/// Receipt for an in-flight geometry fetch.
///
/// Issued by the cache before the fetch starts; the result can only be stored
/// through the ticket, which pins it to the generation it was issued in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GeometryTicket {
    pub identity: FeatureId,
    pub generation: Generation,
}
