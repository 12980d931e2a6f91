use relay_message::Header;
use relay_routing::{InvalidRouting, RoutingKey};

/// Derives the `<namespace>.<type>.<from>.<to>` [`RoutingKey`] a transport
/// uses to name channels/queues for an outgoing envelope of the given
/// message class.
///
/// The namespace segment is the class name's leading dotted component (or
/// the whole name, if it has none); the type segment is its trailing
/// component. A flat, undotted class name (e.g. `"health_check"`) is its own
/// namespace and type, matching the convention `PatternBuilder::type_of`
/// assumes when constraining only the namespace segment.
pub fn routing_key_for(class: &str, header: &Header) -> Result<RoutingKey, InvalidRouting> {
    let namespace = class.split('.').next().unwrap_or(class);
    let type_ = class.rsplit('.').next().unwrap_or(class);

    let from = header.from().ok_or_else(|| InvalidRouting::IllegalSegment {
        field: Box::from("from"),
        segment: Box::from(""),
    })?;

    RoutingKey::compose(namespace, type_, from, header.to().unwrap_or(""))
}
