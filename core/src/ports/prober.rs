//! Port availability prober port (interface).

/// Port for asking the OS whether a TCP port can currently be bound.
///
/// Implementations must not keep the port open. A `false` answer does not say
/// why: "in use", "privileged" and every other failure look the same.
pub trait PortProber: Send + Sync {
    /// Whether `port` can be bound right now.
    fn is_free(&self, port: u16) -> bool;
}

impl<P: PortProber + ?Sized> PortProber for std::sync::Arc<P> {
    fn is_free(&self, port: u16) -> bool {
        (**self).is_free(port)
    }
}
