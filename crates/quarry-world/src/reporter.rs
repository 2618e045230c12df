//! User-facing response channel.

/// Delivers messages to the user (in-game chat in a live deployment).
pub trait Reporter: Send + Sync {
    /// Send one message.
    fn say(&self, message: &str);
}
