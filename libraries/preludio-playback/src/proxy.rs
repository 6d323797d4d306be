//! Imperative handle onto the mounted adapter
//!
//! Seeks and volume changes cannot be expressed as plain state: they have to
//! reach whatever embed is mounted right now. The controller registers an
//! [`InstanceProxy`] with the orchestrator whenever it mounts an adapter and
//! removes it on teardown, so the orchestrator never holds a handle to a
//! superseded embed.

/// Handle the orchestrator delegates imperative calls to
pub trait InstanceProxy {
    /// Seek to an absolute position in seconds
    fn seek_to(&self, seconds: f64);

    /// Set the output volume (0-100)
    fn set_volume(&self, level: u8);
}
