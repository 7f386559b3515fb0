pub(crate) mod private {
    /// Implemented only by this crate's transports.
    pub trait Sealed {}
}
