/// External on/off switch for elevated failure injection.
///
/// Implementations must read the underlying signal on every call so an
/// operator can toggle it while the process is running.
pub trait ChaosSignal {
    fn is_active(&self) -> bool;
}

impl<T: ChaosSignal + ?Sized> ChaosSignal for std::sync::Arc<T> {
    fn is_active(&self) -> bool {
        (**self).is_active()
    }
}
