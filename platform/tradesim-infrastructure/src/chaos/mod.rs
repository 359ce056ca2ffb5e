use std::path::PathBuf;
use tradesim_domain::repositories::chaos::ChaosSignal;

/// Chaos is on while a marker file exists; checked on every call.
#[derive(Debug, Clone)]
pub struct MarkerFileChaosSignal {
    path: PathBuf,
}

impl MarkerFileChaosSignal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ChaosSignal for MarkerFileChaosSignal {
    fn is_active(&self) -> bool {
        self.path.exists()
    }
}
