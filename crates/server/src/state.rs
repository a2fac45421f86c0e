use service::aus::AuService;

/// Shared handler state. Cloned per request; the store behind `aus` is shared.
#[derive(Clone)]
pub struct AppState {
    pub aus: AuService,
}

impl AppState {
    pub fn new(aus: AuService) -> Self {
        Self { aus }
    }
}
