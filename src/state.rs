use std::sync::Arc;
use crate::rate_limit::AdmissionController;
// app's shared state

#[derive(Clone)]
pub struct AppState {
    pub admission: Arc<AdmissionController>, // per-client request admission
}

impl AppState {
    pub fn new(admission: Arc<AdmissionController>) -> Self {
        Self { admission }
    }
}
