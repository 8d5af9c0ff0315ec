use std::sync::Arc;

use crate::core::config::Settings;
use crate::db::RecordStore;
use crate::services::directory::CourseDirectory;

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    store: Arc<dyn RecordStore>,
    directory: Arc<dyn CourseDirectory>,
}

impl AppState {
    pub(crate) fn new(
        settings: Settings,
        store: Arc<dyn RecordStore>,
        directory: Arc<dyn CourseDirectory>,
    ) -> Self {
        Self { inner: Arc::new(InnerState { settings, store, directory }) }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn store(&self) -> &dyn RecordStore {
        self.inner.store.as_ref()
    }

    pub(crate) fn directory(&self) -> &dyn CourseDirectory {
        self.inner.directory.as_ref()
    }
}
