// Loading state for async data.

/// Progress of a background load as the UI sees it.
#[derive(Debug, Clone, Default)]
pub enum LoadingState<T> {
    #[default]
    Idle,
    Loading {
        message: String,
        percent: u8,
    },
    Loaded(T),
    Error(String),
}

impl<T> LoadingState<T> {
    pub fn loading(message: impl Into<String>, percent: u8) -> Self {
        LoadingState::Loading {
            message: message.into(),
            percent: percent.min(100),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadingState::Loading { .. })
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadingState::Loaded(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            LoadingState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    /// Apply a progress report. Ignored unless a load is in flight.
    pub fn progress(&mut self, message: &str, percent: u8) {
        if self.is_loading() {
            *self = LoadingState::loading(message, percent);
        }
    }
}
