use crate::domain::model::{Toast, ToastLevel};
use crate::domain::ports::ToastSurface;

/// 終端機版的提示訊息
#[derive(Debug, Default)]
pub struct ConsoleSurface {
    shown: Vec<Toast>,
}

impl ConsoleSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shown(&self) -> &[Toast] {
        &self.shown
    }
}

impl ToastSurface for ConsoleSurface {
    fn show(&mut self, toast: &Toast) {
        let icon = match toast.level {
            ToastLevel::Info => "ℹ️",
            ToastLevel::Success => "✅",
            ToastLevel::Error => "❌",
        };
        eprintln!("{} {}", icon, toast.message);
        self.shown.push(toast.clone());
    }
}
