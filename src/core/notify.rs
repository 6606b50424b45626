use crate::domain::model::{Toast, ToastLevel};
use crate::domain::ports::ToastSurface;
use std::time::{Duration, Instant};

/// 在記憶體中保留所有提示，匯出與測試時使用
impl ToastSurface for Vec<Toast> {
    fn show(&mut self, toast: &Toast) {
        self.push(toast.clone());
    }
}

pub struct Notifier<T: ToastSurface> {
    surface: T,
    throttle: Duration,
    last_error: Option<(String, Instant)>,
}

impl<T: ToastSurface> Notifier<T> {
    pub fn new(surface: T, throttle: Duration) -> Self {
        Self {
            surface,
            throttle,
            last_error: None,
        }
    }

    pub fn info(&mut self, message: &str) {
        self.show(ToastLevel::Info, message);
    }

    pub fn success(&mut self, message: &str) {
        self.show(ToastLevel::Success, message);
    }

    /// 視窗內連續出現相同錯誤只顯示一次；回傳是否真的顯示
    pub fn error(&mut self, message: &str) -> bool {
        self.error_at(message, Instant::now())
    }

    fn error_at(&mut self, message: &str, now: Instant) -> bool {
        if let Some((last, shown_at)) = &self.last_error {
            if last == message && now.saturating_duration_since(*shown_at) < self.throttle {
                tracing::debug!("Suppressed repeated error toast: {}", message);
                return false;
            }
        }

        self.last_error = Some((message.to_string(), now));
        self.show(ToastLevel::Error, message);
        true
    }

    fn show(&mut self, level: ToastLevel, message: &str) {
        self.surface.show(&Toast {
            level,
            message: message.to_string(),
        });
    }

    pub fn surface(&self) -> &T {
        &self.surface
    }

    pub fn into_surface(self) -> T {
        self.surface
    }
}

#[derive(Debug, Default)]
pub struct LoadingIndicator {
    message: Option<String>,
}

impl LoadingIndicator {
    pub fn show(&mut self, message: &str) {
        tracing::info!("⏳ {}", message);
        self.message = Some(message.to_string());
    }

    pub fn hide(&mut self) {
        self.message = None;
    }

    pub fn is_visible(&self) -> bool {
        self.message.is_some()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}
