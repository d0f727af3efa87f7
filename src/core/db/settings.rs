use std::future::Future;

use crate::models::Theme;

pub(super) const THEME_KEY: &str = "theme";

pub trait SettingsRepository {
    /// The stored theme, or [`Theme::System`] when none was chosen yet.
    fn get_theme(&self) -> impl Future<Output = anyhow::Result<Theme>> + Send;
    fn set_theme(&self, theme: Theme) -> impl Future<Output = anyhow::Result<()>> + Send;
}
