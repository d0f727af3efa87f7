use std::{
    future::Future,
    path::{Path, PathBuf},
};

use anyhow::Context;

/// Asks the user where an export should be written.
pub trait SaveDialog {
    /// `None` means the user cancelled.
    fn pick_save_path(&self, directory: &Path, file_name: &str) -> impl Future<Output = Option<PathBuf>>;
}

/// Native "Save As" dialog.
#[cfg(feature = "dialog")]
#[derive(Debug, Clone, Copy, Default)]
pub struct RfdSaveDialog;

#[cfg(feature = "dialog")]
impl SaveDialog for RfdSaveDialog {
    async fn pick_save_path(&self, directory: &Path, file_name: &str) -> Option<PathBuf> {
        rfd::AsyncFileDialog::new()
            .set_title("Export Projects")
            .set_directory(directory)
            .set_file_name(file_name)
            .add_filter("Excel Files", &["xlsx"])
            .save_file()
            .await
            .map(|handle| handle.path().to_path_buf())
    }
}

/// First of `base.ext`, `base(1).ext`, `base(2).ext`, ... not present in `directory`.
pub async fn available_filename(directory: &Path, base: &str, ext: &str) -> anyhow::Result<String> {
    let mut index = 0;
    let mut file_name = format!("{}.{}", base, ext);
    while tokio::fs::try_exists(directory.join(&file_name))
        .await
        .with_context(|| format!("Failed to check {:?} in {:?}", file_name, directory))?
    {
        index += 1;
        file_name = format!("{}({}).{}", base, index, ext);
    }
    Ok(file_name)
}
