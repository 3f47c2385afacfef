use std::path::PathBuf;

/// Runtime settings for a single session. There is no file or flag layer;
/// the defaults describe the one dataset this tool cleans.
#[derive(Debug, Clone)]
pub struct Settings {
    pub input_path: PathBuf,
    pub chart_dir: PathBuf,
    pub chart_size: (u32, u32),
    pub preview_rows: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("dirty_cafe_sales.csv"),
            chart_dir: PathBuf::from("charts"),
            chart_size: (1000, 600),
            preview_rows: 5,
        }
    }
}
