use crate::app::{App, Message, Model, ToastLevel};
use crate::export::{ExportFormat, export_tree};

impl App {
    /// Work that touches the outside world, run after `update`.
    pub(super) fn handle_message_side_effects(model: &mut Model, msg: &Message) {
        if let Message::Export(format) = msg {
            Self::export(model, *format);
        }
    }

    fn export(model: &mut Model, format: ExportFormat) {
        let result = model
            .render_tree()
            .map_err(anyhow::Error::from)
            .and_then(|tree| export_tree(&tree, format, &model.export_dir));
        match result {
            Ok(path) => {
                model.show_toast(ToastLevel::Info, format!("Saved {}", path.display()));
            }
            Err(err) => {
                tracing::warn!(format = format.extension(), "export failed: {err:#}");
                model.show_toast(ToastLevel::Error, format!("Export failed: {err:#}"));
            }
        }
    }
}
