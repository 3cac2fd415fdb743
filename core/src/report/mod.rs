pub mod snapshot;

pub use snapshot::{
    escape_html, render_snapshot, report_file_name, SnapshotOptions, CSV_EXPORT_FILE_NAME,
    MARKER_ICON_SVG,
};
