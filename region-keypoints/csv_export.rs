use std::fs::File;
use std::io::Write;
use std::path::Path;

use region_core::Keypoint;

use crate::error::{KeypointError, KeypointResult};

pub const KEYPOINT_HEADER: [&str; 7] = ["x", "y", "size", "angle", "response", "octave", "class_id"];

/// Header row followed by one row per keypoint
pub fn write_keypoints_to<W: Write>(keypoints: &[Keypoint], writer: W) -> KeypointResult<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(KEYPOINT_HEADER)?;
    for kp in keypoints {
        wtr.write_record([
            kp.x.to_string(),
            kp.y.to_string(),
            kp.size.to_string(),
            kp.angle.to_string(),
            kp.response.to_string(),
            kp.octave.to_string(),
            kp.class_id.to_string(),
        ])?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Write to `path`, creating missing parent directories and truncating an existing file
pub fn write_keypoints_csv<P: AsRef<Path>>(keypoints: &[Keypoint], path: P) -> KeypointResult<()> {
    let path = path.as_ref();
    let io_err = |source| KeypointError::Io { path: path.to_path_buf(), source };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let file = File::create(path).map_err(io_err)?;
    write_keypoints_to(keypoints, file)?;
    log::info!("wrote {} keypoints to {}", keypoints.len(), path.display());
    Ok(())
}
