use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::collection::DescriptorCollection;
use crate::config::CsvFormat;
use crate::error::{DescriptorError, DescriptorResult};
use crate::types::ImageDescriptor;

pub const EXTENDED_HEADER: [&str; 13] = [
    "Area", "Perimeter", "roundness", "cx", "cy", "orientation", "h0", "h1", "h2", "h3", "h4", "h5", "h6",
];

pub const LEGACY_HEADER: [&str; 4] = ["Area", "Perimeter", "roundness", "orientation"];

impl CsvFormat {
    pub fn header(&self) -> &'static [&'static str] {
        match self {
            CsvFormat::Extended => &EXTENDED_HEADER,
            CsvFormat::Legacy => &LEGACY_HEADER,
        }
    }

    fn record(&self, d: &ImageDescriptor) -> Vec<String> {
        match self {
            CsvFormat::Legacy => vec![
                d.area.to_string(),
                d.perimeter.to_string(),
                d.roundness.to_string(),
                d.orientation.to_string(),
            ],
            CsvFormat::Extended => {
                let mut row = vec![
                    d.area.to_string(),
                    d.perimeter.to_string(),
                    d.roundness.to_string(),
                    d.centroid.0.to_string(),
                    d.centroid.1.to_string(),
                    d.orientation.to_string(),
                ];
                match &d.hu_moments {
                    Some(hu) => row.extend(hu.iter().map(|h| h.to_string())),
                    None => row.extend(std::iter::repeat_n(String::new(), 7)),
                }
                row
            }
        }
    }
}

impl DescriptorCollection {
    /// Header row followed by one row per descriptor, in collection order
    pub fn write_csv_to<W: Write>(&self, writer: W, format: CsvFormat) -> DescriptorResult<()> {
        let mut wtr = csv::WriterBuilder::new().from_writer(writer);
        wtr.write_record(format.header())?;
        for descriptor in self.iter() {
            wtr.write_record(format.record(descriptor))?;
        }
        wtr.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    /// Write to `path`, creating missing parent directories and truncating an existing file
    pub fn write_csv<P: AsRef<Path>>(&self, path: P, format: CsvFormat) -> DescriptorResult<()> {
        let path = path.as_ref();
        let io_err = |source| DescriptorError::Io { path: path.to_path_buf(), source };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let file = File::create(path).map_err(io_err)?;
        self.write_csv_to(file, format)?;
        log::info!("wrote {} descriptors to {}", self.len(), path.display());
        Ok(())
    }

    pub fn to_csv_string(&self, format: CsvFormat) -> DescriptorResult<String> {
        let mut buf = Vec::new();
        self.write_csv_to(&mut buf, format)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(hu: Option<[f64; 7]>) -> ImageDescriptor {
        ImageDescriptor {
            area: 1256.5,
            perimeter: 128.25,
            roundness: 0.96,
            orientation: -12.5,
            centroid: (50, 49),
            is_convex: true,
            hu_moments: hu,
        }
    }

    #[test]
    fn test_empty_collection_is_header_only() {
        let csv = DescriptorCollection::new().to_csv_string(CsvFormat::Extended).unwrap();
        assert_eq!(csv, "Area,Perimeter,roundness,cx,cy,orientation,h0,h1,h2,h3,h4,h5,h6\n");

        let csv = DescriptorCollection::new().to_csv_string(CsvFormat::Legacy).unwrap();
        assert_eq!(csv, "Area,Perimeter,roundness,orientation\n");
    }

    #[test]
    fn test_legacy_keeps_every_row() {
        let collection: DescriptorCollection = vec![sample(None), sample(None)].into_iter().collect();
        let csv = collection.to_csv_string(CsvFormat::Legacy).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "1256.5,128.25,0.96,-12.5");
    }

    #[test]
    fn test_extended_row_layout() {
        let hu = [0.5, 1.0, 2.0, 3.0, 4.0, 5.0, -6.0];
        let collection: DescriptorCollection = vec![sample(Some(hu)), sample(None)].into_iter().collect();
        let csv = collection.to_csv_string(CsvFormat::Extended).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[1], "1256.5,128.25,0.96,50,49,-12.5,0.5,1,2,3,4,5,-6");
        assert_eq!(lines[2], "1256.5,128.25,0.96,50,49,-12.5,,,,,,,");
    }

    #[test]
    fn test_write_creates_directory_and_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("image.csv");

        let two: DescriptorCollection = vec![sample(None), sample(None)].into_iter().collect();
        two.write_csv(&path, CsvFormat::Legacy).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 3);

        DescriptorCollection::new().write_csv(&path, CsvFormat::Legacy).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 1);
    }

    #[test]
    fn test_unwritable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        // a directory cannot be opened as a file
        let result = DescriptorCollection::new().write_csv(dir.path(), CsvFormat::Extended);
        match result {
            Err(DescriptorError::Io { path, .. }) => assert_eq!(path, dir.path()),
            other => panic!("expected Io error, got {:?}", other),
        }
    }
}
