use crate::model::Measurement;
use crate::prelude::{StoreError, StoreResult};

/// Column layout of the storage and export format.
pub const TABLE_COLUMNS: [&str; 5] = ["lat", "lon", "value", "unit", "time"];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parses a comma-separated table with a `lat,lon,value,unit,time` header.
///
/// Columns are matched by name, so extra or reordered columns are accepted.
/// A missing column or an unparsable row is reported as
/// [`StoreError::Malformed`] naming the offending line.
pub fn parse_table(bytes: &[u8]) -> StoreResult<Vec<Measurement>> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|err| StoreError::Malformed(format!("unreadable header row: {err}")))?
        .clone();
    let missing = TABLE_COLUMNS
        .iter()
        .copied()
        .filter(|column| !headers.iter().any(|header| header == *column))
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        return Err(StoreError::Malformed(format!(
            "missing column(s): {}",
            missing.join(", ")
        )));
    }

    let mut records = Vec::new();
    for (index, row) in reader.deserialize::<Measurement>().enumerate() {
        let record = row.map_err(|err| {
            let at = match err.position() {
                Some(position) => format!("line {}", position.line()),
                None => format!("record {}", index + 1),
            };
            StoreError::Malformed(format!("{at}: {err}"))
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Serializes the table, always including the header row.
pub fn write_table(records: &[Measurement]) -> StoreResult<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(TABLE_COLUMNS)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer
        .into_inner()
        .map_err(|err| StoreError::Encoding(csv::Error::from(err.into_error())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GeoPoint;

    fn sample() -> Vec<Measurement> {
        vec![
            Measurement::new(GeoPoint::new(50.45, 30.52), 0.15, "µSv/h", "01.01.2025 12:00"),
            Measurement::new(
                GeoPoint::new(-33.8688197, 151.2092955),
                1.0e-3,
                "mSv/h",
                "edited, with comma",
            ),
        ]
    }

    #[test]
    fn parses_legacy_table() {
        let input = "lat,lon,value,unit,time\n50.45000,30.52000,0.15,мкЗв/год,01.01.2025 12:00\n";
        let records = parse_table(input.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].latitude, 50.45);
        assert_eq!(records[0].longitude, 30.52);
        assert_eq!(records[0].unit, "мкЗв/год");
        assert_eq!(records[0].time, "01.01.2025 12:00");
    }

    #[test]
    fn written_table_parses_back_identically() {
        let records = sample();
        let bytes = write_table(&records).unwrap();
        assert_eq!(parse_table(&bytes).unwrap(), records);
    }

    #[test]
    fn empty_table_still_has_header() {
        let bytes = write_table(&[]).unwrap();
        assert_eq!(String::from_utf8(bytes.clone()).unwrap(), "lat,lon,value,unit,time\n");
        assert!(parse_table(&bytes).unwrap().is_empty());
    }

    #[test]
    fn blank_input_is_empty_table() {
        assert!(parse_table(b"").unwrap().is_empty());
        assert!(parse_table(b"\n  \n").unwrap().is_empty());
    }

    #[test]
    fn tolerates_bom_and_column_order() {
        let input = "\u{feff}time,unit,value,lon,lat\nnoon,mSv/h,2.5,30.0,50.0\n";
        let records = parse_table(input.as_bytes()).unwrap();
        assert_eq!(records[0].position(), GeoPoint::new(50.0, 30.0));
        assert_eq!(records[0].value, 2.5);
    }

    #[test]
    fn missing_column_is_reported() {
        let err = parse_table(b"lat,lon,value\n1,2,3\n").unwrap_err();
        assert!(err.is_bad_input());
        assert!(err.to_string().contains("unit, time"));
    }

    #[test]
    fn bad_number_names_line() {
        let input = "lat,lon,value,unit,time\n1,2,3,µSv/h,a\nx,2,3,µSv/h,b\n";
        let err = parse_table(input.as_bytes()).unwrap_err();
        assert!(err.is_bad_input());
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn error_line_counts_blank_and_multiline_rows() {
        let input = "lat,lon,value,unit,time\n\n1,2,3,µSv/h,\"two\nlines\"\nx,2,3,µSv/h,b\n";
        let err = parse_table(input.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 5"), "{err}");
    }

    #[test]
    fn short_row_is_malformed() {
        let input = "lat,lon,value,unit,time\n1,2,3\n";
        assert!(parse_table(input.as_bytes()).unwrap_err().is_bad_input());
    }
}
