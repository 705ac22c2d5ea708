// Delimited text import

use datacat_core::{CellValue, Frame};

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
pub fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // Lines agreeing with the header width, weighted by that width
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// UTF-8 (BOM stripped) or, failing that, Windows-1252.
pub fn decode_bytes(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => match s.strip_prefix('\u{feff}') {
            Some(rest) => rest.to_string(),
            None => s,
        },
        Err(e) => {
            let bytes = e.into_bytes();
            // Excel-exported CSVs on Windows
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    }
}

/// Parse delimited text into a frame. The first record is the header.
pub fn import_from_string(content: &str, delimiter: u8) -> Result<Frame, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();
    let header: Vec<String> = match records.next() {
        Some(record) => record.map_err(|e| e.to_string())?.iter().map(|h| h.trim().to_string()).collect(),
        None => return Ok(Frame::default()),
    };

    let mut rows = Vec::new();
    for result in records {
        let record = result.map_err(|e| e.to_string())?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        rows.push(record.iter().map(CellValue::infer).collect());
    }

    Ok(Frame::from_rows(header, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_semicolon_delimiter() {
        let content = "Name;Age;City\nAlice;30;Paris\nBob;25;London\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_sniff_comma_delimiter() {
        let content = "Name,Age,City\nAlice,30,Paris\nBob,25,London\n";
        assert_eq!(sniff_delimiter(content), b',');
    }

    #[test]
    fn test_sniff_tab_delimiter() {
        let content = "Name\tAge\tCity\nAlice\t30\tParis\nBob\t25\tLondon\n";
        assert_eq!(sniff_delimiter(content), b'\t');
    }

    #[test]
    fn test_sniff_pipe_delimiter() {
        let content = "Name|Age|City\nAlice|30|Paris\nBob|25|London\n";
        assert_eq!(sniff_delimiter(content), b'|');
    }

    #[test]
    fn test_sniff_semicolon_with_commas_in_values() {
        let content = "Name;Address;City\n\"Doe, Jane\";\"123 Main St, Apt 4\";Paris\nBob;\"456 Elm\";London\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_semicolon_csv_import() {
        let content = "codigo;nombre;saldo\n1;Ana;10.5\n2;Luis;\n\n";
        let frame = import_from_string(content, sniff_delimiter(content)).unwrap();
        assert_eq!(frame.column_names(), vec!["codigo", "nombre", "saldo"]);
        assert_eq!(frame.row_count(), 2);
        assert_eq!(frame.columns[0].values[1], Some(CellValue::Int(2)));
        assert_eq!(frame.columns[1].values[0], Some(CellValue::Text("Ana".into())));
        assert_eq!(frame.columns[2].values[0], Some(CellValue::number(10.5)));
        assert_eq!(frame.columns[2].values[1], None);
    }

    #[test]
    fn test_windows_1252_fallback() {
        // "Región" encoded as Windows-1252
        let content = decode_bytes(b"Regi\xf3n,valor\nLima,1\n".to_vec());
        let frame = import_from_string(&content, b',').unwrap();
        assert_eq!(frame.column_names(), vec!["Región", "valor"]);
    }

    #[test]
    fn test_bom_is_stripped() {
        let frame = import_from_string(&decode_bytes(b"\xef\xbb\xbfid,x\n1,2\n".to_vec()), b',').unwrap();
        assert_eq!(frame.column_names(), vec!["id", "x"]);
    }

    #[test]
    fn test_na_fields_are_empty() {
        let frame = import_from_string("codigo,nota\n1,NA\nNULL,ok\n", b',').unwrap();
        assert_eq!(frame.columns[0].values, vec![Some(CellValue::Int(1)), None]);
        assert_eq!(frame.columns[1].values, vec![None, Some(CellValue::Text("ok".into()))]);
    }

    #[test]
    fn test_empty_file_is_empty_frame() {
        let frame = import_from_string("", b',').unwrap();
        assert_eq!(frame.row_count(), 0);
        assert!(frame.columns.is_empty());
    }
}
