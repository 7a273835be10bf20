//! `POST /api/upload`

use std::collections::BTreeSet;

use axum::extract::Multipart;
use axum::Json;
use tracing::info;

use crate::error::{Error, Result};
use crate::services::spreadsheet::{is_spreadsheet, parse_rows, Row};
use crate::types::UploadResponse;

/// Pull the first file out of a multipart body, enforcing the extension
pub(crate) async fn read_workbook(mut multipart: Multipart) -> Result<(String, Vec<u8>)> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::parse(format!("Invalid multipart body: {}", e)))?
    {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let data = field
            .bytes()
            .await
            .map_err(|e| Error::parse(format!("Failed to read upload: {}", e)))?;
        upload = Some((filename, data.to_vec()));
        break;
    }

    let Some((filename, data)) = upload else {
        return Err(Error::validation("No file provided"));
    };

    if !is_spreadsheet(&filename) {
        return Err(Error::validation(
            "Unsupported file type. Please upload an .xlsx or .xls file.",
        ));
    }

    Ok((filename, data))
}

/// Parse an uploaded workbook into rows of header/value pairs
pub async fn handle_upload(multipart: Multipart) -> Result<Json<UploadResponse>> {
    let (filename, data) = read_workbook(multipart).await?;
    let rows = parse_rows(&data)?;
    info!("Parsed {} rows from {}", rows.len(), filename);

    Ok(Json(UploadResponse {
        count: rows.len(),
        columns: column_names(&rows),
        rows,
    }))
}

fn column_names(rows: &[Row]) -> Vec<String> {
    let mut names = BTreeSet::new();
    for row in rows {
        for key in row.keys() {
            names.insert(key.clone());
        }
    }
    names.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::Request;

    async fn multipart_with_file(filename: &str, bytes: &[u8]) -> Multipart {
        let mut payload = format!(
            "--BOUNDARY\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
            filename
        )
        .into_bytes();
        payload.extend_from_slice(bytes);
        payload.extend_from_slice(b"\r\n--BOUNDARY--\r\n");

        let request = Request::builder()
            .header("content-type", "multipart/form-data; boundary=BOUNDARY")
            .body(Body::from(payload))
            .unwrap();
        Multipart::from_request(request, &()).await.unwrap()
    }

    #[tokio::test]
    async fn test_unsupported_extension_rejected() {
        let multipart = multipart_with_file("stops.csv", b"address\n1 Main St\n").await;
        let result = handle_upload(multipart).await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_unreadable_workbook_is_a_parse_error() {
        let multipart = multipart_with_file("stops.xlsx", b"not a workbook").await;
        let result = handle_upload(multipart).await;
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[tokio::test]
    async fn test_body_without_file_rejected() {
        let payload = b"--BOUNDARY\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--BOUNDARY--\r\n".to_vec();
        let request = Request::builder()
            .header("content-type", "multipart/form-data; boundary=BOUNDARY")
            .body(Body::from(payload))
            .unwrap();
        let multipart = Multipart::from_request(request, &()).await.unwrap();

        let result = handle_upload(multipart).await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_column_names_sorted_and_deduplicated() {
        let rows = vec![
            row(&[("Address", "1 Main St"), ("Name", "A")]),
            row(&[("Address", "2 Main St"), ("Duration", "10")]),
        ];
        assert_eq!(column_names(&rows), vec!["Address", "Duration", "Name"]);
    }

    #[test]
    fn test_column_names_empty() {
        let rows: Vec<HashMap<String, String>> = Vec::new();
        assert!(column_names(&rows).is_empty());
    }
}
