use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info, warn};
use once_cell::sync::{Lazy, OnceCell};

use super::model::Survey;
use super::{recode, select};
use crate::error::{Result, SurveyError};

/// Public location of the GSS 2018 extract.
pub const GSS_2018_URL: &str =
    "https://github.com/jkropko/DS-6001/raw/master/localdata/gss2018.csv";

/// Survey-specific tokens that mean "no answer" in any column.
pub const MISSING_TOKENS: [&str; 7] = [
    "IAP",
    "IAP,DK,NA,uncodeable",
    "IAP, DK, NA, uncodeable",
    "NOT SURE",
    "DK",
    ".a",
    "CAN'T CHOOSE",
];

/// Spellings a dataframe CSV reader treats as missing out of the box.
const DEFAULT_NA: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_missing(field: &str) -> bool {
    MISSING_TOKENS.contains(&field) || DEFAULT_NA.contains(&field)
}

// ---------------------------------------------------------------------------
// RawTable – parsed CSV before any recoding
// ---------------------------------------------------------------------------

/// Header plus rows of optional text cells; `None` is the null marker.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Decode a Windows-1252 CSV payload into a [`RawTable`], mapping missing
/// tokens to `None`.
pub fn parse_payload(bytes: &[u8]) -> Result<RawTable> {
    if bytes.is_empty() {
        return Err(SurveyError::UnparseablePayload("empty payload".into()));
    }
    let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(SurveyError::UnparseablePayload("missing header row".into()));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|field| (!is_missing(field)).then(|| field.to_string()))
                .collect(),
        );
    }

    Ok(RawTable::new(headers, rows))
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Where the raw survey bytes come from.
pub trait DataSource: Send + Sync {
    /// Human-readable location, used in logs and errors.
    fn name(&self) -> String;

    /// Retrieve the full payload.
    fn fetch(&self) -> Result<Vec<u8>>;
}

impl<S: DataSource + ?Sized> DataSource for Box<S> {
    fn name(&self) -> String {
        (**self).name()
    }

    fn fetch(&self) -> Result<Vec<u8>> {
        (**self).fetch()
    }
}

/// HTTP(S) download with a blocking client.
#[derive(Debug, Clone)]
pub struct HttpSource {
    url: String,
    accept_invalid_certs: bool,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            accept_invalid_certs: false,
        }
    }

    /// The published GSS 2018 extract. Its host presents a certificate chain
    /// that is not always trusted locally, so validation starts disabled;
    /// call [`HttpSource::accept_invalid_certs`] with `false` to enforce it.
    pub fn gss_2018() -> Self {
        Self::new(GSS_2018_URL).accept_invalid_certs(true)
    }

    /// Skip TLS certificate validation. Insecure; every fetch logs a warning.
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn unreachable(&self, reason: impl ToString) -> SurveyError {
        SurveyError::UnreachableSource {
            source_name: self.url.clone(),
            reason: reason.to_string(),
        }
    }
}

impl DataSource for HttpSource {
    fn name(&self) -> String {
        self.url.clone()
    }

    fn fetch(&self) -> Result<Vec<u8>> {
        if self.accept_invalid_certs {
            warn!(
                "TLS certificate validation is disabled for {}; the payload is not authenticated",
                self.url
            );
        }
        let client = reqwest::blocking::Client::builder()
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .build()
            .map_err(|e| self.unreachable(e))?;

        let response = client
            .get(&self.url)
            .send()
            .map_err(|e| self.unreachable(e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(self.unreachable(format!("HTTP status {status}")));
        }

        let body = response.bytes().map_err(|e| self.unreachable(e))?;
        debug!("downloaded {} bytes from {}", body.len(), self.url);
        Ok(body.to_vec())
    }
}

/// A local copy of the survey CSV.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl DataSource for FileSource {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> Result<Vec<u8>> {
        std::fs::read(&self.path).map_err(|e| SurveyError::UnreachableSource {
            source_name: self.name(),
            reason: e.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Preparation pipeline and memoization
// ---------------------------------------------------------------------------

/// Fetch, parse, select/rename and recode in one pass.
pub fn load_survey<S: DataSource + ?Sized>(source: &S) -> Result<Survey> {
    info!("loading survey from {}", source.name());
    let bytes = source.fetch()?;
    let raw = parse_payload(&bytes)?;
    debug!("parsed {} rows x {} columns", raw.len(), raw.headers().len());

    let selected = select::select_columns(&raw)?;
    let survey = recode::recode(&selected)?;
    info!("prepared {} respondents", survey.len());
    Ok(survey)
}

/// Builds the survey at most once and hands out shared read-only handles.
///
/// Concurrent first callers block on the single in-flight load and receive
/// the same `Arc`. A failed load leaves the cache empty, so a later call
/// retries.
pub struct SurveyCache<S> {
    source: S,
    cell: OnceCell<Arc<Survey>>,
}

impl<S: DataSource> SurveyCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cell: OnceCell::new(),
        }
    }

    pub fn get(&self) -> Result<Arc<Survey>> {
        self.cell
            .get_or_try_init(|| load_survey(&self.source).map(Arc::new))
            .map(Arc::clone)
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

static GSS_2018: Lazy<SurveyCache<HttpSource>> =
    Lazy::new(|| SurveyCache::new(HttpSource::gss_2018()));

/// Process-wide prepared GSS 2018 survey, fetched on first use.
pub fn gss_2018() -> Result<Arc<Survey>> {
    GSS_2018.get()
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    use super::*;

    /// Answer a single HTTP request on a local port with `response`.
    fn serve_once(response: &'static str) -> (String, thread::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/gss2018.csv", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request: Vec<u8> = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            stream.write_all(response.as_bytes()).unwrap();
        });
        (url, handle)
    }

    #[test]
    fn missing_tokens_become_null() {
        let payload = b"id,sex,satjob,fefam\n\
            1,male,IAP,DK\n\
            2,female,\"IAP,DK,NA,uncodeable\",\"IAP, DK, NA, uncodeable\"\n\
            3,NOT SURE,.a,CAN'T CHOOSE\n\
            4,,NA,agree\n";
        let table = parse_payload(payload).unwrap();
        assert_eq!(table.len(), 4);
        for row in table.rows() {
            for cell in row.iter().flatten() {
                assert!(!MISSING_TOKENS.contains(&cell.as_str()), "{cell} kept");
            }
        }
        assert_eq!(table.rows()[0][2], None);
        assert_eq!(table.rows()[2][1], None);
        assert_eq!(table.rows()[3][1], None);
        assert_eq!(table.rows()[3][3].as_deref(), Some("agree"));
    }

    #[test]
    fn tokens_are_matched_exactly() {
        let table = parse_payload(b"a,b\nIAPX,dk\n").unwrap();
        assert_eq!(table.rows()[0][0].as_deref(), Some("IAPX"));
        assert_eq!(table.rows()[0][1].as_deref(), Some("dk"));
    }

    #[test]
    fn decodes_windows_1252() {
        // 0x92 is a right single quotation mark in cp1252.
        let table = parse_payload(b"label\nmen\x92s work\n").unwrap();
        assert_eq!(table.rows()[0][0].as_deref(), Some("men\u{2019}s work"));
    }

    #[test]
    fn empty_payload_is_unparseable() {
        let err = parse_payload(b"").unwrap_err();
        assert!(matches!(err, SurveyError::UnparseablePayload(_)));
    }

    #[test]
    fn ragged_rows_are_unparseable() {
        let err = parse_payload(b"a,b,c\n1,2,3\n4,5\n").unwrap_err();
        assert!(matches!(err, SurveyError::UnparseablePayload(_)));
    }

    #[test]
    fn missing_file_is_unreachable() {
        let source = FileSource::new("/definitely/not/here/gss2018.csv");
        let err = source.fetch().unwrap_err();
        assert!(matches!(err, SurveyError::UnreachableSource { .. }));
        assert!(err.is_load_failure());
    }

    #[test]
    fn default_source_is_flagged_insecure() {
        let source = HttpSource::gss_2018();
        assert_eq!(source.url(), GSS_2018_URL);
        assert!(source.accept_invalid_certs);
        assert!(!HttpSource::new(GSS_2018_URL).accept_invalid_certs);
    }

    #[test]
    fn http_error_status_is_unreachable() {
        let (url, server) =
            serve_once("HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        let err = HttpSource::new(url).fetch().unwrap_err();
        server.join().unwrap();
        match err {
            SurveyError::UnreachableSource { reason, .. } => assert!(reason.contains("404"), "{reason}"),
            other => panic!("expected an unreachable source, got {other:?}"),
        }
    }

    #[test]
    fn empty_http_body_is_unparseable() {
        let (url, server) =
            serve_once("HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        let err = load_survey(&HttpSource::new(url)).unwrap_err();
        server.join().unwrap();
        assert!(matches!(err, SurveyError::UnparseablePayload(_)), "{err:?}");
    }
}
