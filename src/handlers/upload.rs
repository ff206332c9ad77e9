use crate::handlers::Handler;
use crate::http::request::{HttpRequest, Method};
use crate::http::response::HttpResponse;
use crate::pages;
use crate::router::INFO_PATH;
use crate::upload::multipart::MultipartParser;
use crate::upload::storage;
use std::env;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

/// Form field names recognized as file uploads.
const UPLOAD_FIELD_NAMES: [&str; 2] = ["file", "file[]"];

/// One processed file part: the name the client submitted and, in save
/// mode, where it ended up. Lives only while the results page is built.
#[derive(Debug, Clone)]
pub struct UploadRecord {
    pub submitted_name: String,
    pub saved_path: Option<PathBuf>,
}

/// Handler for the upload page: GET serves the form, POST receives the
/// files.
///
/// With a save directory configured, each file part is written there under
/// a collision-safe name. Without one the server runs in echo mode and
/// part contents are written to the console sink instead; generally only
/// useful for small text files.
pub struct FileUpload {
    delay: Duration,
    save_directory: Option<PathBuf>,
    echo: Mutex<Box<dyn Write + Send>>,
}

impl FileUpload {
    pub fn new(network_delay: u64, save_directory: Option<PathBuf>) -> Self {
        Self::with_echo(network_delay, save_directory, Box::new(io::stdout()))
    }

    /// Construct with an explicit console sink for echo mode output.
    pub fn with_echo(
        network_delay: u64,
        save_directory: Option<PathBuf>,
        echo: Box<dyn Write + Send>,
    ) -> Self {
        FileUpload {
            delay: Duration::from_secs(network_delay),
            save_directory,
            echo: Mutex::new(echo),
        }
    }

    /// Process a form submission: every part named `file` or `file[]`, in
    /// the order encountered, is saved or echoed.
    fn do_post(&self, request: &HttpRequest) -> io::Result<HttpResponse> {
        if self.save_directory.is_none() {
            self.echo_request(request)?;
        }

        let boundary = request.multipart_boundary().ok_or_else(|| {
            io::Error::new(ErrorKind::InvalidData, "POST body is not multipart/form-data")
        })?;
        let fields = MultipartParser::new(boundary).parse(&request.body)?;

        let mut all_uploads = Vec::new();
        for field in &fields {
            if !UPLOAD_FIELD_NAMES.contains(&field.name.as_str()) {
                continue;
            }
            let filename = match field.filename {
                Some(ref filename) => filename,
                None => continue,
            };

            let saved_path = match self.save_directory {
                None => {
                    self.echo_contents(filename, &field.data)?;
                    None
                }
                Some(ref directory) => {
                    let path = storage::save_file(&field.data, filename, directory)?;
                    log::info!("{} uploaded, saved to {}", filename, path.display());
                    Some(path)
                }
            };

            all_uploads.push(UploadRecord {
                submitted_name: filename.clone(),
                saved_path,
            });
        }

        let response = HttpResponse::html(self.uploaded_page(&all_uploads));

        // Simulated network delay; blocks only this request's thread.
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }

        Ok(response)
    }

    /// Dump the request line and headers to the console sink.
    fn echo_request(&self, request: &HttpRequest) -> io::Result<()> {
        let mut echo = self.echo.lock().expect("echo sink poisoned");
        writeln!(echo, "-- BEGIN File Upload POST Request --")?;
        writeln!(echo, "{}", request.request_line())?;
        let mut headers: Vec<_> = request.headers.iter().collect();
        headers.sort();
        for (name, value) in headers {
            writeln!(echo, "{}: {}", name, value)?;
        }
        writeln!(echo, "-- END File Upload POST Request --")?;
        Ok(())
    }

    /// Write one part's name and contents to the console sink, bracketed by
    /// begin/end markers.
    fn echo_contents(&self, filename: &str, data: &[u8]) -> io::Result<()> {
        let mut echo = self.echo.lock().expect("echo sink poisoned");
        writeln!(echo, "== BEGIN {} Contents ==", filename)?;
        echo.write_all(data)?;
        if !data.ends_with(b"\n") {
            writeln!(echo)?;
        }
        writeln!(echo, "== END {} Contents ==", filename)?;
        echo.flush()
    }

    /// The upload form, with fineprint matching the operating mode.
    fn uploader_page(&self) -> String {
        let mut html = vec![
            "<h2>Oddjob File Uploader</h2>".to_string(),
            "<form action='' method='POST' enctype='multipart/form-data'>".to_string(),
            "    <label for='file'>Select one or more files to upload:</label>".to_string(),
            "    <br><br>".to_string(),
            "    <input type='file' name='file' multiple='true'>".to_string(),
            "    <br><br>".to_string(),
            "    <input type='submit' value='Upload'>".to_string(),
            "</form>".to_string(),
            "<br>".to_string(),
        ];

        match self.save_directory {
            None => html.extend([
                "<p class=\"fineprint\">".to_string(),
                "Currently file uploads will <strong>not</strong> be saved, instead".to_string(),
                "their contents will be printed to oddjob's standard output.".to_string(),
                "In this configuration it is recommended that you only upload".to_string(),
                "text files.".to_string(),
                "</p>".to_string(),
                "<p class=\"fineprint\">".to_string(),
                "To upload any kind of file (binary or text) specify an output".to_string(),
                "directory where files will be saved instead.  To see how visit the".to_string(),
                format!("<a href=\"{}\">info page</a>.", INFO_PATH),
                "</p>".to_string(),
            ]),
            Some(ref directory) => html.extend([
                "<p class=\"fineprint\">".to_string(),
                "Uploaded files will be saved in the".to_string(),
                format!("<strong>{}</strong> directory.", absolute(directory).display()),
                "New files do not overwrite existing ones, instead they are given".to_string(),
                "a unique numbered suffix.".to_string(),
                "</p>".to_string(),
            ]),
        }

        pages::page(&html, "Uploader")
    }

    /// The results page listing each processed upload.
    fn uploaded_page(&self, uploads: &[UploadRecord]) -> String {
        let mut html = vec![
            "<h2>Results</h2>".to_string(),
            "<p>Uploaded:</p>".to_string(),
            "<ul>".to_string(),
        ];

        for upload in uploads {
            html.push("<li>".to_string());
            html.push(format!("<strong>{}</strong>", pages::html_escape(&upload.submitted_name)));
            if let Some(ref path) = upload.saved_path {
                html.push(format!(" - saved to: {}", path.display()));
            }
            html.push("</li>".to_string());
        }

        html.extend([
            "</ul>".to_string(),
            "<p><a href=''>Return to upload page</a></p>".to_string(),
        ]);

        pages::page(&html, "Upload Results")
    }
}

impl Handler for FileUpload {
    fn handle(&self, request: &HttpRequest) -> io::Result<HttpResponse> {
        match request.method {
            Method::Get => Ok(HttpResponse::html(self.uploader_page())),
            Method::Post => self.do_post(request),
            _ => Ok(HttpResponse::method_not_allowed()),
        }
    }

    fn name(&self) -> &'static str {
        "FileUpload"
    }
}

/// Absolute form of a path for display, without touching the filesystem.
fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        match env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    }
}
