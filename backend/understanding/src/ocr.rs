//! Optical Character Recognition (OCR)
//!
//! Extracts text from photos sent by users, either through a local Tesseract
//! binary or an OpenAI-compatible vision endpoint.

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use snaptext_config::defaults::{
    DEFAULT_OCR_LANGUAGES, DEFAULT_TESSERACT_PATH, DEFAULT_VISION_BASE_URL, DEFAULT_VISION_MODEL,
};
use snaptext_config::schema::OcrConfig;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::image_mime::sniff_image_mime;

/// Upper bound on a single recognition.
const OCR_TIMEOUT: Duration = Duration::from_secs(60);

const VISION_PROMPT: &str = "Transcribe all text visible in this image exactly as written, \
preserving line breaks. Reply with the text only. If there is no text, reply with nothing.";

/// Image bytes in, text out.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Engine name for logging.
    fn name(&self) -> &str;

    /// Recognize the text in an encoded image. The result is trimmed; an image
    /// without text yields an empty string.
    async fn recognize(&self, image: &[u8]) -> Result<String>;
}

/// Select and build the engine named in the `ocr` config section.
pub fn build_engine(config: &OcrConfig) -> Result<Arc<dyn OcrEngine>> {
    match config.engine.as_deref().unwrap_or("tesseract") {
        "tesseract" => Ok(Arc::new(TesseractEngine::new(
            config.tesseract_path.as_deref().unwrap_or(DEFAULT_TESSERACT_PATH),
            config.languages.as_deref().unwrap_or(DEFAULT_OCR_LANGUAGES),
        ))),
        "vision" => {
            let api_key = config
                .vision_api_key
                .clone()
                .filter(|k| !k.is_empty())
                .context("ocr.visionApiKey is required for the vision engine")?;
            Ok(Arc::new(VisionOcrEngine::new(
                api_key,
                config.vision_model.as_deref().unwrap_or(DEFAULT_VISION_MODEL),
                config.vision_base_url.as_deref().unwrap_or(DEFAULT_VISION_BASE_URL),
            )))
        }
        other => bail!("Unknown OCR engine '{other}'"),
    }
}

// ---------------------------------------------------------------------------
// Tesseract
// ---------------------------------------------------------------------------

/// Runs `tesseract stdin stdout -l <languages>` per image.
pub struct TesseractEngine {
    binary: String,
    languages: String,
}

impl TesseractEngine {
    pub fn new(binary: impl Into<String>, languages: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            languages: languages.into(),
        }
    }

    pub fn args(&self) -> Vec<String> {
        vec![
            "stdin".to_string(),
            "stdout".to_string(),
            "-l".to_string(),
            self.languages.clone(),
        ]
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    async fn recognize(&self, image: &[u8]) -> Result<String> {
        debug!(bytes = image.len(), languages = %self.languages, "Running tesseract");

        let mut child = tokio::process::Command::new(&self.binary)
            .args(self.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to spawn {}", self.binary))?;

        let mut stdin = child.stdin.take().context("tesseract stdin unavailable")?;
        let feed = async move {
            let written = stdin.write_all(image).await;
            drop(stdin);
            written
        };

        // Feed stdin while draining the pipes so neither side blocks the other.
        let (written, output) =
            tokio::time::timeout(OCR_TIMEOUT, async move { tokio::join!(feed, child.wait_with_output()) })
                .await
                .with_context(|| format!("tesseract timed out after {}s", OCR_TIMEOUT.as_secs()))?;
        let output = output.context("Failed to wait for tesseract")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("tesseract exited with {}: {}", output.status, stderr.trim());
        }
        written.context("Failed to write image to tesseract")?;

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        info!(chars = text.chars().count(), "Tesseract recognition finished");
        Ok(text)
    }
}

// ---------------------------------------------------------------------------
// Vision endpoint
// ---------------------------------------------------------------------------

/// Sends the image to an OpenAI-compatible chat completions endpoint.
pub struct VisionOcrEngine {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl VisionOcrEngine {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(OCR_TIMEOUT)
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    pub fn request_body(&self, image: &[u8]) -> serde_json::Value {
        let b64 = STANDARD.encode(image);
        let mime_type = sniff_image_mime(image);
        serde_json::json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": VISION_PROMPT },
                    { "type": "image_url",
                      "image_url": { "url": format!("data:{mime_type};base64,{b64}") } }
                ]
            }],
            "max_tokens": 2048,
            "temperature": 0
        })
    }
}

#[async_trait]
impl OcrEngine for VisionOcrEngine {
    fn name(&self) -> &str {
        "vision"
    }

    async fn recognize(&self, image: &[u8]) -> Result<String> {
        info!(model = %self.model, bytes = image.len(), "Recognizing image via vision endpoint");
        let resp = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&self.request_body(image))
            .send()
            .await
            .context("Vision request failed")?;
        if !resp.status().is_success() {
            let status = resp.status();
            bail!("Vision endpoint error {status}: {}", resp.text().await.unwrap_or_default());
        }
        let json: serde_json::Value = resp.json().await.context("Invalid vision response")?;
        message_content(&json)
    }
}

/// Text of the first choice. An empty string is a valid "no text" answer; a
/// missing or non-string content is not.
fn message_content(response: &serde_json::Value) -> Result<String> {
    let content = response["choices"][0]["message"]["content"]
        .as_str()
        .context("vision response has no message content")?;
    Ok(content.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tesseract_args_use_stdin_and_languages() {
        let engine = TesseractEngine::new("tesseract", "eng+rus");
        assert_eq!(engine.args(), vec!["stdin", "stdout", "-l", "eng+rus"]);
        assert_eq!(engine.name(), "tesseract");
    }

    #[test]
    fn build_defaults_to_tesseract() {
        let engine = build_engine(&OcrConfig::default()).unwrap();
        assert_eq!(engine.name(), "tesseract");
    }

    #[test]
    fn build_vision_requires_key() {
        let config = OcrConfig { engine: Some("vision".into()), ..Default::default() };
        assert!(build_engine(&config).is_err());

        let config = OcrConfig {
            engine: Some("vision".into()),
            vision_api_key: Some("sk-test".into()),
            ..Default::default()
        };
        assert_eq!(build_engine(&config).unwrap().name(), "vision");
    }

    #[test]
    fn build_rejects_unknown_engine() {
        let config = OcrConfig { engine: Some("abbyy".into()), ..Default::default() };
        assert!(build_engine(&config).is_err());
    }

    #[test]
    fn vision_request_embeds_image() {
        let engine = VisionOcrEngine::new("sk-test", "gpt-4o", "https://example.test/v1/");
        assert_eq!(engine.endpoint(), "https://example.test/v1/chat/completions");
        let body = engine.request_body(&[0x89, b'P', b'N', b'G']);
        assert_eq!(body["model"], "gpt-4o");
        let url = body["messages"][0]["content"][1]["image_url"]["url"].as_str().unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn missing_binary_is_error() {
        let engine = TesseractEngine::new("/nonexistent/snaptext-tesseract", "eng");
        assert!(engine.recognize(b"not an image").await.is_err());
    }

    #[cfg(unix)]
    fn stub_tesseract(dir: &std::path::Path, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join("tesseract");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_tesseract_reports_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let binary = stub_tesseract(dir.path(), "echo 'Failed loading language xyz' >&2\nexit 1");
        let engine = TesseractEngine::new(binary, "xyz");

        // Larger than a pipe buffer, so the write cannot finish before the exit.
        let image = vec![0u8; 4 * 1024 * 1024];
        let err = engine.recognize(&image).await.unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("Failed loading language xyz"), "{message}");
        assert!(message.contains("exited with"), "{message}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn tesseract_output_is_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let binary = stub_tesseract(dir.path(), "cat > /dev/null\nprintf '  Hello\\nworld  \\n'");
        let engine = TesseractEngine::new(binary, "eng");
        let text = engine.recognize(&vec![1u8; 256 * 1024]).await.unwrap();
        assert_eq!(text, "Hello\nworld");
    }

    #[test]
    fn vision_content_must_be_a_string() {
        let err = message_content(&serde_json::json!({"error": "unexpected schema"})).unwrap_err();
        assert!(err.to_string().contains("no message content"));

        let refusal = serde_json::json!({"choices": [{"message": {"content": null, "refusal": "no"}}]});
        assert!(message_content(&refusal).is_err());
    }

    #[test]
    fn vision_empty_content_is_no_text() {
        let empty = serde_json::json!({"choices": [{"message": {"content": "  "}}]});
        assert_eq!(message_content(&empty).unwrap(), "");
        let text = serde_json::json!({"choices": [{"message": {"content": " Hi \n"}}]});
        assert_eq!(message_content(&text).unwrap(), "Hi");
    }

    /// Serves one canned HTTP response and returns the base URL.
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        use tokio::io::AsyncReadExt;
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request);
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text[..end]
                        .lines()
                        .find_map(|l| {
                            let (name, value) = l.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length").then(|| value.trim().parse::<usize>().ok())?
                        })
                        .unwrap_or(0);
                    if request.len() >= end + 4 + length {
                        break;
                    }
                }
            }
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
        });
        format!("http://{addr}/v1")
    }

    #[tokio::test]
    async fn vision_schema_mismatch_is_error() {
        let base = serve_once("200 OK", r#"{"error":"unexpected schema"}"#).await;
        let engine = VisionOcrEngine::new("sk-test", "gpt-4o", base);
        assert!(engine.recognize(&[0xFF, 0xD8, 0xFF]).await.is_err());
    }

    #[tokio::test]
    async fn vision_reads_message_content() {
        let base = serve_once("200 OK", r#"{"choices":[{"message":{"content":"Stop\nGo"}}]}"#).await;
        let engine = VisionOcrEngine::new("sk-test", "gpt-4o", base);
        assert_eq!(engine.recognize(&[0xFF, 0xD8, 0xFF]).await.unwrap(), "Stop\nGo");
    }
}
