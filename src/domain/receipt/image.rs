//! Receipt images as sent to the provider.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// An uploaded receipt image.
#[derive(Debug, Clone)]
pub struct ReceiptImage {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl ReceiptImage {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    /// MIME type from the file extension: PNG when it ends in `.png`, JPEG otherwise.
    pub fn mime_type(&self) -> &'static str {
        if self.filename.to_ascii_lowercase().ends_with(".png") {
            "image/png"
        } else {
            "image/jpeg"
        }
    }

    /// Inline `data:` URL with base64 content.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), STANDARD.encode(&self.bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_extension_is_case_insensitive() {
        assert_eq!(ReceiptImage::new("boleta.PNG", vec![]).mime_type(), "image/png");
        assert_eq!(ReceiptImage::new("boleta.png", vec![]).mime_type(), "image/png");
    }

    #[test]
    fn everything_else_is_jpeg() {
        assert_eq!(ReceiptImage::new("boleta.jpg", vec![]).mime_type(), "image/jpeg");
        assert_eq!(ReceiptImage::new("boleta.webp", vec![]).mime_type(), "image/jpeg");
        assert_eq!(ReceiptImage::new("boleta", vec![]).mime_type(), "image/jpeg");
    }

    #[test]
    fn data_url_embeds_base64_payload() {
        let image = ReceiptImage::new("scan.png", b"hello".to_vec());
        assert_eq!(image.to_data_url(), "data:image/png;base64,aGVsbG8=");
    }
}
