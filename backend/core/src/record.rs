use crate::clock::Clock;

/// One completed OCR request.
///
/// `submitted_at` is the message date reported by the transport (UTC seconds);
/// `received_at` is stamped from the ledger's clock when the record is built and
/// drives rate limiting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    result: String,
    image_id: String,
    image_path: String,
    submitted_at: i64,
    received_at: i64,
}

impl Record {
    pub fn new(
        result: impl Into<String>,
        image_id: impl Into<String>,
        image_path: impl Into<String>,
        submitted_at: i64,
        clock: &dyn Clock,
    ) -> Self {
        Self {
            result: result.into(),
            image_id: image_id.into(),
            image_path: image_path.into(),
            submitted_at,
            received_at: clock.now(),
        }
    }

    /// Recognized text.
    pub fn result(&self) -> &str {
        &self.result
    }

    /// Transport file id of the source image.
    pub fn image_id(&self) -> &str {
        &self.image_id
    }

    /// Transport file path of the source image.
    pub fn image_path(&self) -> &str {
        &self.image_path
    }

    pub fn submitted_at(&self) -> i64 {
        self.submitted_at
    }

    pub fn received_at(&self) -> i64 {
        self.received_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    #[test]
    fn test_received_at_comes_from_clock() {
        let clock = ManualClock::new(1_700_000_500);
        let record = Record::new("hello", "file-1", "photos/file_1.jpg", 1_700_000_000, &clock);
        assert_eq!(record.result(), "hello");
        assert_eq!(record.image_id(), "file-1");
        assert_eq!(record.image_path(), "photos/file_1.jpg");
        assert_eq!(record.submitted_at(), 1_700_000_000);
        assert_eq!(record.received_at(), 1_700_000_500);
    }
}
