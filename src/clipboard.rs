use serde::{Deserialize, Serialize};

/// Target kind a clipboard payload was taken from. Paste only succeeds when
/// the target kind matches the payload kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadKind {
    Cell,
    Row,
    Column,
}

/// Typed clipboard payload. Row and column values are ordered sequences of
/// strings as they were at copy time; the paste path pads or truncates them
/// to the target's current shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Cell(String),
    Row(Vec<String>),
    Column(Vec<String>),
}

impl Payload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            Payload::Cell(_) => PayloadKind::Cell,
            Payload::Row(_) => PayloadKind::Row,
            Payload::Column(_) => PayloadKind::Column,
        }
    }

    /// Plain-text rendering forwarded (best-effort) to the system
    /// clipboard. Cells render bare; sequences render as a JSON array,
    /// matching what the browser UI writes.
    pub fn as_plain_text(&self) -> String {
        match self {
            Payload::Cell(value) => value.clone(),
            Payload::Row(values) | Payload::Column(values) => {
                serde_json::to_string(values).unwrap_or_default()
            }
        }
    }
}

/// Single-slot, last-write-wins clipboard. Not persisted, no expiry; a
/// stale payload simply sits here until overwritten.
#[derive(Debug, Clone, Default)]
pub struct Clipboard(Option<Payload>);

impl Clipboard {
    pub fn new() -> Self {
        Clipboard(None)
    }

    pub fn set(&mut self, payload: Payload) {
        self.0 = Some(payload);
    }

    pub fn get(&self) -> Option<&Payload> {
        self.0.as_ref()
    }

    pub fn kind(&self) -> Option<PayloadKind> {
        self.0.as_ref().map(Payload::kind)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_write_wins() {
        let mut clip = Clipboard::new();
        assert!(clip.is_empty());
        clip.set(Payload::Cell("x".into()));
        clip.set(Payload::Row(vec!["1".into(), "2".into()]));
        assert_eq!(clip.kind(), Some(PayloadKind::Row));
    }

    #[test]
    fn plain_text_rendering() {
        assert_eq!(Payload::Cell("x".into()).as_plain_text(), "x");
        assert_eq!(
            Payload::Column(vec!["1".into(), "2".into()]).as_plain_text(),
            r#"["1","2"]"#
        );
    }
}
