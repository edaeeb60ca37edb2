//! Argument and result values attached to actions.

use super::record::Progress;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// A value that can be rendered as a short JSON string.
///
/// Implemented for every `Serialize` type; serialization can still fail at
/// render time (e.g. maps with non-string keys), which the renderer tolerates.
pub trait ArgValue: Send + Sync {
    /// Serialize to compact JSON.
    fn to_json(&self) -> Result<String, serde_json::Error>;
}

impl<T> ArgValue for T
where
    T: Serialize + Send + Sync,
{
    fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// A named argument or result.
#[derive(Clone)]
pub struct Arg {
    /// Key shown before `=`.
    pub name: String,
    /// The value, serialized lazily.
    pub value: Arc<dyn ArgValue>,
}

impl Arg {
    /// Create a named value.
    pub fn new(name: impl Into<String>, value: impl ArgValue + 'static) -> Self {
        Self {
            name: name.into(),
            value: Arc::new(value),
        }
    }

    /// Serialize the value, substituting a placeholder on failure.
    pub fn render_value(&self) -> String {
        match self.value.to_json() {
            Ok(value) => value,
            Err(err) => format!("failed to serialize: {err}"),
        }
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arg")
            .field("name", &self.name)
            .field("value", &self.render_value())
            .finish()
    }
}

/// Results attached to an action while it runs or when it completes.
#[derive(Clone, Default)]
pub struct ResultData {
    /// Named results, rendered after arguments.
    pub items: Vec<Arg>,
    /// Updated progress, if the attachment carries one.
    pub progress: Option<Progress>,
}

impl ResultData {
    /// Results without progress.
    pub const fn new(items: Vec<Arg>) -> Self {
        Self {
            items,
            progress: None,
        }
    }

    /// Append a result.
    #[must_use]
    pub fn with(mut self, arg: Arg) -> Self {
        self.items.push(arg);
        self
    }
}

impl fmt::Debug for ResultData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultData")
            .field("items", &self.items)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_render_value() {
        assert_eq!(Arg::new("n", 3).render_value(), "3");
        assert_eq!(Arg::new("s", "abc").render_value(), "\"abc\"");
        assert_eq!(Arg::new("b", true).render_value(), "true");
    }

    #[test]
    fn test_render_value_failure_is_local() {
        let mut map = HashMap::new();
        map.insert((1, 2), "tuple keys are not valid JSON object keys");
        let rendered = Arg::new("m", map).render_value();
        assert!(rendered.starts_with("failed to serialize: "), "{rendered}");
    }
}
