//! Per-session query context.

use crate::history::HistoryLog;
use crate::query::{GeoLocation, ImageAttachment, QueryContextSnapshot};

/// Ambient data attached to every query in a session.
///
/// Owned by the query controller; there is exactly one per running front-end.
#[derive(Debug, Clone, Default)]
pub struct QueryContext {
    location: Option<GeoLocation>,
    last_image: Option<ImageAttachment>,
    history: HistoryLog,
}

impl QueryContext {
    pub fn new(history: HistoryLog) -> Self {
        Self {
            location: None,
            last_image: None,
            history,
        }
    }

    pub fn location(&self) -> Option<GeoLocation> {
        self.location
    }

    /// Stores the session location. Only the first call has an effect.
    ///
    /// Returns `true` if the location was stored.
    pub fn set_location(&mut self, location: GeoLocation) -> bool {
        if self.location.is_some() {
            return false;
        }
        self.location = Some(location);
        true
    }

    pub fn last_image(&self) -> Option<&ImageAttachment> {
        self.last_image.as_ref()
    }

    /// Replaces the most recently selected image.
    pub fn select_image(&mut self, image: ImageAttachment) {
        self.last_image = Some(image);
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut HistoryLog {
        &mut self.history
    }

    /// The context data sent with a query.
    pub fn snapshot(&self) -> QueryContextSnapshot {
        QueryContextSnapshot {
            location: self.location,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_is_set_at_most_once() {
        let mut context = QueryContext::default();
        assert!(context.set_location(GeoLocation::new(1.0, 2.0)));
        assert!(!context.set_location(GeoLocation::new(3.0, 4.0)));
        assert_eq!(context.location(), Some(GeoLocation::new(1.0, 2.0)));
        assert_eq!(context.snapshot().location, Some(GeoLocation::new(1.0, 2.0)));
    }

    #[test]
    fn test_select_image_overwrites() {
        let mut context = QueryContext::default();
        context.select_image(ImageAttachment::new("a.png", "image/png", vec![1]));
        context.select_image(ImageAttachment::new("b.png", "image/png", vec![2]));
        assert_eq!(context.last_image().unwrap().file_name, "b.png");
    }
}
