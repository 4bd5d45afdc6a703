use crate::ident::new_id;
use crate::state::request::RequestDef;

/// One open request tab. Ephemeral: never persisted. `name` and `method` are
/// a denormalized display snapshot; the request id is the source of truth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabItem {
    pub id: String,
    pub request_id: String,
    pub name: String,
    pub method: String,
    pub is_dirty: bool,
}

/// Open tabs plus the active selection.
///
/// Invariant: every tab's `request_id` refers to a request present in the
/// current document. The controller closes tabs in the same mutation that
/// deletes or archives a request.
#[derive(Debug, Clone, Default)]
pub struct TabStrip {
    tabs: Vec<TabItem>,
    active_tab_id: Option<String>,
}

impl TabStrip {
    /// Open a tab for `request`, or activate the existing one. At most one
    /// tab per request. Returns the tab id.
    pub fn open(&mut self, request: &RequestDef) -> String {
        if let Some(tab) = self.tabs.iter().find(|t| t.request_id == request.id) {
            let id = tab.id.clone();
            self.active_tab_id = Some(id.clone());
            return id;
        }
        let tab = TabItem {
            id: new_id(),
            request_id: request.id.clone(),
            name: request.name.clone(),
            method: request.method.as_str().to_string(),
            is_dirty: false,
        };
        let id = tab.id.clone();
        self.tabs.push(tab);
        self.active_tab_id = Some(id.clone());
        id
    }

    /// Close a tab. If it was active, activation falls to its left neighbor
    /// in list order, then the first remaining tab, then none.
    pub fn close(&mut self, tab_id: &str) {
        let Some(index) = self.tabs.iter().position(|t| t.id == tab_id) else {
            return;
        };
        self.tabs.remove(index);

        if self.active_tab_id.as_deref() == Some(tab_id) {
            self.active_tab_id = if self.tabs.is_empty() {
                None
            } else {
                let fallback = if index > 0 { index - 1 } else { 0 };
                Some(self.tabs[fallback].id.clone())
            };
        }
    }

    /// Close the tab showing `request_id`, if any, with the same activation
    /// fallback as [`TabStrip::close`].
    pub fn close_for_request(&mut self, request_id: &str) {
        if let Some(tab_id) = self
            .tabs
            .iter()
            .find(|t| t.request_id == request_id)
            .map(|t| t.id.clone())
        {
            self.close(&tab_id);
        }
    }

    pub fn activate(&mut self, tab_id: &str) -> bool {
        if self.tabs.iter().any(|t| t.id == tab_id) {
            self.active_tab_id = Some(tab_id.to_string());
            true
        } else {
            false
        }
    }

    /// Mirror a request's edited name/method into its tab's display fields.
    pub fn sync_display(&mut self, request_id: &str, name: &str, method: &str) {
        for tab in self.tabs.iter_mut().filter(|t| t.request_id == request_id) {
            tab.name = name.to_string();
            tab.method = method.to_string();
        }
    }

    /// Dirty policy: set on any field update to the underlying request...
    pub fn mark_dirty(&mut self, request_id: &str) {
        self.set_dirty(request_id, true);
    }

    /// ...and cleared only on successful send completion, never on document
    /// save. Request-level dirty is independent of the document-level
    /// unsaved-changes flag.
    pub fn mark_clean(&mut self, request_id: &str) {
        self.set_dirty(request_id, false);
    }

    fn set_dirty(&mut self, request_id: &str, dirty: bool) {
        for tab in self.tabs.iter_mut().filter(|t| t.request_id == request_id) {
            tab.is_dirty = dirty;
        }
    }

    pub fn active(&self) -> Option<&TabItem> {
        self.active_tab_id
            .as_deref()
            .and_then(|id| self.tabs.iter().find(|t| t.id == id))
    }

    pub fn active_request_id(&self) -> Option<&str> {
        self.active().map(|t| t.request_id.as_str())
    }

    pub fn tabs(&self) -> &[TabItem] {
        &self.tabs
    }

    pub fn clear(&mut self) {
        self.tabs.clear();
        self.active_tab_id = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str) -> RequestDef {
        let mut r = RequestDef::new(None);
        r.name = name.into();
        r
    }

    #[test]
    fn test_open_is_idempotent_per_request() {
        let mut strip = TabStrip::default();
        let r = request("a");
        let first = strip.open(&r);
        let second = strip.open(&r);
        assert_eq!(first, second);
        assert_eq!(strip.tabs().len(), 1);
        assert_eq!(strip.active().unwrap().id, first);
    }

    #[test]
    fn test_close_active_prefers_left_neighbor() {
        let mut strip = TabStrip::default();
        let (a, b, c) = (request("a"), request("b"), request("c"));
        let tab_a = strip.open(&a);
        let tab_b = strip.open(&b);
        strip.open(&c);
        strip.activate(&tab_b);

        strip.close(&tab_b);
        assert_eq!(strip.active().unwrap().id, tab_a);
        assert_eq!(strip.tabs().len(), 2);
    }

    #[test]
    fn test_close_first_active_falls_to_new_first() {
        let mut strip = TabStrip::default();
        let (a, b) = (request("a"), request("b"));
        let tab_a = strip.open(&a);
        let tab_b = strip.open(&b);
        strip.activate(&tab_a);

        strip.close(&tab_a);
        assert_eq!(strip.active().unwrap().id, tab_b);
    }

    #[test]
    fn test_close_last_tab_clears_active() {
        let mut strip = TabStrip::default();
        let tab = strip.open(&request("a"));
        strip.close(&tab);
        assert!(strip.active().is_none());
        assert!(strip.tabs().is_empty());
    }

    #[test]
    fn test_close_inactive_keeps_active() {
        let mut strip = TabStrip::default();
        let (a, b) = (request("a"), request("b"));
        let tab_a = strip.open(&a);
        let tab_b = strip.open(&b);
        strip.activate(&tab_b);

        strip.close(&tab_a);
        assert_eq!(strip.active().unwrap().id, tab_b);
    }

    #[test]
    fn test_dirty_transitions() {
        let mut strip = TabStrip::default();
        let r = request("a");
        strip.open(&r);
        assert!(!strip.active().unwrap().is_dirty);
        strip.mark_dirty(&r.id);
        assert!(strip.active().unwrap().is_dirty);
        strip.mark_clean(&r.id);
        assert!(!strip.active().unwrap().is_dirty);
    }

    #[test]
    fn test_sync_display() {
        let mut strip = TabStrip::default();
        let r = request("a");
        strip.open(&r);
        strip.sync_display(&r.id, "renamed", "POST");
        let tab = strip.active().unwrap();
        assert_eq!(tab.name, "renamed");
        assert_eq!(tab.method, "POST");
    }
}
