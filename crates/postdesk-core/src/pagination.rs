// Page number kept in the location query so list views are bookmarkable.

use crate::router::Location;

/// An integer query parameter with a default that is omitted from the
/// canonical location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParam {
    key: &'static str,
    default: u32,
}

impl Default for PageParam {
    fn default() -> Self {
        Self {
            key: "page",
            default: 1,
        }
    }
}

impl PageParam {
    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Missing, unparseable or zero values read as the default.
    pub fn read(&self, location: &Location) -> u32 {
        location
            .query_param(self.key)
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .filter(|page| *page >= 1)
            .unwrap_or(self.default)
    }

    /// The query value to store for `page`; `None` at the default.
    pub fn encode(&self, page: u32) -> Option<String> {
        let page = page.max(1);
        (page != self.default).then(|| page.to_string())
    }

    pub fn write(&self, location: &mut Location, page: u32) -> bool {
        location.set_query_param(self.key, self.encode(page))
    }
}
