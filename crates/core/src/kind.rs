use serde::{Deserialize, Serialize};

/// The two kinds of bookable listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingKind {
    Residence,
    Activity,
}

impl ListingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingKind::Residence => "residence",
            ListingKind::Activity => "activity",
        }
    }
}

impl core::fmt::Display for ListingKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
