//! Quick links to live map/search results for nearby services
//!
//! These complement the generated examples with real listings from Google.
//! Without a location the query asks for results "near me", which the browser
//! resolves from the user's position.

use url::Url;

use crate::error::{MediSeekError, Result};

const MAPS_SEARCH: &str = "https://www.google.com/maps/search/";
const WEB_SEARCH: &str = "https://www.google.com/search";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    Pharmacies,
    Doctors,
    Hospitals,
    PathologyLabs,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 4] = [
        ServiceKind::Pharmacies,
        ServiceKind::Doctors,
        ServiceKind::Hospitals,
        ServiceKind::PathologyLabs,
    ];

    /// Catalog key for the display name
    pub fn title_key(self) -> &'static str {
        match self {
            ServiceKind::Pharmacies => "findPharmacies",
            ServiceKind::Doctors => "findDoctors",
            ServiceKind::Hospitals => "findHospitals",
            ServiceKind::PathologyLabs => "findPathologyLabs",
        }
    }

    fn query_term(self) -> &'static str {
        match self {
            ServiceKind::Pharmacies => "pharmacies",
            ServiceKind::Doctors => "doctors",
            ServiceKind::Hospitals => "hospitals",
            ServiceKind::PathologyLabs => "pathology labs",
        }
    }

    /// Places open in Maps; people search better on the web
    fn uses_maps(self) -> bool {
        matches!(self, ServiceKind::Pharmacies | ServiceKind::Hospitals)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NearbyLink {
    pub kind: ServiceKind,
    pub url: Url,
}

/// Link for one kind of service
pub fn nearby_link(kind: ServiceKind, location: Option<&str>) -> Result<NearbyLink> {
    let place = location
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| format!("near {}", l))
        .unwrap_or_else(|| "near me".to_string());
    let query = format!("{} {}", kind.query_term(), place);

    let url = if kind.uses_maps() {
        Url::parse_with_params(MAPS_SEARCH, &[("api", "1"), ("query", query.as_str())])
    } else {
        Url::parse_with_params(WEB_SEARCH, &[("q", query.as_str())])
    }
    .map_err(|e| MediSeekError::Config {
        reason: format!("invalid quick-link URL: {}", e),
    })?;

    Ok(NearbyLink { kind, url })
}

/// Links for every service kind, in display order
pub fn nearby_links(location: Option<&str>) -> Result<Vec<NearbyLink>> {
    ServiceKind::ALL
        .iter()
        .map(|kind| nearby_link(*kind, location))
        .collect()
}
