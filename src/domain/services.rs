//! Static service catalog for the marketing pages and the sitemap.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ServiceItem {
    pub slug: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub tags: &'static [&'static str],
    pub highlights: &'static [&'static str],
    pub process: &'static [&'static str],
    pub scenarios: &'static [&'static str],
}

/// The fixed catalog shown on the services pages. Editing this list is a code
/// change on purpose: the catalog doubles as the sitemap's service-route
/// source and should move in lockstep with the service detail pages.
pub const SERVICE_CATALOG: &[ServiceItem] = &[
    ServiceItem {
        slug: "international-air-freight",
        title: "International Air Freight",
        description: "Fast transit with end-to-end tracking for high-value, time-sensitive cross-border cargo.",
        tags: &["air", "express-lane"],
        highlights: &[
            "T+3~5 delivery, late departure early arrival",
            "Master air waybill with locked-in rates",
            "Supports lithium batteries, temperature control, general cargo",
        ],
        process: &[
            "Cargo screening and palletizing",
            "Export customs release at origin",
            "Destination clearance and last-mile delivery",
        ],
        scenarios: &["3C electronics and small appliances", "Rapid restocking around sales events"],
    },
    ServiceItem {
        slug: "sea-freight-fcl",
        title: "Sea Freight FCL",
        description: "Full-container shipping for bulk cargo; the lowest-cost option for steady replenishment.",
        tags: &["sea", "full-container"],
        highlights: &[
            "Guaranteed container space",
            "Stable routes with controllable pricing",
            "Optional clearance and drayage add-ons",
        ],
        process: &[
            "Container loading",
            "Export declaration",
            "Ocean transport",
            "Destination clearance and delivery",
        ],
        scenarios: &["Furniture and home goods", "Sellers with long-term stock planning"],
    },
    ServiceItem {
        slug: "sea-freight-lcl",
        title: "Sea Freight LCL",
        description: "Economical consolidated shipping for small and mid-size loads, billed by volume or weight.",
        tags: &["sea", "consolidation"],
        highlights: &[
            "Per-CBM or per-kg billing flexibility",
            "Consolidation handled at the origin port",
            "Deconsolidation and distribution at destination",
        ],
        process: &[
            "Cargo gathered at the warehouse",
            "Consolidated container stuffing",
            "Ocean transport",
            "Destination devanning and distribution",
        ],
        scenarios: &["Small and mid-size e-commerce sellers", "Sample and trial orders"],
    },
    ServiceItem {
        slug: "express-shipping",
        title: "International Express",
        description: "Door-to-door service with integrated clearance for urgent or high-value shipments.",
        tags: &["express", "door-to-door"],
        highlights: &[
            "First-tier DHL/UPS/FedEx agency",
            "30-70% off published rates",
            "Real-time tracking across the full route",
        ],
        process: &[
            "Door pickup",
            "Direct airport uplift",
            "Fast destination clearance",
            "Final-mile delivery to the door",
        ],
        scenarios: &["Urgent sample shipments", "High-value goods transport"],
    },
    ServiceItem {
        slug: "overseas-warehouse",
        title: "Overseas Warehousing",
        description: "Multi-country warehouse network with drop-shipping to improve last-mile delivery experience.",
        tags: &["warehousing", "drop-shipping"],
        highlights: &[
            "Local dispatch for faster delivery",
            "Shared inventory lowers carrying cost",
            "Returns reconditioning supported",
        ],
        process: &[
            "First-leg inbound to warehouse",
            "Inventory management",
            "Order picking and packing",
            "Last-mile delivery",
        ],
        scenarios: &["Marketplace sellers", "Multi-SKU distribution models"],
    },
    ServiceItem {
        slug: "customs-clearance",
        title: "Customs Clearance",
        description: "Dedicated declaration team versed in customs policy across markets, keeping cargo moving.",
        tags: &["clearance", "declaration"],
        highlights: &[
            "AEO advanced-certified enterprise",
            "Familiar with customs policy in major markets",
            "Fast resolution of difficult cases",
        ],
        process: &[
            "Document pre-review",
            "HS code classification",
            "Customs declaration",
            "Duty payment guidance",
        ],
        scenarios: &["First-time exporters", "Sensitive cargo clearance"],
    },
];

pub fn find_service(slug: &str) -> Option<&'static ServiceItem> {
    SERVICE_CATALOG.iter().find(|service| service.slug == slug)
}

pub fn service_slugs() -> Vec<String> {
    SERVICE_CATALOG
        .iter()
        .map(|service| service.slug.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_slugs_are_unique() {
        let mut slugs: Vec<&str> = SERVICE_CATALOG.iter().map(|s| s.slug).collect();
        slugs.sort_unstable();
        slugs.dedup();
        assert_eq!(slugs.len(), SERVICE_CATALOG.len());
    }

    #[test]
    fn find_service_matches_exact_slug() {
        assert!(find_service("sea-freight-fcl").is_some());
        assert!(find_service("sea-freight").is_none());
    }
}
