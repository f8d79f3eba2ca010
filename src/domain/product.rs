//! Product catalog (read-only)
//!
//! The service exposes no product endpoint yet; the dashboard ships a
//! bundled demo catalog instead.
// TODO(products): fetch from GET /products once the service grows one.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A catalog product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns true if the product passes the given filters
    ///
    /// Category matches exactly (case-insensitive); search matches a
    /// substring of the name (case-insensitive). Absent filters pass.
    pub fn matches(&self, category: Option<&str>, search: Option<&str>) -> bool {
        if let Some(cat) = category {
            if !self.category.eq_ignore_ascii_case(cat) {
                return false;
            }
        }
        if let Some(needle) = search {
            if !self
                .name
                .to_ascii_lowercase()
                .contains(&needle.to_ascii_lowercase())
            {
                return false;
            }
        }
        true
    }
}

/// Sorted unique categories across a product set
pub fn categories(products: &[Product]) -> Vec<String> {
    let mut cats: Vec<String> = products.iter().map(|p| p.category.clone()).collect();
    cats.sort();
    cats.dedup();
    cats
}

fn seeded(id: i64, name: &str, category: &str, price: f64, description: &str) -> Product {
    let stamp = Utc
        .with_ymd_and_hms(2025, 3, 14, 9, 0, 0)
        .single()
        .unwrap_or_default();
    Product {
        id,
        name: name.to_string(),
        description: description.to_string(),
        category: category.to_string(),
        price,
        created_at: stamp,
        updated_at: stamp,
    }
}

/// The bundled demo catalog
pub fn demo_catalog() -> Vec<Product> {
    vec![
        seeded(1, "Wireless Mouse", "Electronics", 89.90, "Low-latency 2.4 GHz mouse with six programmable buttons"),
        seeded(2, "Mechanical Keyboard", "Electronics", 349.00, "Hot-swappable tenkeyless board with PBT keycaps"),
        seeded(3, "Noise-Cancelling Headphones", "Electronics", 799.00, "Over-ear headphones with 30-hour battery life"),
        seeded(4, "Oak Standing Desk", "Furniture", 1899.00, "Dual-motor sit-stand desk with solid oak top"),
        seeded(5, "Ergonomic Task Chair", "Furniture", 1249.50, "Mesh-back chair with adjustable lumbar support"),
        seeded(6, "Monitor Arm", "Furniture", 259.00, "Gas-spring arm for displays up to 34 inches"),
        seeded(7, "Cotton Hoodie", "Clothing", 129.00, "Midweight fleece-lined hoodie, unisex fit"),
        seeded(8, "Canvas Tote", "Clothing", 49.90, "Heavy-duty 16 oz canvas tote with inner pocket"),
        seeded(9, "Field Notebook", "Books", 24.50, "Pocket notebook with dot grid, pack of three"),
        seeded(10, "Systems Design Primer", "Books", 159.00, "Hardcover introduction to distributed systems"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_unique_ids() {
        let products = demo_catalog();
        let mut ids: Vec<i64> = products.iter().map(|p| p.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), products.len());
    }

    #[test]
    fn category_filter_is_case_insensitive() {
        let products = demo_catalog();
        let hits: Vec<_> = products
            .iter()
            .filter(|p| p.matches(Some("electronics"), None))
            .collect();
        assert!(!hits.is_empty());
        assert!(hits.iter().all(|p| p.category == "Electronics"));
    }

    #[test]
    fn search_matches_name_substring() {
        let products = demo_catalog();
        let hits: Vec<_> = products
            .iter()
            .filter(|p| p.matches(None, Some("desk")))
            .collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Oak Standing Desk");
    }

    #[test]
    fn combined_filters_are_conjunctive() {
        let products = demo_catalog();
        assert!(!products
            .iter()
            .any(|p| p.matches(Some("Books"), Some("mouse"))));
    }

    #[test]
    fn categories_are_sorted_and_unique() {
        let cats = categories(&demo_catalog());
        assert_eq!(cats, vec!["Books", "Clothing", "Electronics", "Furniture"]);
    }
}
