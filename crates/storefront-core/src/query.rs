//! Query normalization and abbreviation expansion
//!
//! Raw input is trimmed and lowercased, then expanded against a static
//! table of domain abbreviations ("tv" -> "Televisions"). Expansion is
//! a heuristic that can over-generalize, so the expanded form augments
//! the original instead of replacing it: downstream components always
//! probe both.

use std::collections::HashMap;

use lazy_static::lazy_static;

lazy_static! {
    /// Domain abbreviations mapped to canonical category terms.
    static ref ABBREVIATIONS: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        // Electronics & appliances
        m.insert("tv", "Televisions");
        m.insert("television", "Televisions");
        m.insert("ac", "Air Conditioners");
        m.insert("airconditioner", "Air Conditioners");
        m.insert("aircon", "Air Conditioners");
        m.insert("wm", "Washing Machines");
        m.insert("washingmachine", "Washing Machines");
        m.insert("mwo", "Microwave Ovens");
        m.insert("microwave", "Microwave Ovens");
        m.insert("mjg", "Mixer Juicer Grinder");
        m.insert("otg", "Oven Toaster Grills");
        m.insert("ro", "Water purifiers");
        m.insert("uv", "Water purifiers");
        m.insert("uf", "Water purifiers");
        m.insert("hdd", "External HDD");
        m.insert("ssd", "External HDD");
        // Cameras
        m.insert("dslr", "DSLR & Mirrorless");
        m.insert("mirrorless", "DSLR & Mirrorless");
        m.insert("camera", "DSLR & Mirrorless");
        // Networking
        m.insert("wifi", "Routers");
        m.insert("router", "Routers");
        // Gaming
        m.insert("rc", "Remote Control Toys");
        m.insert("remotecontrol", "Remote Control Toys");
        // Beauty & care
        m.insert("spf", "Body and Face Care");
        m.insert("skincare", "Body and Face Care");
        m.insert("bodycare", "Body and Face Care");
        // Audio
        m.insert("tws", "True Wireless");
        m.insert("earbuds", "True Wireless");
        m.insert("headphones", "True Wireless");
        // Sports & fitness
        m.insert("mtb", "Cycles");
        m.insert("bicycle", "Cycles");
        m.insert("bike", "Cycles");
        // Fragrance
        m.insert("perfume", "Perfume");
        m.insert("cologne", "Perfume");
        m.insert("fragrance", "Perfume");
        // Supplements
        m.insert("protein", "Protein Supplement");
        m.insert("whey", "Protein Supplement");
        // Automotive
        m.insert("car", "Automotive Accessories");
        m.insert("auto", "Automotive Accessories");
        // Lighting
        m.insert("led", "Decor lighting & Accessories");
        m.insert("bulb", "Decor lighting & Accessories");
        m.insert("light", "Decor lighting & Accessories");
        // Technology
        m.insert("ai", "Automation & Robotics");
        m.insert("ml", "Automation & Robotics");
        m.insert("iot", "Automation & Robotics");
        m.insert("smart", "Automation & Robotics");
        m
    };
}

/// A query in both of its searchable forms.
///
/// `original` is the trimmed, lowercased input; `expanded` is the
/// abbreviation-expanded form (equal to `original` when no expansion
/// applied). Both forms are lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedQuery {
    pub original: String,
    pub expanded: String,
}

impl NormalizedQuery {
    /// Normalize a raw query string.
    pub fn parse(raw: &str) -> Self {
        let original = raw.trim().to_lowercase();
        let expanded = expand(&original)
            .map(|e| e.to_lowercase())
            .unwrap_or_else(|| original.clone());
        Self { original, expanded }
    }

    /// True when the trimmed input was empty or whitespace-only.
    pub fn is_empty(&self) -> bool {
        self.original.is_empty()
    }

    /// True when expansion produced a form distinct from the original.
    pub fn was_expanded(&self) -> bool {
        self.expanded != self.original
    }

    /// The query forms to probe, without duplicates.
    pub fn forms(&self) -> Vec<&str> {
        if self.was_expanded() {
            vec![self.original.as_str(), self.expanded.as_str()]
        } else {
            vec![self.original.as_str()]
        }
    }
}

/// Expand a normalized query against the abbreviation table.
///
/// Whole-query lookup wins; otherwise individual tokens are replaced.
/// Returns None when nothing changed.
fn expand(normalized: &str) -> Option<String> {
    if let Some(full) = ABBREVIATIONS.get(normalized) {
        return Some((*full).to_string());
    }

    let words: Vec<&str> = normalized.split_whitespace().collect();
    let expanded: Vec<&str> = words
        .iter()
        .map(|w| ABBREVIATIONS.get(w).copied().unwrap_or(w))
        .collect();

    if expanded
        .iter()
        .zip(words.iter())
        .any(|(after, before)| after != before)
    {
        Some(expanded.join(" "))
    } else {
        None
    }
}
