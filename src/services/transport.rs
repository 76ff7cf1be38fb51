//! Delivery transport fee resolution.
//!
//! City names arrive from the storefront in whatever shape the customer
//! typed ("Chía", " BOGOTÁ ", "cajica"), so lookups run over a normalized
//! form: trimmed, accent-folded, uppercased, inner whitespace collapsed.
//! Fee resolution always succeeds (unknown cities get the configured
//! default); serviceability is a separate, stricter check used to reject
//! orders outside the delivery area.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;

use crate::config::TransportConfig;

#[derive(Clone, Debug)]
pub struct TransportResolver {
    fees: HashMap<String, Decimal>,
    default_fee: Decimal,
    service_area: HashSet<String>,
}

/// Folds Spanish diacritics onto their base letter. `ñ`/`Ñ` is a distinct
/// letter, not an accent, and is preserved.
fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'Á' | 'À' | 'Ä' | 'Â' => 'A',
        'É' | 'È' | 'Ë' | 'Ê' => 'E',
        'Í' | 'Ì' | 'Ï' | 'Î' => 'I',
        'Ó' | 'Ò' | 'Ö' | 'Ô' => 'O',
        'Ú' | 'Ù' | 'Ü' | 'Û' => 'U',
        other => other,
    }
}

/// Canonical lookup form of a city name.
pub fn normalize_city(city: &str) -> String {
    let folded: String = city.trim().chars().map(fold_accent).collect();
    folded
        .to_uppercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

impl TransportResolver {
    /// Builds a resolver from configuration. Fee-table keys and the
    /// service-area list are themselves normalized, so config files may
    /// spell city names with or without accents.
    pub fn new(cfg: &TransportConfig) -> Self {
        let fees = cfg
            .fees
            .iter()
            .map(|(city, fee)| (normalize_city(city), Decimal::from(*fee)))
            .collect();

        let service_area = cfg
            .serviceable_cities
            .iter()
            .map(|city| normalize_city(city))
            .collect();

        Self {
            fees,
            default_fee: Decimal::from(cfg.default_fee),
            service_area,
        }
    }

    /// Flat delivery fee for a city. Unknown or empty input resolves to
    /// the default fee; this lookup never fails.
    pub fn resolve(&self, city: &str) -> Decimal {
        self.fees
            .get(&normalize_city(city))
            .copied()
            .unwrap_or(self.default_fee)
    }

    /// Whether the store delivers to this city at all. Checked before an
    /// order is accepted; failing this is a hard rejection, unlike the
    /// fee lookup above.
    pub fn is_serviceable(&self, city: &str) -> bool {
        self.service_area.contains(&normalize_city(city))
    }
}
