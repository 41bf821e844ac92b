//! Ceiling-based flight category classification.
//!
//! The feed no longer carries a precomputed `flight_category`, so the category
//! is derived here from the cloud layers alone (visibility is not modeled).

use super::{CloudLayer, FlightCategory};
use crate::common::constants::{IFR_CEILING_BELOW, LIFR_CEILING_BELOW, MVFR_CEILING_BELOW};

/// Lowest base among broken/overcast layers, `None` when the sky has no ceiling.
pub fn ceiling(clouds: &[CloudLayer]) -> Option<f64> {
    clouds
        .iter()
        .filter(|layer| layer.cover.forms_ceiling())
        .filter_map(|layer| layer.base_feet)
        .filter(|base| base.is_finite())
        .reduce(f64::min)
}

/// Classify a station from its cloud layers.
///
/// No ceiling means unlimited and therefore VFR. Threshold values belong to
/// the better category: exactly 500 ft is IFR, 1000 ft is MVFR, 3000 ft is VFR.
pub fn classify(clouds: &[CloudLayer]) -> FlightCategory {
    match ceiling(clouds) {
        None => FlightCategory::Vfr,
        Some(c) if c < LIFR_CEILING_BELOW => FlightCategory::Lifr,
        Some(c) if c < IFR_CEILING_BELOW => FlightCategory::Ifr,
        Some(c) if c < MVFR_CEILING_BELOW => FlightCategory::Mvfr,
        Some(_) => FlightCategory::Vfr,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::CloudCover;

    fn layer(cover: &str, base: Option<f64>) -> CloudLayer {
        CloudLayer::new(CloudCover::parse(cover), base)
    }

    #[test]
    fn test_clear_sky_is_vfr() {
        assert_eq!(classify(&[]), FlightCategory::Vfr);
        assert_eq!(classify(&[layer("CLR", None)]), FlightCategory::Vfr);
    }

    #[test]
    fn test_scattered_layers_never_form_a_ceiling() {
        let clouds = [layer("FEW", Some(200.0)), layer("SCT", Some(400.0))];
        assert_eq!(ceiling(&clouds), None);
        assert_eq!(classify(&clouds), FlightCategory::Vfr);
    }

    #[test]
    fn test_threshold_boundaries_go_to_better_category() {
        let cases = [
            (0.0, FlightCategory::Lifr),
            (499.0, FlightCategory::Lifr),
            (500.0, FlightCategory::Ifr),
            (999.0, FlightCategory::Ifr),
            (1000.0, FlightCategory::Mvfr),
            (2999.0, FlightCategory::Mvfr),
            (3000.0, FlightCategory::Vfr),
            (12000.0, FlightCategory::Vfr),
        ];
        for (base, expected) in cases {
            assert_eq!(
                classify(&[layer("OVC", Some(base))]),
                expected,
                "ceiling {base} ft"
            );
        }
    }

    #[test]
    fn test_lowest_qualifying_layer_wins() {
        let clouds = [
            layer("FEW", Some(300.0)),
            layer("BKN", Some(2500.0)),
            layer("OVC", Some(800.0)),
        ];
        assert_eq!(ceiling(&clouds), Some(800.0));
        assert_eq!(classify(&clouds), FlightCategory::Ifr);
    }

    #[test]
    fn test_layers_without_base_are_ignored() {
        let clouds = [layer("OVC", None), layer("BKN", Some(4000.0))];
        assert_eq!(classify(&clouds), FlightCategory::Vfr);

        let no_base = [layer("OVC", None)];
        assert_eq!(classify(&no_base), FlightCategory::Vfr);
    }

    #[test]
    fn test_non_finite_bases_are_ignored() {
        let clouds = [layer("OVC", Some(f64::NAN)), layer("BKN", Some(f64::NEG_INFINITY))];
        assert_eq!(ceiling(&clouds), None);
    }
}
