//! Named feature subsets for ablation studies.
//!
//! Each subset is derived from the full feature list by an exclusion rule.
//! Exclusions are order-preserving set differences and tolerate columns that
//! are absent from the input; a missing column is simply a no-op, not an
//! error.

use std::collections::BTreeMap;

use crate::dataset::{TARGET_COL, TIME_COL, ZONE_COL};

const RESERVED: [&str; 3] = [ZONE_COL, TARGET_COL, TIME_COL];

fn without(base: &[String], drop: &[&str]) -> Vec<String> {
    base.iter()
        .filter(|c| !drop.contains(&c.as_str()))
        .cloned()
        .collect()
}

fn intersect(a: &[String], b: &[String]) -> Vec<String> {
    a.iter().filter(|c| b.contains(c)).cloned().collect()
}

/// Derives the named feature subsets from a table's full column list.
///
/// The zone id, target and timestamp columns are always excluded first; the
/// remaining columns form the `all` subset from which the ablation variants
/// are carved out.
pub fn feature_subsets(columns: &[String]) -> BTreeMap<String, Vec<String>> {
    let features = without(columns, &RESERVED);

    let no_deg = without(&features, &["WD100", "WD10"]);
    let no_comp = without(&features, &["U10", "U100", "U100NORM", "V10", "V100", "V100NORM"]);
    let no_deg_comp = intersect(&no_deg, &no_comp);
    let no_ten: Vec<String> = features
        .iter()
        .filter(|c| !c.contains("WD10CARD"))
        .filter(|c| !["U10", "V10", "WS10", "WD10"].contains(&c.as_str()))
        .cloned()
        .collect();
    let no_card: Vec<String> = features
        .iter()
        .filter(|c| !c.contains("CARD"))
        .cloned()
        .collect();

    let mut subsets = BTreeMap::new();
    subsets.insert("all".to_string(), features.clone());
    subsets.insert("no_deg".to_string(), no_deg.clone());
    subsets.insert(
        "no_deg_norm".to_string(),
        without(&features, &["WD100", "WD10", "U100NORM", "V100NORM"]),
    );
    subsets.insert(
        "no_deg_norm_U10V10".to_string(),
        without(
            &features,
            &["WD100", "WD10", "U100NORM", "V100NORM", "U10", "V10"],
        ),
    );
    subsets.insert(
        "no_deg_norm_WS10".to_string(),
        without(&features, &["WD100", "WD10", "U100NORM", "V100NORM", "WS10"]),
    );
    subsets.insert("no_comp".to_string(), no_comp);
    subsets.insert(
        "no_comp_plus_100Norm".to_string(),
        without(&features, &["U10", "U100", "V10", "V100"]),
    );
    subsets.insert("no_deg_comp".to_string(), no_deg_comp.clone());
    subsets.insert("no_ten".to_string(), no_ten.clone());
    subsets.insert("no_card".to_string(), no_card);
    subsets.insert(
        "no_deg_comp_ten".to_string(),
        intersect(&no_deg_comp, &no_ten),
    );

    subsets
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn wind_columns() -> Vec<String> {
        [
            "ZONEID", "TIMESTAMP", "TARGETVAR", "U10", "V10", "WS10", "WD10", "U100", "V100",
            "WS100", "WD100", "U100NORM", "V100NORM", "WD100CARD_N", "WD100CARD_S", "WD10CARD_N",
            "WD10CARD_S",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn is_ordered_subset(sub: &[String], base: &[String]) -> bool {
        let mut pos = 0;
        for item in sub {
            match base[pos..].iter().position(|c| c == item) {
                Some(offset) => pos += offset + 1,
                None => return false,
            }
        }
        true
    }

    #[test]
    fn test_all_excludes_reserved_columns_only() {
        let subsets = feature_subsets(&wind_columns());
        let all = &subsets["all"];
        assert_eq!(all.len(), wind_columns().len() - 3);
        for reserved in ["ZONEID", "TIMESTAMP", "TARGETVAR"] {
            assert!(!all.contains(&reserved.to_string()));
        }
    }

    #[test]
    fn test_every_subset_is_ordered_subset_of_all() {
        let subsets = feature_subsets(&wind_columns());
        let all = subsets["all"].clone();
        assert_eq!(subsets.len(), 11);
        for (name, subset) in &subsets {
            assert!(
                is_ordered_subset(subset, &all),
                "subset '{name}' is not an order-preserving subset"
            );
        }
    }

    #[rstest]
    #[case("no_deg", &["WD100", "WD10"])]
    #[case("no_deg_norm", &["WD100", "WD10", "U100NORM", "V100NORM"])]
    #[case("no_deg_norm_U10V10", &["WD100", "WD10", "U100NORM", "V100NORM", "U10", "V10"])]
    #[case("no_deg_norm_WS10", &["WD100", "WD10", "U100NORM", "V100NORM", "WS10"])]
    #[case("no_comp", &["U10", "U100", "U100NORM", "V10", "V100", "V100NORM"])]
    #[case("no_comp_plus_100Norm", &["U10", "U100", "V10", "V100"])]
    fn test_exclusion_rules(#[case] name: &str, #[case] excluded: &[&str]) {
        let subsets = feature_subsets(&wind_columns());
        let subset = &subsets[name];
        for column in excluded {
            assert!(
                !subset.contains(&column.to_string()),
                "'{column}' should be excluded from '{name}'"
            );
        }
        assert_eq!(subset.len(), subsets["all"].len() - excluded.len());
    }

    #[test]
    fn test_no_comp_plus_100norm_keeps_normalized_components() {
        let subsets = feature_subsets(&wind_columns());
        let subset = &subsets["no_comp_plus_100Norm"];
        assert!(subset.contains(&"U100NORM".to_string()));
        assert!(subset.contains(&"V100NORM".to_string()));
    }

    #[test]
    fn test_no_deg_comp_is_intersection() {
        let subsets = feature_subsets(&wind_columns());
        let expected = intersect(&subsets["no_deg"], &subsets["no_comp"]);
        assert_eq!(subsets["no_deg_comp"], expected);
    }

    #[test]
    fn test_no_deg_comp_ten_is_intersection() {
        let subsets = feature_subsets(&wind_columns());
        let expected = intersect(&subsets["no_deg_comp"], &subsets["no_ten"]);
        assert_eq!(subsets["no_deg_comp_ten"], expected);
    }

    #[test]
    fn test_no_ten_drops_token_matches_and_10m_columns() {
        let subsets = feature_subsets(&wind_columns());
        let subset = &subsets["no_ten"];
        for dropped in ["WD10CARD_N", "WD10CARD_S", "U10", "V10", "WS10", "WD10"] {
            assert!(!subset.contains(&dropped.to_string()));
        }
        assert!(subset.contains(&"WD100CARD_N".to_string()));
        assert!(subset.contains(&"WS100".to_string()));
    }

    #[test]
    fn test_no_card_drops_every_cardinal_column() {
        let subsets = feature_subsets(&wind_columns());
        let subset = &subsets["no_card"];
        assert!(subset.iter().all(|c| !c.contains("CARD")));
        assert!(subset.contains(&"WD100".to_string()));
    }

    #[test]
    fn test_missing_columns_are_silently_skipped() {
        let columns: Vec<String> = ["ZONEID", "TARGETVAR", "WS100", "WS10"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let subsets = feature_subsets(&columns);
        assert_eq!(subsets["all"], vec!["WS100", "WS10"]);
        assert_eq!(subsets["no_deg"], vec!["WS100", "WS10"]);
        assert_eq!(subsets["no_ten"], vec!["WS100"]);
    }
}
