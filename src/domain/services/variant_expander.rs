//! Expansion of asset alternatives into concrete generation variants

use serde::{Deserialize, Serialize};

/// Optional value lists per dimension; `None` and empty mean "not varied"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeDefinition {
    #[serde(default)]
    pub gender: Option<Vec<String>>,
    #[serde(default)]
    pub class: Option<Vec<String>>,
    #[serde(default)]
    pub equipment: Option<Vec<String>>,
    #[serde(default)]
    pub vestment: Option<Vec<String>>,
    #[serde(default)]
    pub material: Option<Vec<String>>,
    #[serde(default)]
    pub quality: Option<Vec<String>>,
}

/// One point in the Cartesian product of the populated dimensions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetVariant {
    pub variant_id: String,
    pub gender: Option<String>,
    pub class: Option<String>,
    pub equipment: Option<String>,
    pub vestment: Option<String>,
    pub material: Option<String>,
    pub quality: Option<String>,
}

impl AssetVariant {
    fn slots(&mut self) -> [&mut Option<String>; 6] {
        [
            &mut self.gender,
            &mut self.class,
            &mut self.equipment,
            &mut self.vestment,
            &mut self.material,
            &mut self.quality,
        ]
    }

    /// Populated values in canonical order
    pub fn values(&self) -> Vec<&str> {
        [
            &self.gender,
            &self.class,
            &self.equipment,
            &self.vestment,
            &self.material,
            &self.quality,
        ]
        .into_iter()
        .filter_map(|v| v.as_deref())
        .collect()
    }
}

/// Number of variants `expand_alternatives` would produce, or `None` on overflow
pub fn variant_count(alternatives: &AlternativeDefinition) -> Option<usize> {
    [
        &alternatives.gender,
        &alternatives.class,
        &alternatives.equipment,
        &alternatives.vestment,
        &alternatives.material,
        &alternatives.quality,
    ]
    .into_iter()
    .filter_map(|values| values.as_ref().map(Vec::len).filter(|len| *len > 0))
    .try_fold(1usize, |total, len| total.checked_mul(len))
}

/// Expand alternatives in canonical order: gender, class, equipment,
/// vestment, material, quality. The last dimension varies fastest.
pub fn expand_alternatives(alternatives: &AlternativeDefinition) -> Vec<AssetVariant> {
    let dimensions = [
        &alternatives.gender,
        &alternatives.class,
        &alternatives.equipment,
        &alternatives.vestment,
        &alternatives.material,
        &alternatives.quality,
    ];

    let mut variants = vec![AssetVariant::default()];
    for (slot, values) in dimensions.iter().enumerate() {
        let Some(values) = values.as_ref().filter(|v| !v.is_empty()) else {
            continue;
        };
        variants = variants
            .into_iter()
            .flat_map(|variant| {
                values.iter().map(move |value| {
                    let mut next = variant.clone();
                    *next.slots()[slot] = Some(value.clone());
                    next
                })
            })
            .collect();
    }

    for variant in &mut variants {
        let values = variant.values();
        variant.variant_id = if values.is_empty() {
            "base".to_string()
        } else {
            values.join("-")
        };
    }
    variants
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(values: &[&str]) -> Option<Vec<String>> {
        Some(values.iter().map(|v| v.to_string()).collect())
    }

    #[test]
    fn test_variant_count_without_expanding() {
        assert_eq!(variant_count(&AlternativeDefinition::default()), Some(1));

        let alternatives = AlternativeDefinition {
            gender: list(&["male", "female"]),
            class: Some(Vec::new()),
            quality: list(&["common", "rare", "epic"]),
            ..Default::default()
        };
        assert_eq!(variant_count(&alternatives), Some(6));
        assert_eq!(expand_alternatives(&alternatives).len(), 6);

        let huge: Vec<String> = (0..100_000).map(|i| i.to_string()).collect();
        let overflowing = AlternativeDefinition {
            gender: Some(huge.clone()),
            class: Some(huge.clone()),
            equipment: Some(huge.clone()),
            vestment: Some(huge.clone()),
            material: Some(huge),
            quality: None,
        };
        assert_eq!(variant_count(&overflowing), None);
    }

    #[test]
    fn test_no_dimensions_yield_base() {
        let variants = expand_alternatives(&AlternativeDefinition::default());
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].variant_id, "base");
        assert_eq!(variants[0].gender, None);

        let empty = AlternativeDefinition {
            gender: Some(vec![]),
            class: Some(vec![]),
            ..Default::default()
        };
        assert_eq!(expand_alternatives(&empty)[0].variant_id, "base");
    }

    #[test]
    fn test_two_by_two_order() {
        let alternatives = AlternativeDefinition {
            gender: list(&["male", "female"]),
            class: list(&["warrior", "mage"]),
            ..Default::default()
        };
        let ids: Vec<String> = expand_alternatives(&alternatives)
            .into_iter()
            .map(|v| v.variant_id)
            .collect();
        assert_eq!(ids, vec!["male-warrior", "male-mage", "female-warrior", "female-mage"]);
    }

    #[test]
    fn test_three_dimensions_count_and_edges() {
        let alternatives = AlternativeDefinition {
            gender: list(&["male", "female"]),
            class: list(&["warrior", "mage", "rogue"]),
            equipment: list(&["sword", "staff"]),
            ..Default::default()
        };
        let variants = expand_alternatives(&alternatives);
        assert_eq!(variants.len(), 12);
        assert_eq!(variants[0].variant_id, "male-warrior-sword");
        assert_eq!(variants[1].variant_id, "male-warrior-staff");
        assert_eq!(variants[11].variant_id, "female-rogue-staff");
    }

    #[test]
    fn test_canonical_order_with_gaps() {
        let alternatives = AlternativeDefinition {
            gender: list(&["male"]),
            equipment: list(&["sword"]),
            ..Default::default()
        };
        let variants = expand_alternatives(&alternatives);
        assert_eq!(variants[0].variant_id, "male-sword");
        assert_eq!(variants[0].class, None);

        let all = AlternativeDefinition {
            gender: list(&["a"]),
            class: list(&["b"]),
            equipment: list(&["c"]),
            vestment: list(&["d"]),
            material: list(&["e"]),
            quality: list(&["f"]),
        };
        assert_eq!(expand_alternatives(&all)[0].variant_id, "a-b-c-d-e-f");
    }
}
