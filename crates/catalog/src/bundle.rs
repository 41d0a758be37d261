use serde::{Deserialize, Serialize};

use kitforge_core::{
    BundlePartId, DomainError, DomainResult, Entity, ProductId, ValueObject, VariantId,
};

use crate::product::Variant;

/// Number of units of a part variant consumed per single assembly.
///
/// Admin form input arrives as free text, so construction goes through the
/// same integer-parse-then-compare check for every bad shape (`"0"`, `"-1"`,
/// `"abc"` all fail identically).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartCount(u32);

impl PartCount {
    pub fn new(count: u32) -> DomainResult<Self> {
        if count == 0 {
            return Err(Self::invalid());
        }
        Ok(Self(count))
    }

    /// Parse raw admin form input. Non-numeric input normalizes to zero and
    /// fails the same greater-than-zero check as explicit zero or negatives.
    pub fn parse_form_input(raw: &str) -> DomainResult<Self> {
        let parsed: i64 = raw.trim().parse().unwrap_or(0);
        if parsed <= 0 {
            return Err(Self::invalid());
        }
        let count = u32::try_from(parsed).map_err(|_| Self::invalid())?;
        Ok(Self(count))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    fn invalid() -> DomainError {
        DomainError::validation("quantity", "must be greater than 0")
    }
}

impl ValueObject for PartCount {}

impl core::fmt::Display for PartCount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Bundle membership record: assembly product → component variant, with a
/// per-assembly count and the deferred-selection flag.
///
/// Non-deferred parts are unique per `(assembly, variant)`; deferred parts are
/// distinct slots whose concrete variant the buyer picks at add-to-order time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundlePart {
    pub id: BundlePartId,
    pub assembly_id: ProductId,
    pub part_variant_id: VariantId,
    pub count: PartCount,
    pub variant_selection_deferred: bool,
}

impl BundlePart {
    pub fn new(
        assembly_id: ProductId,
        part_variant_id: VariantId,
        count: PartCount,
        variant_selection_deferred: bool,
    ) -> Self {
        Self {
            id: BundlePartId::new(),
            assembly_id,
            part_variant_id,
            count,
            variant_selection_deferred,
        }
    }

    /// Display text for the admin part table: deferred slots have no fixed
    /// variant, so they render as user-selectable.
    pub fn options_text(&self, part_variant: &Variant) -> String {
        if self.variant_selection_deferred {
            "user selectable".to_string()
        } else {
            part_variant.options_text.clone()
        }
    }
}

impl Entity for BundlePart {
    type Id = BundlePartId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Admin form for attaching a part to a bundle or changing its count.
///
/// Identifies either an existing part by id (count-only update) or a new part
/// by `(variant, deferred)`; validation happens before any store write.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssignPartForm {
    pub id: Option<BundlePartId>,
    pub variant_id: Option<VariantId>,
    pub count: String,
    pub variant_selection_deferred: bool,
}

/// The validated outcome of an [`AssignPartForm`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartUpsert {
    /// Pure count update of an existing part.
    UpdateCount { id: BundlePartId, count: PartCount },
    /// Create a part, or update the count of the part already keyed by
    /// `(assembly, variant, deferred)`.
    CreateOrUpdate {
        variant_id: VariantId,
        count: PartCount,
        variant_selection_deferred: bool,
    },
}

impl AssignPartForm {
    pub fn validate(&self) -> DomainResult<PartUpsert> {
        let count = PartCount::parse_form_input(&self.count)?;

        match (self.id, self.variant_id) {
            (Some(id), _) => Ok(PartUpsert::UpdateCount { id, count }),
            (None, Some(variant_id)) => Ok(PartUpsert::CreateOrUpdate {
                variant_id,
                count,
                variant_selection_deferred: self.variant_selection_deferred,
            }),
            (None, None) => Err(DomainError::validation("variant_id", "can't be blank")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(count: &str) -> AssignPartForm {
        AssignPartForm {
            id: None,
            variant_id: Some(VariantId::new()),
            count: count.to_string(),
            variant_selection_deferred: false,
        }
    }

    fn assert_quantity_error(err: DomainError) {
        match err {
            DomainError::Validation { field, reason } => {
                assert_eq!(field, "quantity");
                assert_eq!(reason, "must be greater than 0");
            }
            _ => panic!("expected Validation error, got {err:?}"),
        }
    }

    #[test]
    fn zero_count_fails_validation() {
        assert_quantity_error(form("0").validate().unwrap_err());
    }

    #[test]
    fn negative_count_fails_validation() {
        assert_quantity_error(form("-1").validate().unwrap_err());
    }

    #[test]
    fn non_numeric_count_fails_validation() {
        assert_quantity_error(form("abc").validate().unwrap_err());
    }

    #[test]
    fn positive_count_passes() {
        let upsert = form("3").validate().unwrap();
        match upsert {
            PartUpsert::CreateOrUpdate { count, .. } => assert_eq!(count.get(), 3),
            _ => panic!("expected CreateOrUpdate"),
        }
    }

    #[test]
    fn surrounding_whitespace_is_tolerated() {
        let upsert = form("  2 ").validate().unwrap();
        match upsert {
            PartUpsert::CreateOrUpdate { count, .. } => assert_eq!(count.get(), 2),
            _ => panic!("expected CreateOrUpdate"),
        }
    }

    #[test]
    fn id_takes_precedence_and_updates_count_only() {
        let id = BundlePartId::new();
        let form = AssignPartForm {
            id: Some(id),
            variant_id: Some(VariantId::new()),
            count: "4".to_string(),
            variant_selection_deferred: true,
        };

        match form.validate().unwrap() {
            PartUpsert::UpdateCount { id: got, count } => {
                assert_eq!(got, id);
                assert_eq!(count.get(), 4);
            }
            _ => panic!("expected UpdateCount"),
        }
    }

    #[test]
    fn missing_variant_without_id_is_rejected() {
        let form = AssignPartForm {
            id: None,
            variant_id: None,
            count: "1".to_string(),
            variant_selection_deferred: false,
        };

        match form.validate().unwrap_err() {
            DomainError::Validation { field, .. } => assert_eq!(field, "variant_id"),
            other => panic!("expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn deferred_part_renders_as_user_selectable() {
        let product_id = ProductId::new();
        let variant = Variant::with_options(product_id, "SHIRT-BLUE", "Color: Blue");
        let part = BundlePart::new(
            ProductId::new(),
            variant.id,
            PartCount::new(1).unwrap(),
            true,
        );

        assert_eq!(part.options_text(&variant), "user selectable");
    }

    #[test]
    fn fixed_part_renders_variant_options() {
        let product_id = ProductId::new();
        let variant = Variant::with_options(product_id, "SHIRT-BLUE", "Color: Blue");
        let part = BundlePart::new(
            ProductId::new(),
            variant.id,
            PartCount::new(1).unwrap(),
            false,
        );

        assert_eq!(part.options_text(&variant), "Color: Blue");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: any positive integer string parses to that count.
            #[test]
            fn positive_integers_parse(count in 1u32..=u32::MAX) {
                let parsed = PartCount::parse_form_input(&count.to_string()).unwrap();
                prop_assert_eq!(parsed.get(), count);
            }

            /// Property: zero and negatives always fail the same way.
            #[test]
            fn non_positive_integers_fail(count in i64::MIN..=0) {
                let err = PartCount::parse_form_input(&count.to_string()).unwrap_err();
                let is_expected =
                    matches!(err, DomainError::Validation { field: "quantity", .. });
                prop_assert!(is_expected);
            }
        }
    }
}
