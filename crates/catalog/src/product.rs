use serde::{Deserialize, Serialize};

use kitforge_core::{DomainError, DomainResult, Entity, ProductId, VariantId};

/// A catalog product. Sellable through its variants; becomes an assembly
/// once bundle parts are attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub available: bool,
    pub deleted: bool,
    /// Whether this product may be used as a component of an assembly.
    pub can_be_part: bool,
    /// Whether this product may still be sold on its own.
    pub individual_sale: bool,
}

impl Product {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ProductId::new(),
            name: name.into(),
            available: true,
            deleted: false,
            can_be_part: false,
            individual_sale: true,
        }
    }

    /// A product cannot be both an assembly and a part of other assemblies.
    ///
    /// `has_parts` is the result of the explicit store query; passing it in
    /// keeps this check pure and free of staleness.
    pub fn ensure_part_eligibility(&self, has_parts: bool) -> DomainResult<()> {
        if self.can_be_part && has_parts {
            return Err(DomainError::validation(
                "can_be_part",
                "assembly can't be part",
            ));
        }
        Ok(())
    }

    /// Eligible to appear in the admin part search.
    pub fn searchable_as_part(&self) -> bool {
        self.can_be_part && self.available && !self.deleted
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A sellable variant of a product. Every product has exactly one master
/// variant; option-bearing products have additional non-master variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub id: VariantId,
    pub product_id: ProductId,
    pub sku: String,
    pub is_master: bool,
    pub track_inventory: bool,
    /// Rendered option values, e.g. "Color: Blue". Empty for masters.
    pub options_text: String,
}

impl Variant {
    pub fn master(product_id: ProductId, sku: impl Into<String>) -> Self {
        Self {
            id: VariantId::new(),
            product_id,
            sku: sku.into(),
            is_master: true,
            track_inventory: true,
            options_text: String::new(),
        }
    }

    pub fn with_options(
        product_id: ProductId,
        sku: impl Into<String>,
        options_text: impl Into<String>,
    ) -> Self {
        Self {
            id: VariantId::new(),
            product_id,
            sku: sku.into(),
            is_master: false,
            track_inventory: true,
            options_text: options_text.into(),
        }
    }
}

impl Entity for Variant {
    type Id = VariantId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
