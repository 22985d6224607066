use serde::{Deserialize, Serialize};

use stockbook_core::ProductId;

/// A sellable product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    /// Stock keeping unit (unique).
    pub sku: String,
    pub name: String,
    pub category: Option<String>,
    /// Unit of measure, e.g. "pcs".
    pub unit: Option<String>,
    pub is_active: bool,
}

impl Product {
    pub fn new(sku: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ProductId::new(),
            sku: sku.into(),
            name: name.into(),
            category: None,
            unit: None,
            is_active: true,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }
}

/// Catalog ordering used by every listing: name ascending, id as tie-break.
pub fn sort_by_name(products: &mut [Product]) {
    products.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_by_name_ascending() {
        let mut products = vec![
            Product::new("KULIT", "Kulit"),
            Product::new("ADAAN", "Adaan"),
            Product::new("KAPSEL", "Kapal Selam"),
        ];
        sort_by_name(&mut products);
        let names: Vec<_> = products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Adaan", "Kapal Selam", "Kulit"]);
    }
}
