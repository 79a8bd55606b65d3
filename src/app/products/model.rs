//! 产品数据模型及其与 CSV 列的映射

use csv::StringRecord;
use serde::{Deserialize, Serialize};

use crate::core::extract::{JsonFields, JsonKind};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Product {
    pub product_index: String,
    pub store_id: String,
    pub sku: String,
    pub product_name: String,
    pub price: Option<f64>,
    pub date: String,
    pub description: String,
    pub image_url: String,
}

impl JsonFields for Product {
    fn json_fields() -> Vec<(&'static str, JsonKind)> {
        ProductField::ALL
            .iter()
            .map(|field| (field.name(), field.json_kind()))
            .collect()
    }
}

/// 产品字段，顺序与声明顺序一致
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductField {
    ProductIndex,
    StoreId,
    Sku,
    ProductName,
    Price,
    Date,
    Description,
    ImageUrl,
}

/// 单元格无法转换为字段值
#[derive(Debug, thiserror::Error)]
#[error("column {column} holds invalid value {value:?}")]
pub struct FieldParseError {
    pub column: &'static str,
    pub value: String,
}

impl ProductField {
    pub const ALL: [ProductField; 8] = [
        ProductField::ProductIndex,
        ProductField::StoreId,
        ProductField::Sku,
        ProductField::ProductName,
        ProductField::Price,
        ProductField::Date,
        ProductField::Description,
        ProductField::ImageUrl,
    ];

    /// 表头中的列名
    pub fn name(&self) -> &'static str {
        match self {
            ProductField::ProductIndex => "productIndex",
            ProductField::StoreId => "storeId",
            ProductField::Sku => "sku",
            ProductField::ProductName => "productName",
            ProductField::Price => "price",
            ProductField::Date => "date",
            ProductField::Description => "description",
            ProductField::ImageUrl => "imageUrl",
        }
    }

    fn json_kind(&self) -> JsonKind {
        match self {
            ProductField::Price => JsonKind::Number,
            _ => JsonKind::String,
        }
    }

    /// 字段的单元格文本；价格缺省时为空串
    pub fn get(&self, product: &Product) -> String {
        match self {
            ProductField::ProductIndex => product.product_index.clone(),
            ProductField::StoreId => product.store_id.clone(),
            ProductField::Sku => product.sku.clone(),
            ProductField::ProductName => product.product_name.clone(),
            ProductField::Price => product.price.map(|p| p.to_string()).unwrap_or_default(),
            ProductField::Date => product.date.clone(),
            ProductField::Description => product.description.clone(),
            ProductField::ImageUrl => product.image_url.clone(),
        }
    }

    pub fn set(&self, product: &mut Product, cell: &str) -> Result<(), FieldParseError> {
        match self {
            ProductField::ProductIndex => product.product_index = cell.to_string(),
            ProductField::StoreId => product.store_id = cell.to_string(),
            ProductField::Sku => product.sku = cell.to_string(),
            ProductField::ProductName => product.product_name = cell.to_string(),
            ProductField::Price => {
                let trimmed = cell.trim();
                product.price = if trimmed.is_empty() {
                    None
                } else {
                    // NaN 和无穷大无法表示为 JSON 数字
                    let price = trimmed
                        .parse::<f64>()
                        .ok()
                        .filter(|p| p.is_finite())
                        .ok_or_else(|| FieldParseError {
                            column: self.name(),
                            value: cell.to_string(),
                        })?;
                    Some(price)
                };
            }
            ProductField::Date => product.date = cell.to_string(),
            ProductField::Description => product.description = cell.to_string(),
            ProductField::ImageUrl => product.image_url = cell.to_string(),
        }
        Ok(())
    }
}

/// 由表头推导出的字段到列位置的映射
#[derive(Debug, Clone)]
pub struct ColumnMapping {
    width: usize,
    columns: Vec<(ProductField, Option<usize>)>,
}

impl ColumnMapping {
    pub fn from_header(header: &StringRecord) -> Self {
        let columns = ProductField::ALL
            .iter()
            .map(|field| (*field, header.iter().position(|name| name == field.name())))
            .collect();
        Self {
            width: header.len(),
            columns,
        }
    }

    pub fn position(&self, field: ProductField) -> Option<usize> {
        self.columns
            .iter()
            .find(|(f, _)| *f == field)
            .and_then(|(_, pos)| *pos)
    }

    /// 按列名把一行转换为产品，表头缺失的字段保持默认值
    pub fn to_product(&self, row: &StringRecord) -> Result<Product, FieldParseError> {
        let mut product = Product::default();
        for (field, pos) in &self.columns {
            if let Some(cell) = pos.and_then(|p| row.get(p)) {
                field.set(&mut product, cell)?;
            }
        }
        Ok(product)
    }

    /// 按列名构造新行，表头中没有的字段直接跳过
    pub fn to_row(&self, product: &Product, product_index: &str) -> StringRecord {
        let mut cells = vec![String::new(); self.width];
        for (field, pos) in &self.columns {
            let Some(pos) = pos else { continue };
            cells[*pos] = match field {
                ProductField::ProductIndex => product_index.to_string(),
                _ => field.get(product),
            };
        }
        StringRecord::from(cells)
    }
}
