//! 产品业务服务
//!
//! 基于 CSV 表文件的产品存储：每次操作都重新读取整个文件，
//! 写操作在内存中修改后整体写回。

use csv::StringRecord;
use tracing::{error, info, warn};

use super::model::{ColumnMapping, Product, ProductField};
use crate::core::error::{CoreError, Operation};
use crate::infrastructure::table::{Table, TableError, TableFile};

/// 更新操作的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated { product_index: String },
    /// 没有匹配的 SKU，表未被修改
    Unmatched,
}

#[derive(Clone)]
pub struct ProductService {
    table: TableFile,
}

impl ProductService {
    pub fn new(table: TableFile) -> Self {
        Self { table }
    }

    pub fn list_products(&self) -> Result<Vec<Product>, CoreError> {
        let table = self.read_table(Operation::Fetch)?;
        let Some(header) = table.header else {
            return Ok(Vec::new());
        };

        let mapping = ColumnMapping::from_header(&header);
        table
            .rows
            .iter()
            .map(|row| {
                mapping.to_product(row).map_err(|e| {
                    error!("Unable to map row to store product: {}", e);
                    CoreError::MappingFailure
                })
            })
            .collect()
    }

    pub fn create_product(&self, product: &Product) -> Result<Product, CoreError> {
        if product.sku.trim().is_empty() {
            warn!("Rejected product without sku");
            return Err(CoreError::InvalidInput("sku must not be empty".to_string()));
        }

        let Table { header, mut rows } = self.read_table(Operation::Create)?;
        let header = require_header(header)?;

        // 与任意单元格相同都视为重复，不只比较 sku 列
        if rows
            .iter()
            .any(|row| row.iter().any(|cell| cell == product.sku))
        {
            warn!("Product with sku {} already exists", product.sku);
            return Err(CoreError::KeyConflict {
                sku: product.sku.clone(),
            });
        }

        let product_index = (rows.len() + 1).to_string();
        let mapping = ColumnMapping::from_header(&header);
        rows.push(mapping.to_row(product, &product_index));
        self.write_table(&header, &rows, Operation::Create)?;

        info!("Created product {} at index {}", product.sku, product_index);
        Ok(Product {
            product_index,
            ..product.clone()
        })
    }

    pub fn update_product(&self, product: &Product) -> Result<UpdateOutcome, CoreError> {
        let Table { header, mut rows } = self.read_table(Operation::Update)?;
        let header = require_header(header)?;
        let mapping = ColumnMapping::from_header(&header);

        let sku_column = mapping.position(ProductField::Sku).ok_or_else(|| {
            error!("Table header has no sku column");
            CoreError::InternalFailure(Operation::Update)
        })?;

        let Some(matched) = rows
            .iter()
            .find(|row| row.get(sku_column) == Some(product.sku.as_str()))
        else {
            warn!("No product with sku {}, nothing updated", product.sku);
            return Ok(UpdateOutcome::Unmatched);
        };

        // 第 0 列是从 1 开始的行号，按它定位要覆盖的行
        let product_index = matched.get(0).unwrap_or_default().to_string();
        let position = product_index.parse::<i64>().map_err(|e| {
            error!("Invalid product index {:?}: {}", product_index, e);
            CoreError::MalformedData(Operation::Update)
        })? - 1;
        let position = usize::try_from(position)
            .ok()
            .filter(|p| *p < rows.len())
            .ok_or_else(|| {
                error!("Product index {} is outside the table", product_index);
                CoreError::InternalFailure(Operation::Update)
            })?;

        rows[position] = mapping.to_row(product, &product_index);
        self.write_table(&header, &rows, Operation::Update)?;

        info!("Updated product {} at index {}", product.sku, product_index);
        Ok(UpdateOutcome::Updated { product_index })
    }

    fn read_table(&self, op: Operation) -> Result<Table, CoreError> {
        self.table.read().map_err(|e| {
            error!("Unable to read {}: {}", self.table.path().display(), e);
            match e {
                TableError::Open(_) => CoreError::SourceUnavailable,
                TableError::Parse(_) if op == Operation::Fetch => CoreError::MappingFailure,
                TableError::Parse(_) => CoreError::MalformedData(op),
                TableError::Write(_) => CoreError::InternalFailure(op),
            }
        })
    }

    fn write_table(
        &self,
        header: &StringRecord,
        rows: &[StringRecord],
        op: Operation,
    ) -> Result<(), CoreError> {
        self.table.write(header, rows).map_err(|e| {
            error!("Unable to write {}: {}", self.table.path().display(), e);
            match e {
                TableError::Open(_) => CoreError::SourceUnavailable,
                _ => CoreError::InternalFailure(op),
            }
        })
    }
}

fn require_header(header: Option<StringRecord>) -> Result<StringRecord, CoreError> {
    header.ok_or_else(|| {
        error!("Table has no header row");
        CoreError::MappingFailure
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, path::PathBuf};
    use tempfile::{tempdir, TempDir};

    const HEADER: &str = "productIndex,storeId,sku,productName,price,date,description,imageUrl\n";

    fn service_with(contents: &str) -> (TempDir, PathBuf, ProductService) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ProductList.csv");
        fs::write(&path, contents).unwrap();
        let service = ProductService::new(TableFile::new(&path));
        (dir, path, service)
    }

    fn product(sku: &str, name: &str) -> Product {
        Product {
            store_id: "S9".into(),
            sku: sku.into(),
            product_name: name.into(),
            price: Some(4.5),
            date: "2024-02-02".into(),
            description: "fresh".into(),
            image_url: "http://img/1".into(),
            ..Product::default()
        }
    }

    #[test]
    fn test_list_header_only() {
        let (_dir, _path, service) = service_with(HEADER);
        assert!(service.list_products().unwrap().is_empty());
    }

    #[test]
    fn test_list_empty_file() {
        let (_dir, _path, service) = service_with("");
        assert!(service.list_products().unwrap().is_empty());
    }

    #[test]
    fn test_list_rows_in_order() {
        let contents = format!(
            "{}1,S1,SKU1,Widget,9.99,2023-01-01,desc,img\n2,S2,SKU2,Gadget,,2023-01-02,,\n",
            HEADER
        );
        let (_dir, _path, service) = service_with(&contents);

        let products = service.list_products().unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(
            products[0],
            Product {
                product_index: "1".into(),
                store_id: "S1".into(),
                sku: "SKU1".into(),
                product_name: "Widget".into(),
                price: Some(9.99),
                date: "2023-01-01".into(),
                description: "desc".into(),
                image_url: "img".into(),
            }
        );
        assert_eq!(products[1].sku, "SKU2");
        assert_eq!(products[1].price, None);
    }

    #[test]
    fn test_list_missing_file() {
        let dir = tempdir().unwrap();
        let service = ProductService::new(TableFile::new(dir.path().join("nope.csv")));
        assert_eq!(service.list_products(), Err(CoreError::SourceUnavailable));
    }

    #[test]
    fn test_list_bad_rows_are_mapping_failures() {
        let ragged = format!("{}1,S1,SKU1\n", HEADER);
        let (_dir, _path, service) = service_with(&ragged);
        assert_eq!(service.list_products(), Err(CoreError::MappingFailure));

        let bad_price = format!("{}1,S1,SKU1,Widget,cheap,2023-01-01,desc,img\n", HEADER);
        let (_dir, _path, service) = service_with(&bad_price);
        assert_eq!(service.list_products(), Err(CoreError::MappingFailure));

        let nan_price = format!("{}1,S1,SKU1,Widget,NaN,2023-01-01,desc,img\n", HEADER);
        let (_dir, _path, service) = service_with(&nan_price);
        assert_eq!(service.list_products(), Err(CoreError::MappingFailure));
    }

    #[test]
    fn test_create_assigns_next_index() {
        let contents = format!("{}1,S1,SKU1,Widget,9.99,2023-01-01,desc,img\n", HEADER);
        let (_dir, _path, service) = service_with(&contents);

        let created = service.create_product(&product("SKU2", "Gadget")).unwrap();
        assert_eq!(created.product_index, "2");

        let products = service.list_products().unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[1], created);
    }

    #[test]
    fn test_create_respects_header_order() {
        let (_dir, path, service) =
            service_with("sku,productName,productIndex,price,extra\n");

        service.create_product(&product("A-1", "Apple")).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "sku,productName,productIndex,price,extra\nA-1,Apple,1,4.5,\n"
        );
    }

    #[test]
    fn test_create_duplicate_in_any_column() {
        let contents = format!("{}1,S1,SKU1,Widget,9.99,2023-01-01,desc,img\n", HEADER);
        let (_dir, path, service) = service_with(&contents);

        assert_eq!(
            service.create_product(&product("SKU1", "Again")),
            Err(CoreError::KeyConflict { sku: "SKU1".into() })
        );
        // 与 productName 列的值相同同样视为重复
        assert_eq!(
            service.create_product(&product("Widget", "Again")),
            Err(CoreError::KeyConflict {
                sku: "Widget".into()
            })
        );
        assert_eq!(fs::read_to_string(&path).unwrap(), contents);
    }

    #[test]
    fn test_create_empty_sku() {
        let (_dir, path, service) = service_with(HEADER);
        for sku in ["", "   "] {
            assert!(matches!(
                service.create_product(&product(sku, "Blank")),
                Err(CoreError::InvalidInput(_))
            ));
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), HEADER);
    }

    #[test]
    fn test_create_without_header() {
        let (_dir, path, service) = service_with("");
        assert_eq!(
            service.create_product(&product("SKU1", "Widget")),
            Err(CoreError::MappingFailure)
        );
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_create_malformed_table() {
        let (_dir, _path, service) = service_with(&format!("{}1,2\n", HEADER));
        assert_eq!(
            service.create_product(&product("SKU1", "Widget")),
            Err(CoreError::MalformedData(Operation::Create))
        );
    }

    #[test]
    fn test_update_preserves_index() {
        let contents = format!("{}1,S1,SKU1,Widget,9.99,2023-01-01,desc,img\n", HEADER);
        let (_dir, _path, service) = service_with(&contents);

        let outcome = service
            .update_product(&Product {
                product_index: "77".into(),
                ..product("SKU1", "NewName")
            })
            .unwrap();
        assert_eq!(
            outcome,
            UpdateOutcome::Updated {
                product_index: "1".into()
            }
        );

        let products = service.list_products().unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].product_name, "NewName");
        assert_eq!(products[0].product_index, "1");
        assert_eq!(products[0].store_id, "S9");
        assert_eq!(products[0].price, Some(4.5));
    }

    #[test]
    fn test_update_uses_stored_index_not_scan_position() {
        // SKU2 位于第 1 行，但其行号指向第 0 行
        let contents = format!(
            "{}2,S1,SKU1,Widget,1,d,x,y\n1,S2,SKU2,Gadget,2,d,x,y\n",
            HEADER
        );
        let (_dir, _path, service) = service_with(&contents);

        service.update_product(&product("SKU2", "Moved")).unwrap();
        let products = service.list_products().unwrap();
        assert_eq!(products[0].product_name, "Moved");
        assert_eq!(products[0].product_index, "1");
        assert_eq!(products[1].product_name, "Gadget");
    }

    #[test]
    fn test_update_unmatched_leaves_file_untouched() {
        let contents = format!("{}\"1\",S1,SKU1,Widget,9.99,2023-01-01,desc,img\n", HEADER);
        let (_dir, path, service) = service_with(&contents);

        assert_eq!(
            service.update_product(&product("SKU404", "Ghost")),
            Ok(UpdateOutcome::Unmatched)
        );
        assert_eq!(fs::read_to_string(&path).unwrap(), contents);
    }

    #[test]
    fn test_update_non_numeric_index() {
        let contents = format!("{}one,S1,SKU1,Widget,9.99,2023-01-01,desc,img\n", HEADER);
        let (_dir, path, service) = service_with(&contents);

        assert_eq!(
            service.update_product(&product("SKU1", "NewName")),
            Err(CoreError::MalformedData(Operation::Update))
        );
        assert_eq!(fs::read_to_string(&path).unwrap(), contents);
    }

    #[test]
    fn test_update_index_out_of_range() {
        let contents = format!("{}5,S1,SKU1,Widget,9.99,2023-01-01,desc,img\n", HEADER);
        let (_dir, _path, service) = service_with(&contents);

        assert_eq!(
            service.update_product(&product("SKU1", "NewName")),
            Err(CoreError::InternalFailure(Operation::Update))
        );
    }

    #[test]
    fn test_update_without_sku_column() {
        let (_dir, _path, service) = service_with("productIndex,productName\n1,Widget\n");
        assert_eq!(
            service.update_product(&product("SKU1", "NewName")),
            Err(CoreError::InternalFailure(Operation::Update))
        );
    }

    #[test]
    fn test_update_missing_file() {
        let dir = tempdir().unwrap();
        let service = ProductService::new(TableFile::new(dir.path().join("nope.csv")));
        assert_eq!(
            service.update_product(&product("SKU1", "NewName")),
            Err(CoreError::SourceUnavailable)
        );
        assert!(!dir.path().join("nope.csv").exists());
    }

    #[test]
    fn test_create_then_update_round_trip() {
        let (_dir, _path, service) = service_with(HEADER);

        let created = service.create_product(&product("RT-1", "First")).unwrap();
        service.create_product(&product("RT-2", "Second")).unwrap();
        let before = service.list_products().unwrap();
        assert_eq!(before[0], created);

        let mut changed = product("RT-1", "Renamed");
        changed.price = Some(12.0);
        changed.description = "updated".into();
        service.update_product(&changed).unwrap();

        let after = service.list_products().unwrap();
        assert_eq!(after.len(), 2);
        assert_eq!(after[0].product_index, "1");
        assert_eq!(after[0].sku, "RT-1");
        assert_eq!(after[0].product_name, "Renamed");
        assert_eq!(after[0].price, Some(12.0));
        assert_eq!(after[0].description, "updated");
        assert_eq!(after[1], before[1]);
    }
}
