use crate::core::codec;
use crate::domain::model::{BatchRow, ExportProduct, ProductRef};

/// Flattens one product and its joined relation collections into a batch
/// row. Ordering within every multi-valued field follows the order the
/// collaborator returned; no sort is imposed, consumers may rely on
/// positional correlation across columns of the same export.
pub fn flatten(
    product: &ExportProduct,
    accessories: &[ProductRef],
    related_groups: &[(String, Vec<ProductRef>)],
    features: &[String],
    applications: &[String],
) -> BatchRow {
    BatchRow {
        sku: product.sku.clone(),
        nombre: product.nombre.clone(),
        descripcion: product.descripcion.clone(),
        marca: product.marca.clone(),
        categoria: product.categoria.clone(),
        subcategoria: product.subcategoria.clone(),
        precio: product.precio.clone(),
        stock: product.stock.clone(),
        stock_minimo: product.stock_minimo.clone(),
        peso: product.peso.clone(),
        dimensiones: product.dimensiones.clone(),
        imagen: product.imagen.clone(),
        caracteristicas: features.to_vec(),
        aplicaciones: applications.to_vec(),
        accesorios: accessories.iter().map(|p| p.sku.clone()).collect(),
        productos_relacionados: related_groups
            .iter()
            .flat_map(|(label, members)| {
                members
                    .iter()
                    .map(move |m| (m.sku.clone(), label.clone()))
            })
            .collect(),
    }
}

/// Flattens the collaborator's already-joined export shape.
pub fn flatten_export(product: &ExportProduct) -> BatchRow {
    let related: Vec<(String, String)> = product
        .productos_relacionados
        .iter()
        .map(|r| (r.sku.clone(), r.label.clone()))
        .collect();

    BatchRow {
        sku: product.sku.clone(),
        nombre: product.nombre.clone(),
        descripcion: product.descripcion.clone(),
        marca: product.marca.clone(),
        categoria: product.categoria.clone(),
        subcategoria: product.subcategoria.clone(),
        precio: product.precio.clone(),
        stock: product.stock.clone(),
        stock_minimo: product.stock_minimo.clone(),
        peso: product.peso.clone(),
        dimensiones: product.dimensiones.clone(),
        imagen: product.imagen.clone(),
        caracteristicas: product.caracteristicas.clone(),
        aplicaciones: product.aplicaciones.clone(),
        accesorios: product.accesorios.iter().map(|p| p.sku.clone()).collect(),
        productos_relacionados: related,
    }
}

pub fn export_document(products: &[ExportProduct]) -> String {
    let rows: Vec<BatchRow> = products.iter().map(flatten_export).collect();
    codec::encode_document(&rows)
}

/// Static import template: example rows through the same column and
/// encoding rules, no live data.
pub fn template_document() -> String {
    let rows = vec![
        BatchRow {
            sku: "BOM-001".to_string(),
            nombre: "Bomba centrífuga 2HP".to_string(),
            descripcion: "Bomba para agua limpia".to_string(),
            marca: "Grundfos".to_string(),
            categoria: "Bombas".to_string(),
            subcategoria: "Centrífugas".to_string(),
            precio: "1500.00".to_string(),
            stock: "10".to_string(),
            stock_minimo: "2".to_string(),
            peso: "18.5".to_string(),
            dimensiones: "40x30x25 cm".to_string(),
            imagen: "https://ejemplo.com/bomba.jpg".to_string(),
            caracteristicas: vec![
                "Potencia 2 HP".to_string(),
                "Cuerpo de acero inoxidable".to_string(),
            ],
            aplicaciones: vec!["Riego agrícola".to_string(), "Uso residencial".to_string()],
            accesorios: vec!["VAL-010".to_string(), "MAN-020".to_string()],
            productos_relacionados: vec![
                ("BOM-002".to_string(), "Modelos compatibles".to_string()),
                ("SEL-100".to_string(), "Repuestos".to_string()),
            ],
        },
        BatchRow {
            sku: "VAL-010".to_string(),
            nombre: "Válvula de retención 1\"".to_string(),
            descripcion: "Válvula antirretorno de bronce".to_string(),
            marca: "Genebre".to_string(),
            categoria: "Válvulas".to_string(),
            subcategoria: "Retención".to_string(),
            precio: "120.00".to_string(),
            stock: "50".to_string(),
            stock_minimo: "10".to_string(),
            peso: "0.4".to_string(),
            dimensiones: "8x4x4 cm".to_string(),
            imagen: String::new(),
            caracteristicas: vec!["Rosca BSP 1\"".to_string()],
            aplicaciones: vec![],
            accesorios: vec![],
            productos_relacionados: vec![],
        },
    ];
    codec::encode_document(&rows)
}
