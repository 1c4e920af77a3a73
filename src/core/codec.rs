use crate::domain::model::BatchRow;
use crate::utils::error::{CatalogError, Result};

/// UTF-8 byte-order-mark prefixed to every exported document so spreadsheet
/// tools keep accented characters intact.
pub const BOM: char = '\u{FEFF}';

/// Fixed column order; the single shared contract between export and import.
pub const COLUMNS: [&str; 16] = [
    "sku",
    "nombre",
    "descripcion",
    "marca",
    "categoria",
    "subcategoria",
    "precio",
    "stock",
    "stock_minimo",
    "peso",
    "dimensiones",
    "imagen",
    "caracteristicas",
    "aplicaciones",
    "accesorios",
    "productos_relacionados",
];

pub fn header() -> String {
    COLUMNS.join(",")
}

/// Joins a plain multi-valued field with `;`. Items are not escaped; an item
/// containing `;` is malformed input (documented limitation).
pub fn encode_list(items: &[String]) -> String {
    items.join(";")
}

/// Renders typed relations as `SKU:Label` pairs joined with `;`. Labels must
/// not contain `:` or `;` (same limitation as plain lists).
pub fn encode_typed_pairs(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(sku, label)| format!("{}:{}", sku, label))
        .collect::<Vec<_>>()
        .join(";")
}

/// Quotes a composed field when it contains `,` or `;`, doubling internal
/// quotes. Semicolon triggers quoting on purpose: it is the sub-list
/// delimiter and naive consumers must not read it as a new column.
pub fn encode_field(raw: &str) -> String {
    if raw.contains(',') || raw.contains(';') {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

pub fn encode_row(row: &BatchRow) -> String {
    let fields = [
        row.sku.clone(),
        row.nombre.clone(),
        row.descripcion.clone(),
        row.marca.clone(),
        row.categoria.clone(),
        row.subcategoria.clone(),
        row.precio.clone(),
        row.stock.clone(),
        row.stock_minimo.clone(),
        row.peso.clone(),
        row.dimensiones.clone(),
        row.imagen.clone(),
        encode_list(&row.caracteristicas),
        encode_list(&row.aplicaciones),
        encode_list(&row.accesorios),
        encode_typed_pairs(&row.productos_relacionados),
    ];

    fields
        .iter()
        .map(|f| encode_field(f))
        .collect::<Vec<_>>()
        .join(",")
}

/// BOM + header + one line per row, newline-terminated.
pub fn encode_document(rows: &[BatchRow]) -> String {
    let mut out = String::new();
    out.push(BOM);
    out.push_str(&header());
    out.push('\n');
    for row in rows {
        out.push_str(&encode_row(row));
        out.push('\n');
    }
    out
}

/// Splits one line into top-level columns, honouring quoted spans and
/// unescaping doubled quotes. Malformed quoting rejects the whole line as a
/// structural error; semantic checks belong to the external row validator.
pub fn split_columns(line: &str, line_no: usize) -> Result<Vec<String>> {
    let mut columns = Vec::new();
    let mut field = String::new();
    let mut chars = line.chars().peekable();
    let mut in_quotes = false;
    // Set once a quoted span closes; only a comma or end of line may follow.
    let mut closed_quote = false;

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                    closed_quote = true;
                }
            } else {
                field.push(c);
            }
        } else if c == ',' {
            columns.push(std::mem::take(&mut field));
            closed_quote = false;
        } else if c == '"' && field.is_empty() && !closed_quote {
            in_quotes = true;
        } else if closed_quote {
            return Err(CatalogError::decode(
                line_no,
                format!("unexpected character {:?} after closing quote", c),
            ));
        } else {
            field.push(c);
        }
    }

    if in_quotes {
        return Err(CatalogError::decode(line_no, "unterminated quoted field"));
    }
    columns.push(field);
    Ok(columns)
}

pub fn decode_list(field: &str) -> Vec<String> {
    field
        .split(';')
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// Splits `SKU:Label` pairs on `;` then on the first `:`. Labels cannot
/// contain `:`, so the first-colon split is unambiguous; a pair without a
/// colon is structurally malformed.
pub fn decode_typed_pairs(field: &str, line_no: usize) -> Result<Vec<(String, String)>> {
    field
        .split(';')
        .filter(|s| !s.is_empty())
        .map(|pair| match pair.split_once(':') {
            Some((sku, label)) => Ok((sku.to_string(), label.to_string())),
            None => Err(CatalogError::decode(
                line_no,
                format!("related-product pair {:?} has no type label", pair),
            )),
        })
        .collect()
}

pub fn decode_row(line: &str, line_no: usize) -> Result<BatchRow> {
    let columns = split_columns(line, line_no)?;
    if columns.len() != COLUMNS.len() {
        return Err(CatalogError::decode(
            line_no,
            format!("expected {} columns, found {}", COLUMNS.len(), columns.len()),
        ));
    }

    let mut it = columns.into_iter();
    let mut next = || it.next().unwrap_or_default();

    Ok(BatchRow {
        sku: next(),
        nombre: next(),
        descripcion: next(),
        marca: next(),
        categoria: next(),
        subcategoria: next(),
        precio: next(),
        stock: next(),
        stock_minimo: next(),
        peso: next(),
        dimensiones: next(),
        imagen: next(),
        caracteristicas: decode_list(&next()),
        aplicaciones: decode_list(&next()),
        accesorios: decode_list(&next()),
        productos_relacionados: decode_typed_pairs(&next(), line_no)?,
    })
}

/// Parses a full document: strips the BOM, verifies the header, decodes each
/// data line. Line numbers in errors are 1-based and count the header.
pub fn decode_document(text: &str) -> Result<Vec<BatchRow>> {
    let text = text.strip_prefix(BOM).unwrap_or(text);
    let mut lines = text.lines();

    match lines.next() {
        Some(first) if first == header() => {}
        Some(first) => {
            return Err(CatalogError::decode(
                1,
                format!("unexpected header {:?}", first),
            ))
        }
        None => return Err(CatalogError::decode(1, "empty document")),
    }

    let mut rows = Vec::new();
    for (idx, line) in lines.enumerate() {
        if line.is_empty() {
            continue;
        }
        rows.push(decode_row(line, idx + 2)?);
    }
    Ok(rows)
}
