use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};
use csv::StringRecord;
use log::info;
use truckload::entities::Item;

/// Positions of the recognized columns in an items file
#[derive(Clone, Debug)]
struct Columns {
    id: Option<usize>,
    item_id: Option<usize>,
    /// Length, width and height
    dims: [usize; 3],
    /// Divisor converting the dimension columns to metres
    per_metre: f64,
    weight: Option<usize>,
    fragile: Option<usize>,
    stack_limit: Option<usize>,
    can_rotate: Option<usize>,
    drop_order: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name));
        let find_any = |names: &[&str]| names.iter().find_map(|n| find(n));

        let dim_sets = [
            (["length_mm", "width_mm", "height_mm"], 1000.0),
            (["length_m", "width_m", "height_m"], 1.0),
            (["length", "width", "height"], 1.0),
        ];
        let (dims, per_metre) = dim_sets
            .iter()
            .find_map(|(names, factor)| {
                let [l, w, h] = names.map(find);
                Some(([l?, w?, h?], *factor))
            })
            .ok_or_else(|| anyhow!("no length/width/height columns found in header: {headers:?}"))?;

        Ok(Self {
            id: find("id"),
            item_id: find("item_id"),
            dims,
            per_metre,
            weight: find_any(&["weight_kg", "weight"]),
            fragile: find("fragile"),
            stack_limit: find("stack_limit"),
            can_rotate: find("can_rotate"),
            drop_order: find("drop_order"),
        })
    }

    fn parse(&self, record: &StringRecord, row: usize) -> Result<Item> {
        let id = match (self.id, self.item_id) {
            (Some(col), _) => parse_required::<usize>(record, col, "id")?,
            (None, Some(col)) => parse_item_id(cell(record, col, "item_id")?)?,
            (None, None) => row,
        };
        let [l, w, h] = self
            .dims
            .map(|col| parse_required::<f64>(record, col, "dimension").map(|d| d / self.per_metre));

        Item::try_new(
            id,
            l?,
            w?,
            h?,
            parse_optional(record, self.weight, "weight", 0.0)?,
            parse_optional_bool(record, self.fragile, "fragile", false)?,
            parse_optional(record, self.stack_limit, "stack_limit", 1)?,
            parse_optional_bool(record, self.can_rotate, "can_rotate", true)?,
            parse_optional(record, self.drop_order, "drop_order", 1)?,
        )
    }
}

/// Reads items from a CSV file with a header row.
///
/// Ids come from an `id` column, or the trailing digits of an `item_id` column (`ITEM_0042` -> 42),
/// or else the (1-based) row number. Ids have to be unique.
/// Dimensions are read from `*_mm`, `*_m` or plain (metre) `length`/`width`/`height` columns.
/// Absent optional columns take defaults: weight 0, not fragile, stack limit 1, rotatable, drop order 1.
pub fn read_items_csv(path: &Path) -> Result<Vec<Item>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("could not open items file: {}", path.display()))?;
    let headers = reader
        .headers()
        .with_context(|| format!("could not read header of {}", path.display()))?
        .clone();
    let columns = Columns::from_headers(&headers).with_context(|| format!("unsupported items file: {}", path.display()))?;

    let mut items = vec![];
    let mut seen_ids = HashSet::new();
    for (i, record) in reader.records().enumerate() {
        let row = i + 1;
        let record = record.with_context(|| format!("could not read row {row} of {}", path.display()))?;
        let item = columns
            .parse(&record, row)
            .with_context(|| format!("invalid item in row {row} of {}", path.display()))?;
        if !seen_ids.insert(item.id) {
            bail!("duplicate item id {} in row {row} of {}", item.id, path.display());
        }
        items.push(item);
    }
    info!("[MAIN] loaded {} items from {}", items.len(), path.display());
    Ok(items)
}

/// Writes items in the dataset format: `item_id,length_mm,width_mm,height_mm,weight_kg`
pub fn write_items_csv(items: &[Item], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("could not create file: {}", path.display()))?;
    writer.write_record(["item_id", "length_mm", "width_mm", "height_mm", "weight_kg"])?;
    for item in items {
        writer.write_record([
            format!("ITEM_{:04}", item.id),
            format!("{:.0}", item.length * 1000.0),
            format!("{:.0}", item.width * 1000.0),
            format!("{:.0}", item.height * 1000.0),
            format!("{:.2}", item.weight),
        ])?;
    }
    writer.flush()?;
    info!("[MAIN] {} items written to {}", items.len(), path.display());
    Ok(())
}

fn cell<'a>(record: &'a StringRecord, col: usize, name: &str) -> Result<&'a str> {
    match record.get(col) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => bail!("missing value for {name}"),
    }
}

fn parse_required<T: FromStr>(record: &StringRecord, col: usize, name: &str) -> Result<T> {
    let value = cell(record, col, name)?;
    value
        .parse()
        .map_err(|_| anyhow!("could not parse {name}: {value:?}"))
}

fn parse_optional<T: FromStr>(record: &StringRecord, col: Option<usize>, name: &str, default: T) -> Result<T> {
    match col.and_then(|c| record.get(c)).filter(|v| !v.is_empty()) {
        Some(value) => value
            .parse()
            .map_err(|_| anyhow!("could not parse {name}: {value:?}")),
        None => Ok(default),
    }
}

fn parse_optional_bool(record: &StringRecord, col: Option<usize>, name: &str, default: bool) -> Result<bool> {
    match col.and_then(|c| record.get(c)).filter(|v| !v.is_empty()) {
        Some(value) => parse_bool(value).with_context(|| format!("could not parse {name}")),
        None => Ok(default),
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => bail!("not a boolean: {value:?}"),
    }
}

/// Numeric ids are taken as is, otherwise the trailing digits are used
fn parse_item_id(value: &str) -> Result<usize> {
    if let Ok(id) = value.parse() {
        return Ok(id);
    }
    let n_digits = value.chars().rev().take_while(|c| c.is_ascii_digit()).count();
    value[value.len() - n_digits..]
        .parse()
        .map_err(|_| anyhow!("item_id without numeric suffix: {value:?}"))
}
