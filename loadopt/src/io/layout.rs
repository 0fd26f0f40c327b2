use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use truckload::entities::Placement;

use crate::io::canonical;

/// Writes the placements as CSV with columns `id,x,y,z,L,W,H,weight,drop_order,fragile,stack_limit`
pub fn write_layout_csv(placements: &[Placement], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("could not create file: {}", path.display()))?;
    for placement in placements {
        writer
            .serialize(placement)
            .with_context(|| format!("could not write placement {}", placement.id))?;
    }
    writer.flush()?;
    info!("layout written to file://{}", canonical(path));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;
    use truckload::entities::{Flags, Item, TruckSpec};
    use truckload::packer::pack;
    use truckload::util::PackerConfig;

    fn read_layout_csv(path: &Path) -> Result<Vec<Placement>> {
        let mut reader = csv::Reader::from_path(path)?;
        reader.deserialize::<Placement>().map(|p| Ok(p?)).collect()
    }

    #[test]
    fn layout_has_expected_header() {
        let items = [Item::plain(1, 0.5, 0.5, 0.5, 5.0).unwrap()];
        let result = pack(&TruckSpec::default(), Flags::default(), &items, &PackerConfig::default());
        let file = NamedTempFile::new().unwrap();
        write_layout_csv(&result.placements, file.path()).unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        let header = content.lines().next().unwrap();
        assert_eq!(header, "id,x,y,z,L,W,H,weight,drop_order,fragile,stack_limit");
        assert_eq!(read_layout_csv(file.path()).unwrap(), result.placements);
    }
}
