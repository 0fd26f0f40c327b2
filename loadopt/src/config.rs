use serde::{Deserialize, Serialize};
use truckload::entities::{Flags, TruckSpec};
use truckload::util::PackerConfig;

use crate::io::svg::SvgDrawOptions;
use crate::pool::PrefilterConfig;
use crate::select::SelectorConfig;
use crate::sequence::SequencerConfig;

/// Configuration of a complete planning run
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct LoadOptConfig {
    pub truck: TruckSpec,
    pub flags: Flags,
    pub packer: PackerConfig,
    pub prefilter: PrefilterConfig,
    pub selector: SelectorConfig,
    /// Configuration of the sequencer. If undefined, items are packed in selection order
    pub sequencer: Option<SequencerConfig>,
    pub svg_draw_options: SvgDrawOptions,
}

impl Default for LoadOptConfig {
    fn default() -> Self {
        Self {
            truck: TruckSpec::default(),
            flags: Flags::default(),
            packer: PackerConfig::default(),
            prefilter: PrefilterConfig::default(),
            selector: SelectorConfig::default(),
            sequencer: Some(SequencerConfig::default()),
            svg_draw_options: SvgDrawOptions::default(),
        }
    }
}
