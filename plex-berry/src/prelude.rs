//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx2d, Idx3d};
pub use crate::{MultiplexError, MultiplexResult};

pub use crate::data::{
    to_image, Compartment, CompartmentOutput, CompartmentSelector, Image, MultiplexOutput,
    PredictionKind,
};

pub use crate::format::{format_output, OUTPUT_LAYOUT};

pub use crate::pre_proc::{multiplex_preprocess, preprocess, PreprocessConfig};

pub use crate::post_proc::{
    multiplex_postprocess, postprocess, DeepWatershed, Segmenter, WatershedConfig,
};

pub use crate::dataset::{self, load_multiplex_output, read_image};
